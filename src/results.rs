use regex::Regex;
use std::io::{self, BufRead};
use std::sync::LazyLock;

/// Matches one metric-report line, anchored at the start of the line. The
/// rank prefix and the Mib/s throughput group are both optional; the text
/// between the anchors is free-form progress output.
static RESULT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^((?P<rank>[0-9]+): )?(?P<phase>[a-z]+).* (?P<obj>[0-9.]+) obj/s.*?( (?P<mib>[0-9.]+) Mib/s)? \((?P<errs>[0-9]+) errs",
    )
    .unwrap()
});

/// One parsed metric-report line.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    /// First letter of the phase word ("write" -> 'w').
    pub phase: char,
    /// Worker rank, or `None` for the aggregate line with no rank prefix.
    pub process: Option<i64>,
    /// Zero-based reporting round. Each rank-less line starts a new round;
    /// records up to the next rank-less line share its index.
    pub iteration: i64,
    pub objects_per_second: f64,
    pub throughput_mib: Option<f64>,
    pub errors: i64,
}

/// Lazy stream of metric records over the body of a benchmark log.
pub struct ResultLines<R> {
    reader: R,
    line: String,
    iteration: i64,
}

/// Scans the rest of the stream for metric lines, starting wherever the
/// header parser left the cursor. Lines that do not match the metric shape
/// are excluded from the sequence without touching the iteration state.
pub fn parse_results<R: BufRead>(reader: R) -> ResultLines<R> {
    ResultLines {
        reader,
        line: String::new(),
        iteration: -1,
    }
}

impl<R: BufRead> Iterator for ResultLines<R> {
    type Item = io::Result<MetricRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
            if let Some(record) = self.match_line() {
                return Some(Ok(record));
            }
        }
    }
}

impl<R> ResultLines<R> {
    fn match_line(&mut self) -> Option<MetricRecord> {
        let caps = RESULT_LINE.captures(&self.line)?;
        let phase = caps.name("phase")?.as_str().chars().next()?;
        let objects_per_second: f64 = caps.name("obj")?.as_str().parse().ok()?;
        let throughput_mib = match caps.name("mib") {
            Some(m) => Some(m.as_str().parse().ok()?),
            None => None,
        };
        let errors: i64 = caps.name("errs")?.as_str().parse().ok()?;
        let process = match caps.name("rank") {
            Some(r) => Some(r.as_str().parse().ok()?),
            None => {
                // A rank-less line marks the start of a new reporting round.
                self.iteration += 1;
                None
            }
        };
        Some(MetricRecord {
            phase,
            process,
            iteration: self.iteration,
            objects_per_second,
            throughput_mib,
            errors,
        })
    }
}
