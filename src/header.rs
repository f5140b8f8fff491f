use std::io::{self, BufRead};

/// Ordered run/plugin configuration extracted from a benchmark log header.
///
/// Keys keep their file order because the results table joins header keys
/// and values positionally: the column list comes from the first file's
/// keys and every row binds its values in the same order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HeaderBlock {
    entries: Vec<(String, String)>,
}

impl HeaderBlock {
    /// Namespaced keys in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Raw values in the same order as `keys`.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads the banner and header block of a benchmark log, leaving the reader
/// positioned at the first result line.
///
/// Keys before the first blank line belong to the run namespace; keys after
/// it are stored with a `plugin_` prefix. A second blank line (or end of
/// file) terminates the header. Entries are indented `key=value` lines,
/// split at the first `=`, with `-` in keys normalized to `_`. Anything
/// else is skipped without error.
pub fn parse_header<R: BufRead>(reader: &mut R) -> io::Result<HeaderBlock> {
    let mut line = String::new();
    // The format always opens with a one-line banner.
    reader.read_line(&mut line)?;

    let mut entries = Vec::new();
    let mut namespace = "";
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let content = line.trim_end_matches(['\n', '\r']);
        if content.is_empty() {
            if namespace == "plugin_" {
                break;
            }
            // First blank line: everything after it is plugin configuration.
            namespace = "plugin_";
            continue;
        }
        if content.starts_with(['\t', ' ']) {
            if let Some((key, value)) = content.trim().split_once('=') {
                entries.push((
                    format!("{namespace}{}", key.replace('-', "_")),
                    value.to_string(),
                ));
            }
        }
    }
    Ok(HeaderBlock { entries })
}
