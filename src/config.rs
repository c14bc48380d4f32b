use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use thiserror::Error;

/// Errors raised while reading a key=value file.
///
/// Messages carry the path only. File contents never end up in an error,
/// since these files usually hold secrets.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config file {} is not valid UTF-8", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: FromUtf8Error,
    },
}

/// One accepted `KEY=VALUE` pair, both sides trimmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

impl ConfigEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NoDelimiter,
    ExtraDelimiters { segments: usize },
    EmptyKey,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineOutcome {
    Entry(ConfigEntry),
    Skipped(SkipReason),
}

/// Result of parsing a whole file: accepted entries in file order plus the
/// 1-based numbers of the lines that were dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedConfig {
    pub entries: Vec<ConfigEntry>,
    pub skipped: Vec<(usize, SkipReason)>,
}

impl ParsedConfig {
    /// Later duplicates win.
    pub fn into_map(self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for entry in self.entries {
            map.insert(entry.key, entry.value);
        }
        map
    }
}

/// A line is accepted only when it splits into exactly two segments on `=`.
/// `str::trim` also strips a trailing `\r`, so CRLF files parse like LF ones.
pub fn parse_line(line: &str) -> LineOutcome {
    let parts: Vec<&str> = line.split('=').collect();
    match parts.len() {
        2 => {
            let key = parts[0].trim();
            if key.is_empty() {
                return LineOutcome::Skipped(SkipReason::EmptyKey);
            }
            LineOutcome::Entry(ConfigEntry::new(key, parts[1].trim()))
        }
        1 => LineOutcome::Skipped(SkipReason::NoDelimiter),
        segments => LineOutcome::Skipped(SkipReason::ExtraDelimiters { segments }),
    }
}

// Split on '\n' only; blank lines and comments get no special treatment and
// fall out through the delimiter rule.
pub fn parse_str(content: &str) -> ParsedConfig {
    let mut parsed = ParsedConfig::default();
    for (idx, line) in content.split('\n').enumerate() {
        match parse_line(line) {
            LineOutcome::Entry(entry) => parsed.entries.push(entry),
            LineOutcome::Skipped(reason) => parsed.skipped.push((idx + 1, reason)),
        }
    }
    parsed
}

/// Reads the whole file as UTF-8.
pub fn read_config_text(path: &Path) -> Result<String, LoadError> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    String::from_utf8(bytes).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a key=value file into a lookup table without touching the process
/// environment.
pub fn load_config(path: impl AsRef<Path>) -> Result<HashMap<String, String>, LoadError> {
    let content = read_config_text(path.as_ref())?;
    Ok(parse_str(&content).into_map())
}
