use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::config::{self, ConfigEntry, LoadError};
use crate::shrmpl_env_store::{EnvStore, ProcessEnv};

pub const ENV_FILE_NAME: &str = ".env";

/// How many directories above the component's own location the file lives.
pub const PARENT_LEVELS: usize = 2;

/// `dir/../../.env`
pub fn default_env_path(dir: &Path) -> PathBuf {
    let mut path = dir.to_path_buf();
    for _ in 0..PARENT_LEVELS {
        path.push("..");
    }
    path.push(ENV_FILE_NAME);
    path
}

#[derive(Debug)]
pub enum LoadStatus {
    Loaded,
    Skipped(LoadError),
}

/// What a load actually did. Callers are free to ignore it.
#[derive(Debug)]
pub struct LoadReport {
    pub path: PathBuf,
    pub status: LoadStatus,
    /// Entries written to the store, in file order.
    pub applied: Vec<ConfigEntry>,
    /// 1-based numbers of lines dropped by the delimiter rule.
    pub skipped_lines: Vec<usize>,
    /// Keys the store refused.
    pub rejected: Vec<String>,
}

impl LoadReport {
    fn new(path: PathBuf, status: LoadStatus) -> Self {
        Self {
            path,
            status,
            applied: Vec::new(),
            skipped_lines: Vec::new(),
            rejected: Vec::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.status, LoadStatus::Loaded)
    }

    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn error(&self) -> Option<&LoadError> {
        match &self.status {
            LoadStatus::Loaded => None,
            LoadStatus::Skipped(err) => Some(err),
        }
    }
}

/// Publishes the entries of a `.env` file into an environment store.
///
/// Loading is best effort: a missing, unreadable or non-UTF-8 file leaves the
/// store untouched, and malformed lines are dropped one at a time. Nothing is
/// ever returned as an error. Run it before anything reads the environment.
#[derive(Clone, Debug)]
pub struct Loader {
    path: PathBuf,
}

impl Loader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses the `.env` two directories above `dir`.
    pub fn for_component(dir: impl AsRef<Path>) -> Self {
        Self::new(default_env_path(dir.as_ref()))
    }

    pub fn from_current_dir() -> Self {
        match std::env::current_dir() {
            Ok(dir) => Self::for_component(dir),
            Err(e) => {
                debug!("current directory unavailable ({}), using relative env path", e);
                Self::for_component("")
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> LoadReport {
        self.load_into(&mut ProcessEnv::new())
    }

    pub fn load_into<S: EnvStore + ?Sized>(&self, store: &mut S) -> LoadReport {
        let content = match config::read_config_text(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!("skipping env file: {}", e);
                return LoadReport::new(self.path.clone(), LoadStatus::Skipped(e));
            }
        };

        let parsed = config::parse_str(&content);
        let mut report = LoadReport::new(self.path.clone(), LoadStatus::Loaded);

        for (line_no, reason) in parsed.skipped {
            trace!(line = line_no, ?reason, "skipping env line");
            report.skipped_lines.push(line_no);
        }

        for entry in parsed.entries {
            match store.set(&entry.key, &entry.value) {
                Ok(()) => {
                    trace!(key = %entry.key, "env entry applied");
                    report.applied.push(entry);
                }
                Err(e) => {
                    debug!("env entry rejected: {}", e);
                    report.rejected.push(entry.key);
                }
            }
        }

        debug!(
            path = %self.path.display(),
            applied = report.applied.len(),
            skipped = report.skipped_lines.len(),
            rejected = report.rejected.len(),
            "env file loaded"
        );
        report
    }
}

/// Loads `path` into the process environment.
pub fn load(path: impl Into<PathBuf>) -> LoadReport {
    Loader::new(path).load()
}
