pub mod config;
pub mod shrmpl_env_loader;
pub mod shrmpl_env_store;

pub use config::{
    load_config, parse_line, parse_str, ConfigEntry, LineOutcome, LoadError, ParsedConfig,
    SkipReason,
};
pub use shrmpl_env_loader::{default_env_path, load, LoadReport, LoadStatus, Loader};
pub use shrmpl_env_store::{EnvStore, EnvStoreError, MemoryEnv, ProcessEnv};
