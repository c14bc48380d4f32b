use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvStoreError {
    #[error("invalid environment key {key:?}")]
    InvalidKey { key: String },

    // The value is left out of the message on purpose; it may be a secret.
    #[error("invalid value for environment key {key:?}")]
    InvalidValue { key: String },
}

/// Destination for loaded entries.
///
/// `set` overwrites any existing value for the key.
pub trait EnvStore {
    fn set(&mut self, key: &str, value: &str) -> Result<(), EnvStoreError>;

    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    pub fn new() -> Self {
        Self
    }
}

impl EnvStore for ProcessEnv {
    // std::env::set_var panics on these inputs, so they are rejected up front.
    fn set(&mut self, key: &str, value: &str) -> Result<(), EnvStoreError> {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(EnvStoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        if value.contains('\0') {
            return Err(EnvStoreError::InvalidValue {
                key: key.to_string(),
            });
        }
        std::env::set_var(key, value);
        Ok(())
    }

    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory store, used in tests and by hosts that stage values before
/// publishing them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryEnv {
    vars: BTreeMap<String, String>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvStore for MemoryEnv {
    fn set(&mut self, key: &str, value: &str) -> Result<(), EnvStoreError> {
        self.vars.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_memory_env_overwrites() {
        let mut env = MemoryEnv::new();
        env.set("KEY", "one").unwrap();
        env.set("KEY", "two").unwrap();
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("KEY").as_deref(), Some("two"));
    }

    #[test]
    fn test_memory_env_from_iter() {
        let env: MemoryEnv = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(env.get("A").as_deref(), Some("1"));
        assert_eq!(env.get("B").as_deref(), Some("2"));
        assert!(env.get("C").is_none());
    }

    #[test]
    #[serial]
    fn test_process_env_round_trip() {
        let mut env = ProcessEnv::new();
        env.set("SHRMPL_ENV_STORE_TEST", "value").unwrap();
        assert_eq!(env.get("SHRMPL_ENV_STORE_TEST").as_deref(), Some("value"));
        std::env::remove_var("SHRMPL_ENV_STORE_TEST");
    }

    #[test]
    #[serial]
    fn test_process_env_rejects_unsettable_input() {
        let mut env = ProcessEnv::new();
        assert_eq!(
            env.set("", "x"),
            Err(EnvStoreError::InvalidKey { key: String::new() })
        );
        assert!(matches!(
            env.set("BAD\0KEY", "x"),
            Err(EnvStoreError::InvalidKey { .. })
        ));
        assert_eq!(
            env.set("SHRMPL_ENV_NUL_VALUE", "a\0b"),
            Err(EnvStoreError::InvalidValue {
                key: "SHRMPL_ENV_NUL_VALUE".to_string()
            })
        );
        assert!(std::env::var("SHRMPL_ENV_NUL_VALUE").is_err());
    }
}
