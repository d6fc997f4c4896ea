//! Store configuration, read from the environment (and a `.env` file if present)
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

pub const DB_PATH_VAR: &str = "SURPLUS_DB_PATH";
pub const DB_TEMPORARY_VAR: &str = "SURPLUS_DB_TEMPORARY";
pub const DB_CACHE_BYTES_VAR: &str = "SURPLUS_DB_CACHE_BYTES";
pub const DB_FLUSH_MS_VAR: &str = "SURPLUS_DB_FLUSH_MS";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{var} is not a valid {expected}: {value:?}")]
    InvalidValue {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("Failed to open store at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: sled::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketConfig {
    pub db_path: PathBuf,
    pub temporary: bool,
    pub cache_capacity_bytes: u64,
    pub flush_every_ms: Option<u64>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("surplus_market.db"),
            temporary: false,
            cache_capacity_bytes: 64 * 1024 * 1024,
            flush_every_ms: Some(500),
        }
    }
}

impl MarketConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads overrides from the process environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(DB_PATH_VAR) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(value) = lookup(DB_TEMPORARY_VAR) {
            config.temporary = parse_var(DB_TEMPORARY_VAR, "boolean", &value)?;
        }
        if let Some(value) = lookup(DB_CACHE_BYTES_VAR) {
            config.cache_capacity_bytes = parse_var(DB_CACHE_BYTES_VAR, "byte count", &value)?;
        }
        if let Some(value) = lookup(DB_FLUSH_MS_VAR) {
            // zero turns periodic flushing off
            let ms: u64 = parse_var(DB_FLUSH_MS_VAR, "millisecond count", &value)?;
            config.flush_every_ms = (ms > 0).then_some(ms);
        }

        Ok(config)
    }

    pub fn set_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }
    pub fn set_temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }
    pub fn set_cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity_bytes = bytes;
        self
    }
    pub fn set_flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }

    pub fn open(&self) -> Result<Arc<sled::Db>, ConfigError> {
        let db = sled::Config::new()
            .path(&self.db_path)
            .temporary(self.temporary)
            .cache_capacity(self.cache_capacity_bytes)
            .flush_every_ms(self.flush_every_ms)
            .open()
            .map_err(|source| ConfigError::Open {
                path: self.db_path.clone(),
                source,
            })?;

        tracing::info!(path = %self.db_path.display(), temporary = self.temporary, "Store opened");
        Ok(Arc::new(db))
    }
}

fn parse_var<T: FromStr>(var: &'static str, expected: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        expected,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn unset_variables_keep_defaults() {
        let config = MarketConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, MarketConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = MarketConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "/tmp/market"),
            (DB_TEMPORARY_VAR, "true"),
            (DB_CACHE_BYTES_VAR, "1024"),
            (DB_FLUSH_MS_VAR, "0"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/market"));
        assert!(config.temporary);
        assert_eq!(config.cache_capacity_bytes, 1024);
        assert_eq!(config.flush_every_ms, None);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = MarketConfig::from_lookup(lookup_from(&[(DB_TEMPORARY_VAR, "sometimes")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                var: DB_TEMPORARY_VAR,
                ..
            }
        ));
    }

    #[test]
    fn opens_a_store_at_the_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let db = MarketConfig::new()
            .set_db_path(dir.path().join("market.db"))
            .set_temporary(true)
            .open()
            .unwrap();

        db.insert(b"k", b"v".to_vec()).unwrap();
        assert!(db.contains_key(b"k").unwrap());
    }
}
