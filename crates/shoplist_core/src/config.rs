//! Runtime configuration for front ends.
//!
//! Values come from defaults, then `SHOPLIST_*` environment variables; front
//! ends may override individual fields afterwards (CLI flags, for example).

use crate::logging::default_log_level;
use crate::persistence::MalformedDataPolicy;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "SHOPLIST_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "SHOPLIST_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SHOPLIST_LOG_DIR";
pub const ENV_ON_CORRUPT: &str = "SHOPLIST_ON_CORRUPT";

const DEFAULT_DB_FILE_NAME: &str = "shoplist.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                message,
            } => write!(f, "invalid {key}=`{value}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Settings needed to open a session and start logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file backing the key-value store.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Rolling log directory; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub malformed_policy: MalformedDataPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            malformed_policy: MalformedDataPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Builds configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(policy) = read(ENV_ON_CORRUPT) {
            config.malformed_policy =
                policy
                    .parse()
                    .map_err(|message| ConfigError::InvalidValue {
                        key: ENV_ON_CORRUPT,
                        value: policy.clone(),
                        message,
                    })?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, ENV_DB_PATH, ENV_LOG_DIR, ENV_ON_CORRUPT};
    use crate::persistence::MalformedDataPolicy;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.db_path.ends_with("shoplist.sqlite3"));
    }

    #[test]
    fn environment_overrides_defaults_and_ignores_blanks() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, " /data/list.db "),
            (ENV_LOG_DIR, "   "),
            (ENV_ON_CORRUPT, "Backup"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/data/list.db"));
        assert_eq!(config.log_dir, None);
        assert_eq!(config.malformed_policy, MalformedDataPolicy::Backup);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_ON_CORRUPT, "shrug")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: ENV_ON_CORRUPT, .. }
        ));
    }
}
