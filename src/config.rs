//! Runtime settings, read from the environment once at startup.
use std::env;
use std::path::PathBuf;

pub const ADB_PATH_VAR: &str = "AADB_ADB";
pub const LOG_VAR: &str = "AADB_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Explicit adb binary. When unset the binary is looked up on `PATH`.
    pub adb_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let adb_path = lookup(ADB_PATH_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let log_filter = lookup(LOG_VAR)
            .or_else(|| lookup("RUST_LOG"))
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Self { adb_path, log_filter }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_with(&[]);
        assert_eq!(config.adb_path, None);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn adb_override_is_used() {
        let config = config_with(&[(ADB_PATH_VAR, "/opt/sdk/platform-tools/adb")]);
        assert_eq!(
            config.adb_path,
            Some(PathBuf::from("/opt/sdk/platform-tools/adb"))
        );
    }

    #[test]
    fn blank_adb_override_is_ignored() {
        let config = config_with(&[(ADB_PATH_VAR, "  ")]);
        assert_eq!(config.adb_path, None);
    }

    #[test]
    fn aadb_log_wins_over_rust_log() {
        let config = config_with(&[(LOG_VAR, "debug"), ("RUST_LOG", "trace")]);
        assert_eq!(config.log_filter, "debug");

        let config = config_with(&[("RUST_LOG", "info")]);
        assert_eq!(config.log_filter, "info");
    }
}
