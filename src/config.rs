// Teller configuration: where the ledger lives and how loud the logs are
//
// Precedence: CLI flag > environment variable > default.

use std::path::PathBuf;

pub const DEFAULT_LEDGER: &str = "accounts.csv";
pub const DEFAULT_LOG_FILTER: &str = "info";

pub const LEDGER_ENV: &str = "TELLER_LEDGER";
pub const LOG_ENV: &str = "TELLER_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TellerConfig {
    pub ledger_path: PathBuf,
    pub log_filter: String,
}

impl Default for TellerConfig {
    fn default() -> Self {
        TellerConfig {
            ledger_path: PathBuf::from(DEFAULT_LEDGER),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl TellerConfig {
    /// Resolve against the process environment
    pub fn resolve(ledger: Option<PathBuf>, log_filter: Option<String>) -> Self {
        Self::resolve_with(ledger, log_filter, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup
    pub fn resolve_with<F>(ledger: Option<PathBuf>, log_filter: Option<String>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let defaults = TellerConfig::default();

        TellerConfig {
            ledger_path: ledger
                .or_else(|| non_empty(LEDGER_ENV).map(PathBuf::from))
                .unwrap_or(defaults.ledger_path),
            log_filter: log_filter
                .or_else(|| non_empty(LOG_ENV))
                .unwrap_or(defaults.log_filter),
        }
    }

    /// Log file used while the interactive screen owns the terminal
    pub fn ui_log_path(&self) -> PathBuf {
        match self.ledger_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join("teller.log"),
            _ => PathBuf::from("teller.log"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TellerConfig::resolve_with(None, None, env_of(&[]));
        assert_eq!(config, TellerConfig::default());
        assert_eq!(config.ledger_path, PathBuf::from("accounts.csv"));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_env_overrides_default() {
        let env = env_of(&[(LEDGER_ENV, "/tmp/bank.csv"), (LOG_ENV, "debug")]);
        let config = TellerConfig::resolve_with(None, None, env);

        assert_eq!(config.ledger_path, PathBuf::from("/tmp/bank.csv"));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_flag_overrides_env() {
        let env = env_of(&[(LEDGER_ENV, "/tmp/bank.csv"), (LOG_ENV, "debug")]);
        let config = TellerConfig::resolve_with(
            Some(PathBuf::from("mine.csv")),
            Some("warn".to_string()),
            env,
        );

        assert_eq!(config.ledger_path, PathBuf::from("mine.csv"));
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let env = env_of(&[(LEDGER_ENV, "  ")]);
        let config = TellerConfig::resolve_with(None, None, env);
        assert_eq!(config.ledger_path, PathBuf::from(DEFAULT_LEDGER));
    }

    #[test]
    fn test_ui_log_path() {
        let mut config = TellerConfig::default();
        assert_eq!(config.ui_log_path(), PathBuf::from("teller.log"));

        config.ledger_path = PathBuf::from("/var/bank/accounts.csv");
        assert_eq!(config.ui_log_path(), PathBuf::from("/var/bank/teller.log"));
    }
}
