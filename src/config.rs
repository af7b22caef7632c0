//! Runtime configuration from environment variables

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_USER_ID: &str = "local-user";
pub const DEFAULT_FOOD_API_URL: &str = "https://world.openfoodfacts.org/cgi/search.pl";
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 8;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    /// Every stored row is keyed by this id
    pub user_id: String,
    pub food_api_url: String,
    pub search_debounce: Duration,
    pub lookup_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let parsed = |key: &str, default: u64| {
            non_empty(key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        Self {
            database_path: non_empty("NUTRILOG_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_database_path),
            user_id: non_empty("NUTRILOG_USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            food_api_url: non_empty("NUTRILOG_FOOD_API_URL")
                .unwrap_or_else(|| DEFAULT_FOOD_API_URL.to_string()),
            search_debounce: Duration::from_millis(parsed(
                "NUTRILOG_SEARCH_DEBOUNCE_MS",
                DEFAULT_SEARCH_DEBOUNCE_MS,
            )),
            lookup_timeout: Duration::from_secs(parsed(
                "NUTRILOG_LOOKUP_TIMEOUT_SECS",
                DEFAULT_LOOKUP_TIMEOUT_SECS,
            )),
        }
    }
}

/// `<project>/data/nutrilog.db`, where the project root is found from the
/// executable's location under `target/{debug,release}`
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(root) = path.parent().and_then(|target| target.parent()) {
            path = root.to_path_buf();
        }
    }

    path.push("data");
    path.push("nutrilog.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.user_id, DEFAULT_USER_ID);
        assert_eq!(config.food_api_url, DEFAULT_FOOD_API_URL);
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert_eq!(config.lookup_timeout, Duration::from_secs(8));
        assert!(config.database_path.ends_with("data/nutrilog.db"));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("NUTRILOG_DATABASE_PATH", "/tmp/n.db"),
            ("NUTRILOG_USER_ID", "alice"),
            ("NUTRILOG_SEARCH_DEBOUNCE_MS", "0"),
            ("NUTRILOG_LOOKUP_TIMEOUT_SECS", "not a number"),
        ]);
        assert_eq!(config.database_path, PathBuf::from("/tmp/n.db"));
        assert_eq!(config.user_id, "alice");
        assert!(config.search_debounce.is_zero());
        assert_eq!(config.lookup_timeout, Duration::from_secs(8));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config(&[("NUTRILOG_USER_ID", "  ")]);
        assert_eq!(config.user_id, DEFAULT_USER_ID);
    }
}
