//! Project configuration support for DRYwall.
//!
//! Loads optional `.drywallrc.json` from the project root. The file is a flat
//! JSON object: a handful of reserved keys steer DRYwall itself, everything
//! else is forwarded to jscpd as CLI flags (see [`crate::args`]).

use std::path::Path;

use serde_json::{Map, Value};
use tracing::warn;

/// File name of the optional project configuration, relative to the scan root.
pub const CONFIG_FILE_NAME: &str = ".drywallrc.json";

/// Keys that control DRYwall itself and must never be forwarded to jscpd,
/// no matter whether they arrive via the config file or per-call options.
const ORCHESTRATION_KEYS: [&str; 5] = [
    "jscpdVersion",
    "respectGitignore",
    "path",
    "maxDuplicates",
    "maxFragmentLength",
];

/// Returns true for keys reserved for DRYwall's own orchestration.
pub fn is_orchestration_key(key: &str) -> bool {
    ORCHESTRATION_KEYS.contains(&key)
}

/// Project-level defaults for a detection run.
///
/// An open mapping rather than a fixed struct: jscpd grows flags faster than
/// we want to chase, so unknown keys pass through to the CLI untouched.
#[derive(Debug, Default, Clone)]
pub struct DrywallConfig(Map<String, Value>);

impl DrywallConfig {
    /// Load config from `.drywallrc.json` in the given root directory.
    /// Returns the empty config if the file is missing, unreadable, or not a
    /// JSON object. Absent configuration is not an error for this tool.
    pub fn load(root: &Path) -> Self {
        Self::load_from_path(&root.join(CONFIG_FILE_NAME))
    }

    /// Load config from a specific path, with the same fail-open contract.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => Self(map),
                Ok(_) => {
                    warn!("{} is not a JSON object, ignoring", path.display());
                    Self::default()
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Build a config directly from a key/value mapping.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// All entries, reserved keys included.
    pub fn entries(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Explicit jscpd version override (`jscpdVersion` key).
    pub fn jscpd_version(&self) -> Option<&str> {
        self.0.get("jscpdVersion").and_then(Value::as_str)
    }

    /// Whether jscpd should honor `.gitignore` rules. Only an explicit
    /// boolean `false` disables this; absence or any other value keeps it on.
    pub fn respect_gitignore(&self) -> bool {
        self.0.get("respectGitignore") != Some(&Value::Bool(false))
    }

    /// Default scan path (`path` key) when a call supplies none.
    pub fn default_path(&self) -> Option<&str> {
        self.0.get("path").and_then(Value::as_str)
    }

    /// Override for how many duplicates survive report reduction.
    pub fn max_duplicates(&self) -> Option<usize> {
        self.0
            .get("maxDuplicates")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
    }

    /// Override for the fragment truncation length.
    pub fn max_fragment_length(&self) -> Option<usize> {
        self.0
            .get("maxFragmentLength")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn config_from(value: Value) -> DrywallConfig {
        match value {
            Value::Object(map) => DrywallConfig::from_map(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_default_config() {
        let config = DrywallConfig::default();
        assert!(config.entries().is_empty());
        assert!(config.jscpd_version().is_none());
        assert!(config.respect_gitignore());
        assert!(config.default_path().is_none());
        assert!(config.max_duplicates().is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().expect("temp dir");
        let config = DrywallConfig::load(temp.path());
        assert!(config.entries().is_empty());
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        let mut file = std::fs::File::create(&path).expect("create config");
        write!(file, "{{ not json").expect("write config");

        let config = DrywallConfig::load(temp.path());
        assert!(config.entries().is_empty());
    }

    #[test]
    fn test_load_non_object_is_empty() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "[1, 2, 3]").expect("write config");

        let config = DrywallConfig::load(temp.path());
        assert!(config.entries().is_empty());
    }

    #[test]
    fn test_load_valid_config() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            r#"{
                "jscpdVersion": "4.0.9",
                "path": "src",
                "minTokens": 30,
                "maxDuplicates": 5
            }"#,
        )
        .expect("write config");

        let config = DrywallConfig::load(temp.path());
        assert_eq!(config.jscpd_version(), Some("4.0.9"));
        assert_eq!(config.default_path(), Some("src"));
        assert_eq!(config.max_duplicates(), Some(5));
        assert_eq!(config.entries().get("minTokens"), Some(&json!(30)));
    }

    #[test]
    fn test_respect_gitignore_only_false_disables() {
        assert!(!config_from(json!({"respectGitignore": false})).respect_gitignore());
        assert!(config_from(json!({"respectGitignore": true})).respect_gitignore());
        assert!(config_from(json!({"respectGitignore": "no"})).respect_gitignore());
        assert!(config_from(json!({})).respect_gitignore());
    }

    #[test]
    fn test_orchestration_key_set() {
        for key in ["jscpdVersion", "respectGitignore", "path", "maxDuplicates", "maxFragmentLength"] {
            assert!(is_orchestration_key(key), "{key} should be reserved");
        }
        assert!(!is_orchestration_key("minTokens"));
        assert!(!is_orchestration_key("ignore"));
    }
}
