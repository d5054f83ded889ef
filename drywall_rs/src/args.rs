//! jscpd CLI argument construction.
//!
//! Pure functions: project configuration plus per-call options in, a flat
//! flag list out. The scan path is positional and appended by the caller,
//! never here.

use std::path::Path;

use serde_json::{Map, Value};

use crate::config::{DrywallConfig, is_orchestration_key};

/// Convert a camelCase option key to its kebab-case flag spelling.
/// Idempotent: keys already in kebab-case pass through unchanged.
///
/// `minTokens` -> `min-tokens`, `minLinesLimit` -> `min-lines-limit`.
pub fn camel_to_kebab(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    let mut prev_lower = false;
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = ch.is_ascii_lowercase();
            out.push(ch);
        }
    }
    out
}

/// Merge project configuration with per-call tool options into a jscpd
/// argument list. Tool options win on key collision.
///
/// Value shapes per merged key:
/// - array: one `--flag value` pair per element, in element order
/// - `true`: bare `--flag`
/// - `false` / `null`: omitted
/// - anything else: `--flag` followed by its string form
///
/// Reserved orchestration keys are filtered out regardless of which side
/// supplied them. The list always ends with the JSON reporter selection and
/// the report output directory.
pub fn build_args(
    config: &DrywallConfig,
    tool_args: &Map<String, Value>,
    report_dir: &Path,
) -> Vec<String> {
    let mut merged = config.entries().clone();
    for (key, value) in tool_args {
        merged.insert(key.clone(), value.clone());
    }

    let mut args = Vec::new();

    // --gitignore unless explicitly disabled
    if config.respect_gitignore() {
        args.push("--gitignore".to_string());
    }

    for (key, value) in &merged {
        if is_orchestration_key(key) {
            continue;
        }
        let flag = format!("--{}", camel_to_kebab(key));

        match value {
            Value::Array(items) => {
                for item in items {
                    args.push(flag.clone());
                    args.push(value_to_string(item));
                }
            }
            Value::Bool(true) => args.push(flag),
            Value::Bool(false) | Value::Null => {}
            other => {
                args.push(flag);
                args.push(value_to_string(other));
            }
        }
    }

    args.push("--reporters".to_string());
    args.push("json".to_string());
    args.push("--output".to_string());
    args.push(report_dir.display().to_string());
    args
}

/// Resolve the scan path: explicit per-call path, else the config default,
/// else the current directory.
pub fn resolve_scan_path<'a>(explicit: Option<&'a str>, config: &'a DrywallConfig) -> &'a str {
    explicit.or_else(|| config.default_path()).unwrap_or(".")
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_from(value: Value) -> DrywallConfig {
        match value {
            Value::Object(map) => DrywallConfig::from_map(map),
            _ => panic!("expected object"),
        }
    }

    fn tool_args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn build(config: Value, options: Value) -> Vec<String> {
        build_args(
            &config_from(config),
            &tool_args(options),
            Path::new("/tmp/report"),
        )
    }

    #[test]
    fn test_camel_to_kebab() {
        assert_eq!(camel_to_kebab("minTokens"), "min-tokens");
        assert_eq!(camel_to_kebab("minLinesLimit"), "min-lines-limit");
        assert_eq!(camel_to_kebab("format"), "format");
        // Already-converted input is idempotent
        assert_eq!(camel_to_kebab("min-tokens"), "min-tokens");
    }

    #[test]
    fn test_empty_inputs_yield_fixed_skeleton() {
        let args = build(json!({}), json!({}));
        assert_eq!(
            args,
            vec!["--gitignore", "--reporters", "json", "--output", "/tmp/report"]
        );
    }

    #[test]
    fn test_fixed_pairs_are_trailing() {
        let args = build(json!({"minTokens": 30}), json!({}));
        let tail: Vec<_> = args.iter().rev().take(4).rev().collect();
        assert_eq!(tail, vec!["--reporters", "json", "--output", "/tmp/report"]);
    }

    #[test]
    fn test_respect_gitignore_false_removes_flag() {
        let args = build(json!({"respectGitignore": false}), json!({}));
        assert!(!args.contains(&"--gitignore".to_string()));

        let args = build(json!({"respectGitignore": true}), json!({}));
        assert!(args.contains(&"--gitignore".to_string()));

        // Non-boolean values keep the default
        let args = build(json!({"respectGitignore": "off"}), json!({}));
        assert!(args.contains(&"--gitignore".to_string()));
    }

    #[test]
    fn test_orchestration_keys_never_become_flags() {
        let args = build(
            json!({
                "jscpdVersion": "4.0.8",
                "path": "src",
                "maxDuplicates": 5,
                "maxFragmentLength": 100,
                "minTokens": 30
            }),
            // Echoed from the call side too; still filtered
            json!({"maxDuplicates": 10, "path": "lib"}),
        );
        assert!(args.contains(&"--min-tokens".to_string()));
        for leaked in [
            "--jscpd-version",
            "--path",
            "--max-duplicates",
            "--max-fragment-length",
        ] {
            assert!(!args.contains(&leaked.to_string()), "{leaked} leaked");
        }
    }

    #[test]
    fn test_tool_args_override_config() {
        let args = build(json!({"minTokens": 50}), json!({"minTokens": 30}));
        let positions: Vec<_> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "--min-tokens")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(positions.len(), 1, "flag must appear exactly once");
        assert_eq!(args[positions[0] + 1], "30");
    }

    #[test]
    fn test_array_values_repeat_flag_in_order() {
        let args = build(
            json!({}),
            json!({"ignore": ["**/node_modules/**", "**/*.test.ts"]}),
        );
        let idx = args.iter().position(|a| a == "--ignore").expect("flag");
        assert_eq!(
            &args[idx..idx + 4],
            ["--ignore", "**/node_modules/**", "--ignore", "**/*.test.ts"]
        );
    }

    #[test]
    fn test_boolean_value_shapes() {
        let args = build(json!({}), json!({"silent": true, "verbose": false}));
        let idx = args.iter().position(|a| a == "--silent").expect("flag");
        // Bare flag: the next token is a flag, not a value
        assert!(args[idx + 1].starts_with("--"));
        assert!(!args.contains(&"--verbose".to_string()));
    }

    #[test]
    fn test_null_values_are_omitted() {
        let args = build(json!({}), json!({"threshold": null}));
        assert!(!args.contains(&"--threshold".to_string()));
    }

    #[test]
    fn test_scalar_values_stringified() {
        let args = build(json!({}), json!({"threshold": 12.5, "mode": "strict"}));
        let idx = args.iter().position(|a| a == "--threshold").expect("flag");
        assert_eq!(args[idx + 1], "12.5");
        let idx = args.iter().position(|a| a == "--mode").expect("flag");
        assert_eq!(args[idx + 1], "strict");
    }

    #[test]
    fn test_resolve_scan_path() {
        let config = config_from(json!({"path": "src"}));
        assert_eq!(resolve_scan_path(Some("lib"), &config), "lib");
        assert_eq!(resolve_scan_path(None, &config), "src");
        assert_eq!(resolve_scan_path(None, &DrywallConfig::default()), ".");
    }
}
