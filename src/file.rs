//! The optional file-backed layer: read one config file into a flat
//! field-name → string map.
//!
//! Top-level keys are field names. Scalars are stringified the way they are
//! written (`port = 8080` yields `"8080"`); tables and arrays have no flat
//! string form and are rejected.

use std::collections::BTreeMap;
use std::path::Path;

use crate::dotenv;
use crate::error::{LoadError, UnknownKey};
use crate::types::ConfigFormat;

/// Pick a format from the file name: `*.toml`, `*.json`, `*.env` or `.env*`.
pub fn detect_format(path: &Path) -> Result<ConfigFormat, LoadError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "toml" => return Ok(ConfigFormat::Toml),
        #[cfg(feature = "json")]
        "json" => return Ok(ConfigFormat::Json),
        "env" => return Ok(ConfigFormat::Env),
        _ => {}
    }

    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if file_name.starts_with(".env") {
        return Ok(ConfigFormat::Env);
    }

    let shown = if ext.is_empty() { file_name } else { ext };
    Err(LoadError::UnsupportedFormat(shown.to_string()))
}

/// Read a config file's text. A missing file is [`LoadError::NotFound`].
pub fn read_config_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound,
        _ => LoadError::Io(e),
    })
}

pub fn parse_config(
    content: &str,
    format: ConfigFormat,
) -> Result<BTreeMap<String, String>, LoadError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        #[cfg(feature = "json")]
        ConfigFormat::Json => parse_json(content),
        ConfigFormat::Env => Ok(dotenv::parse_env_lines(content).into_iter().collect()),
    }
}

fn parse_toml(content: &str) -> Result<BTreeMap<String, String>, LoadError> {
    let table: toml::Table = toml::from_str(content)?;
    table
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                toml::Value::Datetime(dt) => dt.to_string(),
                toml::Value::Array(_) => {
                    return Err(LoadError::UnsupportedValue { key, kind: "array" });
                }
                toml::Value::Table(_) => {
                    return Err(LoadError::UnsupportedValue { key, kind: "table" });
                }
            };
            Ok((key, value))
        })
        .collect()
}

#[cfg(feature = "json")]
fn parse_json(content: &str) -> Result<BTreeMap<String, String>, LoadError> {
    use serde_json::Value;

    let object: serde_json::Map<String, Value> = serde_json::from_str(content)?;
    let mut out = BTreeMap::new();
    for (key, value) in object {
        let value = match value {
            // null reads as absent so lower layers still apply
            Value::Null => continue,
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) => return Err(LoadError::UnsupportedValue { key, kind: "array" }),
            Value::Object(_) => {
                return Err(LoadError::UnsupportedValue {
                    key,
                    kind: "object",
                });
            }
        };
        out.insert(key, value);
    }
    Ok(out)
}

/// Keys of `values` that are not in `known`, with their best-effort lines.
pub fn unknown_keys<'a>(
    content: &str,
    values: &BTreeMap<String, String>,
    known: impl IntoIterator<Item = &'a str>,
) -> Vec<UnknownKey> {
    let known: Vec<&str> = known.into_iter().collect();
    values
        .keys()
        .filter(|key| !known.contains(&key.as_str()))
        .map(|key| UnknownKey {
            key: key.clone(),
            line: find_key_line(content, key),
        })
        .collect()
}

/// Find the 1-indexed line on which a top-level `key` is assigned.
///
/// Matches `key = ...`, `key=...` and `"key": ...`. Scanning stops at the
/// first TOML section header since nothing below it is top-level. Returns 0
/// if the key cannot be located.
pub fn find_key_line(content: &str, key: &str) -> usize {
    let quoted = format!("\"{key}\"");
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') {
            break;
        }

        if let Some(after_key) = trimmed.strip_prefix(key)
            && after_key.trim_start().starts_with('=')
        {
            return i + 1;
        }

        if let Some(after_key) = trimmed.trim_start_matches('{').trim().strip_prefix(&quoted)
            && after_key.trim_start().starts_with([':', '='])
        {
            return i + 1;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn detects_formats_by_extension() {
        assert_eq!(
            detect_format(Path::new("/etc/app/app.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            detect_format(Path::new("conf/APP.TOML")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(detect_format(Path::new("app.env")).unwrap(), ConfigFormat::Env);
        assert_eq!(detect_format(Path::new(".env")).unwrap(), ConfigFormat::Env);
        assert_eq!(
            detect_format(Path::new("deploy/.env.local")).unwrap(),
            ConfigFormat::Env
        );
    }

    #[cfg(feature = "json")]
    #[test]
    fn detects_json() {
        assert_eq!(
            detect_format(Path::new("app.json")).unwrap(),
            ConfigFormat::Json
        );
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        match detect_format(Path::new("app.yaml")) {
            Err(LoadError::UnsupportedFormat(ext)) => assert_eq!(ext, "yaml"),
            other => panic!("Expected UnsupportedFormat, got {other:?}"),
        }
        match detect_format(Path::new("Makefile")) {
            Err(LoadError::UnsupportedFormat(name)) => assert_eq!(name, "Makefile"),
            other => panic!("Expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn toml_scalars_are_stringified() {
        let values = parse_config(
            "host = \"db\"\nport = 5432\nratio = 0.5\ndebug = true\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(values["host"], "db");
        assert_eq!(values["port"], "5432");
        assert_eq!(values["ratio"], "0.5");
        assert_eq!(values["debug"], "true");
    }

    #[test]
    fn toml_empty_string_is_kept() {
        let values = parse_config("host = \"\"\n", ConfigFormat::Toml).unwrap();
        assert_eq!(values["host"], "");
    }

    #[test]
    fn toml_table_is_rejected() {
        let result = parse_config("[database]\nurl = \"pg://\"\n", ConfigFormat::Toml);
        match result {
            Err(LoadError::UnsupportedValue { key, kind }) => {
                assert_eq!(key, "database");
                assert_eq!(kind, "table");
            }
            other => panic!("Expected UnsupportedValue, got {other:?}"),
        }
    }

    #[test]
    fn toml_array_is_rejected() {
        let result = parse_config("hosts = [\"a\", \"b\"]\n", ConfigFormat::Toml);
        assert!(matches!(
            result,
            Err(LoadError::UnsupportedValue { kind: "array", .. })
        ));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let result = parse_config("host = \n", ConfigFormat::Toml);
        assert!(matches!(result, Err(LoadError::Toml(_))));
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_scalars_and_null() {
        let values = parse_config(
            r#"{"host": "db", "port": 5432, "debug": false, "proxy": null}"#,
            ConfigFormat::Json,
        )
        .unwrap();
        assert_eq!(values["host"], "db");
        assert_eq!(values["port"], "5432");
        assert_eq!(values["debug"], "false");
        assert!(!values.contains_key("proxy"));
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_nested_object_is_rejected() {
        let result = parse_config(r#"{"db": {"url": "x"}}"#, ConfigFormat::Json);
        assert!(matches!(
            result,
            Err(LoadError::UnsupportedValue { kind: "object", .. })
        ));
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_non_object_root_is_parse_error() {
        let result = parse_config("[1, 2]", ConfigFormat::Json);
        assert!(matches!(result, Err(LoadError::Json(_))));
    }

    #[test]
    fn env_format_uses_bootstrap_grammar() {
        let values = parse_config("a=1\nbroken\nb=two\n", ConfigFormat::Env).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["a"], "1");
        assert_eq!(values["b"], "two");
    }

    #[test]
    fn missing_file_is_not_found() {
        let path = PathBuf::from("/nonexistent/path/config.toml");
        let result = read_config_file(&path);
        assert!(matches!(result, Err(LoadError::NotFound)));
    }

    #[test]
    fn loads_file_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "a = \"from-file\"\n").unwrap();
        let content = read_config_file(&path).unwrap();
        let values = parse_config(&content, ConfigFormat::Toml).unwrap();
        assert_eq!(values["a"], "from-file");
    }

    #[test]
    fn line_number_for_toml_and_env_keys() {
        let content = "a = \"x\"\n\n# comment\ntypo=1\n";
        assert_eq!(find_key_line(content, "a"), 1);
        assert_eq!(find_key_line(content, "typo"), 4);
        assert_eq!(find_key_line(content, "missing"), 0);
    }

    #[test]
    fn line_number_for_json_keys() {
        let content = "{\n  \"a\": \"x\",\n  \"typo\": 1\n}\n";
        assert_eq!(find_key_line(content, "typo"), 3);
    }

    #[test]
    fn line_number_ignores_prefix_matches() {
        let content = "ab = 1\na = 2\n";
        assert_eq!(find_key_line(content, "a"), 2);
    }

    #[test]
    fn unknown_keys_reports_lines() {
        let content = "a = \"x\"\ntypo = \"y\"\n";
        let values = parse_config(content, ConfigFormat::Toml).unwrap();
        let unknown = unknown_keys(content, &values, ["a", "b"]);
        assert_eq!(
            unknown,
            vec![UnknownKey {
                key: "typo".into(),
                line: 2,
            }]
        );
    }
}
