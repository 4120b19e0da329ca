//! Fixture binding: externally supplied expected data for a scenario.
//!
//! A [`FixtureBinder`] knows where fixture files live. Each scenario asks it
//! for a fresh [`FixtureRecord`] and receives it by value, so nothing is
//! shared between scenarios and nothing is cached across loads.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::result::{ProbeError, ProbeResult};

/// File extensions tried, in order, when resolving a fixture name
const FIXTURE_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// A flat, read-only mapping from field name to literal value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureRecord {
    name: String,
    fields: BTreeMap<String, String>,
}

impl FixtureRecord {
    /// Build a record from in-memory fields
    #[must_use]
    pub fn from_fields<I, K, V>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Fixture name this record was loaded from
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a field
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::MissingField`] if `field` is absent.
    pub fn get(&self, field: &str) -> ProbeResult<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .ok_or_else(|| ProbeError::MissingField {
                fixture: self.name.clone(),
                field: field.to_string(),
            })
    }

    /// Field names present in the record
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    fn from_value(name: &str, value: Value) -> ProbeResult<Self> {
        let Value::Object(map) = value else {
            return Err(load_error(name, "top level must be a mapping of fields"));
        };
        let mut fields = BTreeMap::new();
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    return Err(load_error(
                        name,
                        format!("field '{key}' must be a string, number or boolean"),
                    ));
                }
            };
            let _ = fields.insert(key, text);
        }
        Ok(Self {
            name: name.to_string(),
            fields,
        })
    }
}

fn load_error(name: &str, message: impl Into<String>) -> ProbeError {
    ProbeError::FixtureLoad {
        name: name.to_string(),
        message: message.into(),
    }
}

/// Resolves fixture names to files under one directory
#[derive(Debug, Clone)]
pub struct FixtureBinder {
    dir: PathBuf,
}

impl FixtureBinder {
    /// Create a binder rooted at `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory fixtures are read from
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Find the file backing `name`
    fn resolve(&self, name: &str) -> ProbeResult<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(load_error(name, "fixture names must be plain file stems"));
        }
        FIXTURE_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{name}.{ext}")))
            .find(|path| path.is_file())
            .ok_or_else(|| {
                load_error(
                    name,
                    format!("no {name}.json, {name}.yaml or {name}.yml in {}", self.dir.display()),
                )
            })
    }

    /// Load and parse a fixture into a fresh record
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::FixtureLoad`] if the source is missing or malformed.
    pub fn load(&self, name: &str) -> ProbeResult<FixtureRecord> {
        let path = self.resolve(name)?;
        debug!(fixture = name, path = %path.display(), "loading fixture");
        let raw = fs::read_to_string(&path)
            .map_err(|e| load_error(name, format!("{}: {e}", path.display())))?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let value: Value = if is_json {
            serde_json::from_str(&raw).map_err(|e| load_error(name, e.to_string()))?
        } else {
            serde_yaml_ng::from_str(&raw).map_err(|e| load_error(name, e.to_string()))?
        };
        FixtureRecord::from_value(name, value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, file: &str, body: &str) {
        fs::write(dir.path().join(file), body).unwrap();
    }

    mod record_tests {
        use super::*;

        #[test]
        fn test_get_present_field() {
            let record = FixtureRecord::from_fields("testData", [("name", "Ada")]);
            assert_eq!(record.get("name").unwrap(), "Ada");
            assert_eq!(record.name(), "testData");
        }

        #[test]
        fn test_get_missing_field() {
            let record = FixtureRecord::from_fields("testData", [("name", "Ada")]);
            match record.get("warning").unwrap_err() {
                ProbeError::MissingField { fixture, field } => {
                    assert_eq!(fixture, "testData");
                    assert_eq!(field, "warning");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    mod binder_tests {
        use super::*;

        #[test]
        fn test_load_json() {
            let dir = TempDir::new().unwrap();
            write(
                &dir,
                "testData.json",
                r#"{"name": "Ada", "review": "Solid machine", "rating": 5, "verified": true}"#,
            );
            let record = FixtureBinder::new(dir.path()).load("testData").unwrap();
            assert_eq!(record.get("review").unwrap(), "Solid machine");
            assert_eq!(record.get("rating").unwrap(), "5");
            assert_eq!(record.get("verified").unwrap(), "true");
            assert_eq!(record.fields(), vec!["name", "rating", "review", "verified"]);
        }

        #[test]
        fn test_load_yaml_fallback() {
            let dir = TempDir::new().unwrap();
            write(&dir, "reviews.yml", "name: Ada\nwarning: 'Warning: nope'\n");
            let record = FixtureBinder::new(dir.path()).load("reviews").unwrap();
            assert_eq!(record.get("warning").unwrap(), "Warning: nope");
        }

        #[test]
        fn test_json_wins_over_yaml() {
            let dir = TempDir::new().unwrap();
            write(&dir, "data.json", r#"{"source": "json"}"#);
            write(&dir, "data.yaml", "source: yaml\n");
            let record = FixtureBinder::new(dir.path()).load("data").unwrap();
            assert_eq!(record.get("source").unwrap(), "json");
        }

        #[test]
        fn test_missing_source() {
            let dir = TempDir::new().unwrap();
            let err = FixtureBinder::new(dir.path()).load("absent").unwrap_err();
            assert!(matches!(err, ProbeError::FixtureLoad { ref name, .. } if name == "absent"));
        }

        #[test]
        fn test_malformed_source() {
            let dir = TempDir::new().unwrap();
            write(&dir, "broken.json", r#"{"name": "Ada""#);
            let err = FixtureBinder::new(dir.path()).load("broken").unwrap_err();
            assert!(matches!(err, ProbeError::FixtureLoad { .. }));
        }

        #[test]
        fn test_non_mapping_and_nested_values_rejected() {
            let dir = TempDir::new().unwrap();
            write(&dir, "list.json", r#"["Ada"]"#);
            write(&dir, "nested.json", r#"{"user": {"name": "Ada"}}"#);
            let binder = FixtureBinder::new(dir.path());
            assert!(matches!(
                binder.load("list").unwrap_err(),
                ProbeError::FixtureLoad { .. }
            ));
            let err = binder.load("nested").unwrap_err();
            assert!(err.to_string().contains("user"));
        }

        #[test]
        fn test_path_like_names_rejected() {
            let dir = TempDir::new().unwrap();
            let binder = FixtureBinder::new(dir.path());
            assert!(binder.load("../secrets").is_err());
            assert!(binder.load("").is_err());
        }

        #[test]
        fn test_each_load_reads_source_again() {
            let dir = TempDir::new().unwrap();
            write(&dir, "testData.json", r#"{"name": "first"}"#);
            let binder = FixtureBinder::new(dir.path());
            let first = binder.load("testData").unwrap();
            write(&dir, "testData.json", r#"{"name": "second"}"#);
            let second = binder.load("testData").unwrap();
            assert_eq!(first.get("name").unwrap(), "first");
            assert_eq!(second.get("name").unwrap(), "second");
        }
    }
}
