//! The declarative pipeline configuration.
//!
//! ```json
//! {
//!     "PIPELINE": ["math.double", "math.negate", "text.to_string"],
//!     "DATA": 2,
//!     "VALIDATORS": ["checks.is_number"]
//! }
//! ```
//!
//! `PIPELINE` and `DATA` are required. `VALIDATORS` is optional; `null` is
//! treated the same as absent. The shape is checked before anything is
//! resolved, so a malformed config never executes a step.

use crate::core::error::ConfigError;
use crate::core::types::Value;
use serde_json::{Map, Value as JsonValue};
use std::path::Path;

/// Key holding the ordered step references.
pub const PIPELINE: &str = "PIPELINE";
/// Key holding the initial input.
pub const DATA: &str = "DATA";
/// Key holding the optional validator references.
pub const VALIDATORS: &str = "VALIDATORS";

/// A parsed and shape-checked configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Step references in execution order.
    pub pipeline: Vec<String>,
    /// Initial input.
    pub data: Value,
    /// Validator references, run on `data` before the pipeline.
    pub validators: Option<Vec<String>>,
}

impl PipelineConfig {
    /// Create a config from step references and an initial value.
    pub fn new<I, S>(pipeline: I, data: impl Into<Value>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pipeline: pipeline.into_iter().map(Into::into).collect(),
            data: data.into(),
            validators: None,
        }
    }

    /// Attach validator references.
    pub fn with_validators<I, S>(mut self, validators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validators = Some(validators.into_iter().map(Into::into).collect());
        self
    }

    /// Check the shape of a JSON document and extract the config.
    pub fn from_json_value(json: &JsonValue) -> Result<Self, ConfigError> {
        let root = json
            .as_object()
            .ok_or_else(|| ConfigError::NotAnObject(json_kind(json).to_string()))?;

        let pipeline = references(root, PIPELINE)?.ok_or(ConfigError::MissingField(PIPELINE))?;
        let data = root
            .get(DATA)
            .cloned()
            .map(Value::from)
            .ok_or(ConfigError::MissingField(DATA))?;
        let validators = references(root, VALIDATORS)?;

        Ok(Self {
            pipeline,
            data,
            validators,
        })
    }

    /// Parse and check a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    /// Read a config file.
    ///
    /// Files ending in `.toml` are parsed as TOML, everything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let json = if is_toml {
            let parse_error = |message: String| ConfigError::Parse {
                path: path.to_path_buf(),
                format: "TOML",
                message,
            };
            let table: toml::Value =
                toml::from_str(&contents).map_err(|e| parse_error(e.to_string()))?;
            serde_json::to_value(table).map_err(|e| parse_error(e.to_string()))?
        } else {
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                format: "JSON",
                message: e.to_string(),
            })?
        };

        log::debug!("read config from {}", path.display());
        Self::from_json_value(&json)
    }

    /// Render back into the JSON shape.
    pub fn to_json(&self) -> JsonValue {
        let mut root = Map::new();
        root.insert(PIPELINE.to_string(), JsonValue::from(self.pipeline.clone()));
        root.insert(DATA.to_string(), self.data.to_json());
        if let Some(validators) = &self.validators {
            root.insert(VALIDATORS.to_string(), JsonValue::from(validators.clone()));
        }
        JsonValue::Object(root)
    }
}

// An absent or null field is `None`; anything else must be an array of
// non-empty strings.
fn references(
    root: &Map<String, JsonValue>,
    field: &'static str,
) -> Result<Option<Vec<String>>, ConfigError> {
    let items = match root.get(field) {
        None | Some(JsonValue::Null) => return Ok(None),
        Some(JsonValue::Array(items)) => items,
        Some(_) => {
            return Err(ConfigError::WrongType {
                field,
                expected: "an array of strings",
            })
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item.as_str() {
            Some(reference) if !reference.is_empty() => Ok(reference.to_string()),
            _ => Err(ConfigError::InvalidReference { field, index }),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_minimal() {
        let config = PipelineConfig::from_json_value(&json!({
            "PIPELINE": ["m.double", "m.negate"],
            "DATA": 2
        }))
        .unwrap();
        assert_eq!(config, PipelineConfig::new(["m.double", "m.negate"], 2i64));
        assert!(config.validators.is_none());
    }

    #[test]
    fn test_parse_with_validators() {
        let config = PipelineConfig::from_json_str(
            r#"{"PIPELINE": [], "DATA": "x", "VALIDATORS": ["checks.non_empty"]}"#,
        )
        .unwrap();
        assert!(config.pipeline.is_empty());
        assert_eq!(config.validators, Some(vec!["checks.non_empty".to_string()]));
    }

    #[test]
    fn test_null_validators_is_absent() {
        let config = PipelineConfig::from_json_value(&json!({
            "PIPELINE": ["a.b"], "DATA": null, "VALIDATORS": null
        }))
        .unwrap();
        assert_eq!(config.data, Value::Null);
        assert!(config.validators.is_none());
    }

    #[test]
    fn test_shape_errors() {
        let cases = [
            (json!([1, 2]), "configuration must be an object"),
            (json!({"DATA": 1}), "missing required field 'PIPELINE'"),
            (json!({"PIPELINE": ["a.b"]}), "missing required field 'DATA'"),
            (json!({"PIPELINE": "a.b", "DATA": 1}), "field 'PIPELINE' must be"),
            (json!({"PIPELINE": ["a.b", 3], "DATA": 1}), "entry 1 of 'PIPELINE'"),
            (json!({"PIPELINE": [""], "DATA": 1}), "entry 0 of 'PIPELINE'"),
            (json!({"PIPELINE": [], "DATA": 1, "VALIDATORS": {}}), "field 'VALIDATORS'"),
        ];
        for (json, expected) in cases {
            let err = PipelineConfig::from_json_value(&json).unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "{json}: got '{err}', expected '{expected}'"
            );
        }
    }

    #[test]
    fn test_to_json_round_trips_shape() {
        let config = PipelineConfig::new(["m.double"], 3i64).with_validators(["checks.is_number"]);
        let json = config.to_json();
        assert_eq!(
            json,
            json!({"PIPELINE": ["m.double"], "DATA": 3, "VALIDATORS": ["checks.is_number"]})
        );
        assert_eq!(PipelineConfig::from_json_value(&json).unwrap(), config);
    }

    #[test]
    fn test_from_path_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"PIPELINE": ["math.double"], "DATA": 2}}"#).unwrap();

        let config = PipelineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.pipeline, vec!["math.double"]);
        assert_eq!(config.data, Value::Integer(2));
    }

    #[test]
    fn test_from_path_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "PIPELINE = [\"text.upper\"]").unwrap();
        writeln!(file, "DATA = \"abc\"").unwrap();

        let config = PipelineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.pipeline, vec!["text.upper"]);
        assert_eq!(config.data, Value::from("abc"));
    }

    #[test]
    fn test_from_path_invalid_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{\"PIPELINE\": [\"a.b\",], }}").unwrap();

        let err = PipelineConfig::from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "JSON", .. }));
        assert!(err.to_string().contains("could not be read as JSON"));
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PipelineConfig::from_path(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
