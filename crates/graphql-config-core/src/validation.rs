//! Structural validation of raw configuration
//!
//! The raw value is checked against a built-in JSON Schema before it is
//! normalized, so shape errors are reported with the offending key path
//! instead of surfacing later as confusing load failures.

use std::path::Path;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::value::Value;

const CONFIG_SCHEMA: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "$defs": {
    "pointer": {
      "anyOf": [
        { "type": "string" },
        { "type": "array", "items": { "$ref": "#/$defs/pointer" } },
        {
          "type": "object",
          "minProperties": 1,
          "maxProperties": 1,
          "additionalProperties": { "type": "object" }
        }
      ]
    },
    "project": {
      "type": "object",
      "properties": {
        "schema": { "$ref": "#/$defs/pointer" },
        "documents": { "$ref": "#/$defs/pointer" },
        "include": { "$ref": "#/$defs/pointer" },
        "exclude": { "$ref": "#/$defs/pointer" },
        "extensions": { "type": "object" }
      }
    }
  },
  "allOf": [{ "$ref": "#/$defs/project" }],
  "properties": {
    "projects": {
      "type": "object",
      "additionalProperties": { "$ref": "#/$defs/project" }
    }
  }
}"##;

fn validator() -> Result<&'static jsonschema::Validator> {
    static VALIDATOR: OnceLock<std::result::Result<jsonschema::Validator, String>> = OnceLock::new();

    VALIDATOR
        .get_or_init(|| {
            let schema: serde_json::Value =
                serde_json::from_str(CONFIG_SCHEMA).map_err(|e| e.to_string())?;
            jsonschema::validator_for(&schema).map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|e| Error::internal(format!("Built-in configuration schema is invalid: {}", e)))
}

/// A single validation issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted key path to the invalid value (e.g., "projects.api.schema")
    pub path: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Validate a raw configuration value.
///
/// Returns the first violation as an `InvalidConfig` error pointing at
/// `filepath`.
pub fn validate(value: &Value, filepath: impl AsRef<Path>) -> Result<()> {
    let json_value = value.to_json();
    let mut errors = validator()?.iter_errors(&json_value);

    if let Some(error) = errors.next() {
        let path = dotted_path(&error.instance_path.to_string());
        return Err(Error::invalid_config(path, error.to_string()).in_file(filepath));
    }
    Ok(())
}

/// Validate and collect every violation instead of failing on the first
pub fn validate_collect(value: &Value) -> Result<Vec<ValidationIssue>> {
    let json_value = value.to_json();

    Ok(validator()?
        .iter_errors(&json_value)
        .map(|e| ValidationIssue {
            path: dotted_path(&e.instance_path.to_string()),
            message: e.to_string(),
        })
        .collect())
}

/// Turn a JSON pointer ("/projects/api/schema") into a key path ("projects.api.schema")
fn dotted_path(pointer: &str) -> String {
    pointer
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn test_valid_single_project() {
        let value = yaml(
            "schema: schema.graphql\n\
             documents: ['src/**/*.graphql', { 'queries/*.gql': { noRequire: true } }]\n\
             extensions: { codegen: { generates: {} } }\n",
        );
        assert!(validate(&value, "/proj/.graphqlrc.yml").is_ok());
    }

    #[test]
    fn test_valid_multi_project() {
        let value = yaml(
            "projects:\n  api: { schema: api.graphql }\n  web: { schema: web.graphql, include: ['src/**'] }\n",
        );
        assert!(validate(&value, "/proj/.graphqlrc.yml").is_ok());
    }

    #[test]
    fn test_root_must_be_mapping() {
        let err = validate(&yaml("[a, b]"), "/proj/.graphqlrc.yml").unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidConfig);
        assert!(err.path.is_none());
        assert!(err.to_string().contains("/proj/.graphqlrc.yml"));
    }

    #[test]
    fn test_bad_extensions_reports_path() {
        let value = yaml("projects:\n  api:\n    schema: api.graphql\n    extensions: true\n");
        let err = validate(&value, "/proj/graphql.config.json").unwrap_err();

        assert_eq!(err.path.as_deref(), Some("projects.api.extensions"));
        assert!(err.to_string().contains("/proj/graphql.config.json"));
    }

    #[test]
    fn test_bad_pointer_shape() {
        let value = yaml("schema: 42\n");
        let err = validate(&value, "cfg.yml").unwrap_err();
        assert_eq!(err.path.as_deref(), Some("schema"));

        let value = yaml("schema: { a.graphql: true }\n");
        assert!(validate(&value, "cfg.yml").is_err());
    }

    #[test]
    fn test_validate_collect_reports_all() {
        let value = yaml("schema: 1\ndocuments: 2\nextensions: []\n");
        let issues = validate_collect(&value).unwrap();

        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"schema"));
        assert!(paths.contains(&"documents"));
        assert!(paths.contains(&"extensions"));
    }

    #[test]
    fn test_dotted_path() {
        assert_eq!(dotted_path(""), "");
        assert_eq!(dotted_path("/projects/api/schema"), "projects.api.schema");
        assert_eq!(dotted_path("/include/0"), "include.0");
        assert_eq!(dotted_path("/a~1b"), "a/b");
    }
}
