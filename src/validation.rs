//! Schema validation helpers.
//!
//! Checks a configuration `serde_json::Value` against a [`Schema`] before the
//! provider acts on it, and reports every problem as a [`Diagnostic`].
//!
//! # Example
//!
//! ```
//! use cafe_provider::schema::{Attribute, Schema};
//! use cafe_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::optional_string())
//!     .with_attribute("id", Attribute::computed_int64());
//!
//! assert!(validate(&schema, &json!({"name": "Sample Cafe"})).is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"name": 7}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("name".to_string()));
//! ```

use crate::schema::{Attribute, AttributeType, Diagnostic, Schema};
use serde_json::Value;
use std::collections::BTreeMap;

/// Validate a configuration value against a schema.
///
/// Returns a list of diagnostics for any validation errors found.
/// An empty list means the value is valid.
///
/// # Validation Rules
///
/// - Required attributes must be present and non-null
/// - Optional attributes may be absent or null
/// - Computed-only attributes must not be set
/// - Attributes the schema does not declare are rejected
/// - Attribute types must match the schema
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match value {
        Value::Object(map) => map,
        // Nothing configured; only required attributes can be missing.
        Value::Null => {
            for (name, attr) in &schema.attributes {
                validate_attribute(name, attr, None, &mut diagnostics);
            }
            return diagnostics;
        },
        _ => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(value))),
            );
            return diagnostics;
        },
    };

    for (name, attr) in &schema.attributes {
        validate_attribute(name, attr, obj.get(name), &mut diagnostics);
    }

    for name in obj.keys() {
        if !schema.attributes.contains_key(name) {
            diagnostics.push(
                Diagnostic::error(format!("Unsupported attribute '{}'", name))
                    .with_detail("An attribute with this name is not expected here")
                    .with_attribute(name.clone()),
            );
        }
    }

    diagnostics
}

/// Validate a configuration value, returning Ok if valid or Err with diagnostics.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a configuration value is valid against a schema.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

fn validate_attribute(
    path: &str,
    attr: &Attribute,
    value: Option<&Value>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let computed_only = attr.flags.computed && !attr.flags.optional && !attr.flags.required;

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        },
        Some(_) if computed_only => {
            diagnostics.push(
                Diagnostic::error(format!("Value for unconfigurable attribute '{}'", path))
                    .with_detail("This attribute is computed by the provider and cannot be set")
                    .with_attribute(path),
            );
        },
        Some(v) => validate_attribute_type(&attr.attr_type, v, path, diagnostics),
    }
}

fn validate_attribute_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match attr_type {
        AttributeType::String => {
            if !value.is_string() {
                diagnostics.push(type_error(path, "string", value));
            }
        },
        AttributeType::Int64 => {
            if !is_int64(value) {
                diagnostics.push(type_error(path, "int64", value));
            }
        },
        AttributeType::List(element_type) => {
            if let Some(arr) = value.as_array() {
                for (i, elem) in arr.iter().enumerate() {
                    let elem_path = format!("{}.{}", path, i);
                    validate_attribute_type(element_type, elem, &elem_path, diagnostics);
                }
            } else {
                diagnostics.push(type_error(path, "list", value));
            }
        },
        AttributeType::Object(attrs) => {
            if let Some(obj) = value.as_object() {
                validate_object_type(attrs, obj, path, diagnostics);
            } else {
                diagnostics.push(type_error(path, "object", value));
            }
        },
    }
}

fn validate_object_type(
    attrs: &BTreeMap<String, AttributeType>,
    obj: &serde_json::Map<String, Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (name, attr_type) in attrs {
        let attr_path = format!("{}.{}", path, name);
        // Object members have no presence rules; null means unset.
        if let Some(value) = obj.get(name).filter(|v| !v.is_null()) {
            validate_attribute_type(attr_type, value, &attr_path, diagnostics);
        }
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_int64(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            if n.as_i64().is_some() {
                true
            } else if let Some(f) = n.as_f64() {
                f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64
            } else {
                false
            }
        },
        _ => false,
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected, value_type_name(got)))
        .with_attribute(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeFlags, Schema};
    use serde_json::json;

    fn cafe_config_schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_int64())
            .with_attribute("name", Attribute::optional_computed_string())
            .with_attribute(
                "address",
                Attribute::new(AttributeType::String, AttributeFlags::required()),
            )
    }

    #[test]
    fn test_validate_valid_config() {
        let schema = cafe_config_schema();
        let diagnostics = validate(&schema, &json!({"name": "Sample Cafe", "address": "123 Coffee St"}));
        assert!(diagnostics.is_empty());
        assert!(is_valid(&schema, &json!({"address": "x", "name": null})));
    }

    #[test]
    fn test_validate_missing_required() {
        let schema = cafe_config_schema();

        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("address".to_string()));

        let diagnostics = validate(&schema, &Value::Null);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_validate_wrong_type() {
        let schema = cafe_config_schema();
        let diagnostics = validate(&schema, &json!({"address": 123}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid type"));
        assert_eq!(diagnostics[0].detail.as_deref(), Some("Expected string, got number"));
    }

    #[test]
    fn test_validate_computed_only_rejected() {
        let schema = cafe_config_schema();
        let diagnostics = validate(&schema, &json!({"address": "x", "id": 42}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("unconfigurable"));
    }

    #[test]
    fn test_validate_unsupported_attribute() {
        let schema = cafe_config_schema();
        let diagnostics = validate(&schema, &json!({"address": "x", "menu": "latte"}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("menu".to_string()));
    }

    #[test]
    fn test_validate_not_an_object() {
        let schema = cafe_config_schema();
        let diagnostics = validate(&schema, &json!("cafe"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Expected object");
    }

    #[test]
    fn test_validate_int64() {
        let schema = Schema::v0().with_attribute(
            "port",
            Attribute::new(AttributeType::Int64, AttributeFlags::optional()),
        );

        assert!(validate(&schema, &json!({"port": 42})).is_empty());
        assert!(validate(&schema, &json!({"port": 42.0})).is_empty());
        assert_eq!(validate(&schema, &json!({"port": 42.5})).len(), 1);
        assert_eq!(validate(&schema, &json!({"port": "42"})).len(), 1);
    }

    #[test]
    fn test_validate_list_of_objects() {
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), AttributeType::Int64);
        fields.insert("name".to_string(), AttributeType::String);
        let schema = Schema::v0().with_attribute(
            "cafes",
            Attribute::new(
                AttributeType::list(AttributeType::object(fields)),
                AttributeFlags::optional(),
            ),
        );

        let diagnostics = validate(&schema, &json!({"cafes": [{"id": 1, "name": "a"}]}));
        assert!(diagnostics.is_empty());

        let diagnostics = validate(&schema, &json!({"cafes": [{"id": "one"}]}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("cafes.0.id".to_string()));

        let diagnostics = validate(&schema, &json!({"cafes": "all"}));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_validate_result() {
        let schema = cafe_config_schema();
        assert!(validate_result(&schema, &json!({"address": "x"})).is_ok());
        let err = validate_result(&schema, &json!({})).unwrap_err();
        assert_eq!(err.len(), 1);
    }
}
