//! Configuration validation against a resource schema.
//!
//! Validation collects one diagnostic per offending attribute instead of
//! stopping at the first, so an operator sees every problem in one run.

use super::types::{AttributeMode, AttributeSchema, AttributeType, ResourceSchema};
use crate::diagnostics::Diagnostics;
use serde_json::{Map, Value};

/// Validate a resource configuration.
///
/// `null` stands for "not set". Checks, per attribute:
/// required attributes are set, computed-only attributes are not, values have
/// the declared type, and every validator accepts the value. Attributes the
/// schema does not declare are rejected.
pub fn validate_config(schema: &ResourceSchema, config: &Value) -> Diagnostics {
    let mut diags = Diagnostics::new();
    match config.as_object() {
        Some(obj) => validate_object(&schema.attributes, obj, "", &mut diags),
        None => diags.add_error(
            "Invalid configuration",
            format!("configuration of {} must be an object", schema.type_name),
        ),
    }
    diags
}

fn path_of(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn validate_object(
    attributes: &[AttributeSchema],
    obj: &Map<String, Value>,
    prefix: &str,
    diags: &mut Diagnostics,
) {
    for attr in attributes {
        let path = path_of(prefix, &attr.name);
        let value = obj.get(&attr.name).filter(|v| !v.is_null());

        let Some(value) = value else {
            if attr.mode == AttributeMode::Required {
                diags.add_attribute_error(
                    path,
                    "Missing required attribute",
                    format!("The attribute \"{}\" is required.", attr.name),
                );
            }
            continue;
        };

        if !attr.mode.is_configurable() {
            diags.add_attribute_error(
                path,
                "Invalid configuration",
                format!("The attribute \"{}\" is computed and cannot be set.", attr.name),
            );
            continue;
        }

        validate_value(attr, value, &path, diags);
    }

    for name in obj.keys() {
        if !attributes.iter().any(|attr| attr.name == *name) {
            diags.add_attribute_error(
                path_of(prefix, name),
                "Unsupported attribute",
                format!("An attribute named \"{name}\" is not expected here."),
            );
        }
    }
}

fn validate_value(attr: &AttributeSchema, value: &Value, path: &str, diags: &mut Diagnostics) {
    let type_ok = match &attr.attribute_type {
        AttributeType::String => value.is_string(),
        AttributeType::Bool => value.is_boolean(),
        AttributeType::Int => value.is_i64() || value.is_u64(),
        AttributeType::StringList => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
        AttributeType::StringMap => value
            .as_object()
            .is_some_and(|map| map.values().all(Value::is_string)),
        AttributeType::Object(nested) => match value.as_object() {
            Some(inner) => {
                validate_object(nested, inner, path, diags);
                true
            }
            None => false,
        },
        AttributeType::ObjectList(nested) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{path}[{i}]");
                    match item.as_object() {
                        Some(inner) => validate_object(nested, inner, &item_path, diags),
                        None => diags.add_attribute_error(
                            item_path,
                            "Incorrect attribute value type",
                            "list element must be an object",
                        ),
                    }
                }
                true
            }
            None => false,
        },
    };

    if !type_ok {
        diags.add_attribute_error(
            path,
            "Incorrect attribute value type",
            format!("expected {}", attr.attribute_type.describe()),
        );
        return;
    }

    for validator in &attr.validators {
        if let Err(message) = validator.check(value) {
            // Never echo a sensitive value back.
            let detail = if attr.sensitive {
                "sensitive value rejected by validator".to_string()
            } else {
                message
            };
            diags.add_attribute_error(path, "Invalid attribute value", detail);
        }
    }
}
