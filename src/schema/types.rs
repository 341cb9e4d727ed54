//! Core schema type definitions for provider resources.
//!
//! A [`ResourceSchema`] lists every attribute a resource exposes, how it may be
//! set (required, optional, computed), which values are acceptable, and how
//! planning treats changes to it.

use crate::client::is_valid_slug;
use serde_json::Value;

/// Current schema version of every resource.
pub const CURRENT_SCHEMA_VERSION: u64 = 3;

/// A resource schema definition.
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    /// Resource type name, e.g. `redirect_url`
    pub type_name: String,
    /// Schema version persisted alongside state
    pub version: u64,
    pub description: String,
    pub attributes: Vec<AttributeSchema>,
}

impl ResourceSchema {
    pub fn new(type_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            version: CURRENT_SCHEMA_VERSION,
            description: description.into(),
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeSchema) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|attr| attr.name == name)
    }
}

/// Data type of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Bool,
    Int,
    StringList,
    /// String keys to string values
    StringMap,
    /// Nested block with its own attributes
    Object(Vec<AttributeSchema>),
    /// List of nested blocks
    ObjectList(Vec<AttributeSchema>),
}

impl AttributeType {
    /// Human-readable name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Bool => "bool",
            AttributeType::Int => "number",
            AttributeType::StringList => "list of strings",
            AttributeType::StringMap => "map of strings",
            AttributeType::Object(_) => "object",
            AttributeType::ObjectList(_) => "list of objects",
        }
    }
}

/// How an attribute's value is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMode {
    /// Must be set in configuration
    Required,
    /// May be set in configuration; absent means absent
    Optional,
    /// Set by the platform only
    Computed,
    /// May be set in configuration; the platform fills it in otherwise
    OptionalComputed,
}

impl AttributeMode {
    pub fn is_computed(self) -> bool {
        matches!(self, AttributeMode::Computed | AttributeMode::OptionalComputed)
    }

    pub fn is_configurable(self) -> bool {
        !matches!(self, AttributeMode::Computed)
    }
}

/// Value constraints checked during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    OneOf(Vec<String>),
    LengthBetween(usize, usize),
    IntBetween(i64, i64),
    /// Absolute `http` or `https` URL
    Url,
    NonEmpty,
    /// Project or environment slug; see [`is_valid_slug`]
    Slug,
}

impl Validator {
    pub fn one_of(values: &[&str]) -> Self {
        Validator::OneOf(values.iter().map(|v| (*v).to_string()).collect())
    }

    /// Check a single non-null value. Returns a description of the violation.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Validator::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| a == s) => Ok(()),
                _ => Err(format!("value must be one of: {}", allowed.join(", "))),
            },
            Validator::LengthBetween(min, max) => {
                let len = match value {
                    Value::String(s) => s.chars().count(),
                    Value::Array(items) => items.len(),
                    _ => return Ok(()),
                };
                if len < *min || len > *max {
                    Err(format!("length must be between {min} and {max}, got {len}"))
                } else {
                    Ok(())
                }
            }
            Validator::IntBetween(min, max) => match value.as_i64() {
                Some(n) if n >= *min && n <= *max => Ok(()),
                Some(n) => Err(format!("value must be between {min} and {max}, got {n}")),
                None => Ok(()),
            },
            Validator::Url => match value.as_str() {
                Some(s) if is_absolute_http_url(s) => Ok(()),
                Some(s) => Err(format!("'{s}' is not an absolute http(s) URL")),
                None => Ok(()),
            },
            Validator::NonEmpty => match value {
                Value::String(s) if s.is_empty() => Err("value must not be empty".to_string()),
                Value::Array(items) if items.is_empty() => {
                    Err("value must not be empty".to_string())
                }
                _ => Ok(()),
            },
            Validator::Slug => match value.as_str() {
                Some(s) if is_valid_slug(s) => Ok(()),
                Some(s) => Err(format!(
                    "'{s}' is not a valid slug: use lowercase letters, digits, '-' and '_'"
                )),
                None => Ok(()),
            },
        }
    }
}

fn is_absolute_http_url(s: &str) -> bool {
    match url::Url::parse(s) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// How planning treats an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanModifier {
    /// Keep the prior state's value for a computed attribute the configuration
    /// leaves unset, instead of marking it unknown.
    UseStateForUnknown,
    /// Any change to the value destroys and recreates the resource.
    RequiresReplace,
    /// A masked (empty or absent) refreshed value keeps the prior state's value.
    PreserveSensitive,
}

/// Definition of a single attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSchema {
    pub name: String,
    pub attribute_type: AttributeType,
    pub mode: AttributeMode,
    /// Never logged; masked by the platform on read
    pub sensitive: bool,
    pub validators: Vec<Validator>,
    pub plan_modifiers: Vec<PlanModifier>,
    pub description: String,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attribute_type: AttributeType, mode: AttributeMode) -> Self {
        Self {
            name: name.into(),
            attribute_type,
            mode,
            sensitive: false,
            validators: Vec::new(),
            plan_modifiers: Vec::new(),
            description: String::new(),
        }
    }

    pub fn required(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self::new(name, attribute_type, AttributeMode::Required)
    }

    pub fn optional(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self::new(name, attribute_type, AttributeMode::Optional)
    }

    pub fn computed(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self::new(name, attribute_type, AttributeMode::Computed)
    }

    pub fn optional_computed(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self::new(name, attribute_type, AttributeMode::OptionalComputed)
    }

    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn with_plan_modifier(mut self, modifier: PlanModifier) -> Self {
        self.plan_modifiers.push(modifier);
        self
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn has_plan_modifier(&self, modifier: PlanModifier) -> bool {
        self.plan_modifiers.contains(&modifier)
    }

    /// Nested attributes of an object or object-list attribute.
    pub fn nested(&self) -> Option<&[AttributeSchema]> {
        match &self.attribute_type {
            AttributeType::Object(attrs) | AttributeType::ObjectList(attrs) => Some(attrs),
            _ => None,
        }
    }
}

/// Common `project_slug` / `environment_slug` attributes.
///
/// Both are required and force replacement: a configuration object cannot move
/// between environments.
pub fn scope_attributes() -> [AttributeSchema; 2] {
    [
        AttributeSchema::required("project_slug", AttributeType::String)
            .with_validator(Validator::Slug)
            .with_plan_modifier(PlanModifier::RequiresReplace)
            .describe("Slug of the project the object belongs to."),
        AttributeSchema::required("environment_slug", AttributeType::String)
            .with_validator(Validator::Slug)
            .with_plan_modifier(PlanModifier::RequiresReplace)
            .describe("Slug of the environment the object belongs to."),
    ]
}

/// Common computed `id` attribute holding the import identifier.
pub fn id_attribute() -> AttributeSchema {
    AttributeSchema::computed("id", AttributeType::String)
        .with_plan_modifier(PlanModifier::UseStateForUnknown)
        .describe("Identifier of the resource in import format.")
}
