//! Resource schemas.
//!
//! Schemas describe the attributes of each resource type, drive configuration
//! validation, and carry the plan modifiers consumed by [`crate::plan`].

pub mod types;
pub mod validation;

pub use types::{
    AttributeMode, AttributeSchema, AttributeType, CURRENT_SCHEMA_VERSION, PlanModifier,
    ResourceSchema, Validator, id_attribute, scope_attributes,
};
pub use validation::validate_config;
