//! Planning: computing the state a resource will have after apply.
//!
//! The planned state starts from the configuration. Attributes the
//! configuration leaves unset are then filled according to their
//! [`PlanModifier`]s; everything else unset becomes `null`, which the engine
//! treats as "known after apply".
//!
//! An optional attribute configured empty (an empty string, list or map, or a
//! block with nothing set) is planned as unset. The platform reports such
//! values as absent, so refreshed state carries `null` for them.

use crate::diagnostics::Diagnostics;
use crate::schema::{
    AttributeMode, AttributeSchema, AttributeType, PlanModifier, ResourceSchema, validate_config,
};
use log::debug;
use serde_json::{Map, Value};

/// Outcome of planning a single resource.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanResult {
    /// State after apply. `None` plans a destroy, or a failed plan.
    pub planned_state: Option<Value>,
    /// Attribute paths whose change forces destroy-and-recreate.
    pub requires_replace: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl PlanResult {
    pub fn requires_replace(&self) -> bool {
        !self.requires_replace.is_empty()
    }

    /// Whether applying the plan would leave the prior state untouched.
    pub fn is_no_op(&self, prior: Option<&Value>) -> bool {
        self.planned_state.as_ref() == prior
    }
}

/// Plan a resource.
///
/// `config` is `None` when the resource was removed from configuration, which
/// plans a destroy. Invalid configuration yields no planned state and the
/// validation diagnostics.
pub fn plan(schema: &ResourceSchema, prior: Option<&Value>, config: Option<&Value>) -> PlanResult {
    let Some(config) = config else {
        return PlanResult {
            planned_state: None,
            requires_replace: Vec::new(),
            diagnostics: Diagnostics::new(),
        };
    };

    let diagnostics = validate_config(schema, config);
    if diagnostics.has_error() {
        return PlanResult {
            planned_state: None,
            requires_replace: Vec::new(),
            diagnostics,
        };
    }

    let empty = Map::new();
    let config_obj = config.as_object().unwrap_or(&empty);
    let prior_obj = prior.and_then(Value::as_object);

    let mut planned = Map::new();
    let mut requires_replace = Vec::new();

    for attr in &schema.attributes {
        let configured = config_obj
            .get(&attr.name)
            .filter(|v| !v.is_null())
            .map(|v| {
                let mut v = v.clone();
                fill_unset_nested(&attr.attribute_type, &mut v);
                clear_if_empty(attr, &mut v);
                v
            })
            .filter(|v| !v.is_null());
        let prior_value = prior_obj
            .and_then(|obj| obj.get(&attr.name))
            .filter(|v| !v.is_null());

        let mut value = match configured {
            Some(v) => v,
            None if attr.mode.is_computed()
                && attr.has_plan_modifier(PlanModifier::UseStateForUnknown) =>
            {
                prior_value.cloned().unwrap_or(Value::Null)
            }
            None => Value::Null,
        };

        if let Some(prior_value) = prior_value {
            preserve_masked(attr, prior_value, &mut value);

            if attr.has_plan_modifier(PlanModifier::RequiresReplace)
                && !value.is_null()
                && value != *prior_value
            {
                debug!(
                    "{}: change to '{}' requires replacement",
                    schema.type_name, attr.name
                );
                requires_replace.push(attr.name.clone());
            }
        }

        planned.insert(attr.name.clone(), value);
    }

    PlanResult {
        planned_state: Some(Value::Object(planned)),
        requires_replace,
        diagnostics,
    }
}

/// Carry sensitive values the platform masked on read over from prior state.
///
/// Applies to every attribute carrying [`PlanModifier::PreserveSensitive`],
/// including those nested inside objects. A refreshed value is considered
/// masked when it is absent, `null` or the empty string.
pub fn preserve_sensitive(schema: &ResourceSchema, prior: &Value, refreshed: &mut Value) {
    let (Some(prior_obj), Some(refreshed_obj)) = (prior.as_object(), refreshed.as_object_mut())
    else {
        return;
    };
    preserve_in_object(&schema.attributes, prior_obj, refreshed_obj);
}

fn preserve_in_object(
    attributes: &[AttributeSchema],
    prior: &Map<String, Value>,
    refreshed: &mut Map<String, Value>,
) {
    for attr in attributes {
        let Some(prior_value) = prior.get(&attr.name).filter(|v| !v.is_null()) else {
            continue;
        };
        let slot = refreshed.entry(attr.name.clone()).or_insert(Value::Null);
        preserve_masked(attr, prior_value, slot);
    }
}

fn preserve_masked(attr: &AttributeSchema, prior: &Value, current: &mut Value) {
    if attr.has_plan_modifier(PlanModifier::PreserveSensitive) {
        if is_masked(current) && !is_masked(prior) {
            *current = prior.clone();
        }
        return;
    }
    if let (AttributeType::Object(nested), Some(prior_obj), Some(current_obj)) = (
        &attr.attribute_type,
        prior.as_object(),
        current.as_object_mut(),
    ) {
        preserve_in_object(nested, prior_obj, current_obj);
    }
}

/// Give every nested attribute an explicit `null` when the configuration
/// leaves it out or sets an optional one empty, so configured blocks compare
/// equal to refreshed state.
fn fill_unset_nested(attribute_type: &AttributeType, value: &mut Value) {
    let fill_object = |nested: &[AttributeSchema], obj: &mut Map<String, Value>| {
        for attr in nested {
            let slot = obj.entry(attr.name.clone()).or_insert(Value::Null);
            fill_unset_nested(&attr.attribute_type, slot);
            clear_if_empty(attr, slot);
        }
    };
    match (attribute_type, value) {
        (AttributeType::Object(nested), Value::Object(obj)) => fill_object(nested.as_slice(), obj),
        (AttributeType::ObjectList(nested), Value::Array(items)) => {
            for item in items {
                if let Value::Object(obj) = item {
                    fill_object(nested.as_slice(), obj);
                }
            }
        }
        _ => {}
    }
}

fn clear_if_empty(attr: &AttributeSchema, value: &mut Value) {
    if attr.mode != AttributeMode::Optional {
        return;
    }
    let empty = match value {
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(obj) => obj.values().all(Value::is_null),
        _ => false,
    };
    if empty {
        *value = Value::Null;
    }
}

fn is_masked(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
