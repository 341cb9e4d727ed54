//! Upgrading persisted state to the current schema version.
//!
//! # Versions
//!
//! * **1** - resources addressed their project by a legacy project identifier
//!   (`project_id`; `live_project_id` for the project resource)
//! * **2** - resources carry `project_slug` but no `environment_slug`; every
//!   object lived in the live environment
//! * **3** - resources carry `project_slug` and `environment_slug`
//!
//! Upgrades run in sequence, so version 1 state passes through the version 2
//! step. The resource `id` is recomputed once at the end.

use crate::client::ManagementApi;
use crate::error::{ProviderError, ProviderResult};
use crate::resolver::{DEFAULT_LIVE_ENVIRONMENT_SLUG, resolve_legacy_project_id};
use crate::resources::ResourceKind;
use crate::schema::CURRENT_SCHEMA_VERSION;
use log::{debug, info};
use serde_json::{Map, Value};

const LEGACY_PROJECT_ID: &str = "project_id";

/// Upgrade `state`, persisted at `version`, to [`CURRENT_SCHEMA_VERSION`].
///
/// Current-version state is returned unchanged.
///
/// # Errors
///
/// Fails for unknown versions, state that is not an object or lacks the
/// fields its version requires, and legacy identifiers that cannot be
/// resolved. Nothing is retried.
pub async fn upgrade_state<A: ManagementApi>(
    api: &A,
    kind: ResourceKind,
    version: u64,
    state: Value,
) -> ProviderResult<Value> {
    if version == CURRENT_SCHEMA_VERSION {
        return Ok(state);
    }
    if version == 0 || version > CURRENT_SCHEMA_VERSION {
        return Err(ProviderError::UnsupportedStateVersion {
            resource_type: kind.type_name().to_string(),
            version,
        });
    }

    let Value::Object(mut obj) = state else {
        return Err(ProviderError::invalid_state(format!(
            "{kind} state at version {version} is not an object"
        )));
    };

    info!("Upgrading {} state from version {} to {}", kind, version, CURRENT_SCHEMA_VERSION);
    if version == 1 {
        upgrade_v1(api, kind, &mut obj).await?;
    }
    upgrade_v2(kind, &mut obj);

    let mut state = Value::Object(obj);
    let id = kind.state_id(&state)?;
    debug!("Upgraded {} state id: {}", kind, id);
    if let Some(obj) = state.as_object_mut() {
        obj.insert("id".to_string(), Value::String(id));
    }
    Ok(state)
}

/// Replace the legacy project identifier with slugs.
async fn upgrade_v1<A: ManagementApi>(
    api: &A,
    kind: ResourceKind,
    obj: &mut Map<String, Value>,
) -> ProviderResult<()> {
    let legacy_field = match kind {
        ResourceKind::Project => "live_project_id",
        _ => LEGACY_PROJECT_ID,
    };
    let legacy_project_id = obj
        .get(legacy_field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let resolved = resolve_legacy_project_id(api, &legacy_project_id).await?;
    obj.insert(
        "project_slug".to_string(),
        Value::String(resolved.project_slug),
    );
    if kind != ResourceKind::Project {
        obj.remove(LEGACY_PROJECT_ID);
        obj.insert(
            "environment_slug".to_string(),
            Value::String(resolved.environment_slug),
        );
    }
    Ok(())
}

/// Pin live-only state to the live environment.
fn upgrade_v2(kind: ResourceKind, obj: &mut Map<String, Value>) {
    if kind == ResourceKind::Project {
        return;
    }
    let slot = obj
        .entry("environment_slug".to_string())
        .or_insert(Value::Null);
    let missing = slot.as_str().is_none_or(str::is_empty);
    if missing {
        *slot = Value::String(DEFAULT_LIVE_ENVIRONMENT_SLUG.to_string());
    }
}
