//! Create, read, update, delete and import for configuration-object resources.
//!
//! Each operation is a straight translation: state → request body → API call →
//! response → state. The only state carried across operations is what the
//! engine persists; nothing is cached here.

use super::{ConfigResource, Scope, format_import_id, parse_import_id};
use crate::client::{ConfigKey, ManagementApi};
use crate::error::{ProviderError, ProviderResult};
use crate::plan::preserve_sensitive;
use log::{debug, info, trace};
use serde_json::Value;

fn key_for<R: ConfigResource>(scope: &Scope, object_id: Option<&str>) -> ConfigKey {
    ConfigKey::new(
        &scope.project_slug,
        &scope.environment_slug,
        R::KIND,
        object_id.unwrap_or_default(),
    )
}

/// Object id stored in a state object, if the resource has one.
fn object_id_from_state<R: ConfigResource>(state: &Value) -> ProviderResult<Option<String>> {
    let Some(attribute) = R::OBJECT_ID_ATTRIBUTE else {
        return Ok(None);
    };
    state
        .get(attribute)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| Some(s.to_string()))
        .ok_or_else(|| {
            ProviderError::invalid_state(format!("{} state is missing {attribute}", R::TYPE_NAME))
        })
}

/// Serialize a model into state and attach its `id`.
fn into_state<R: ConfigResource>(
    model: &R,
    scope: &Scope,
    object_id: Option<&str>,
    prior: Option<&Value>,
) -> ProviderResult<Value> {
    let mut state = serde_json::to_value(model)?;
    if let Some(obj) = state.as_object_mut() {
        obj.insert(
            "id".to_string(),
            Value::String(format_import_id(scope, object_id)),
        );
    }
    if let Some(prior) = prior {
        preserve_sensitive(&R::schema(), prior, &mut state);
    }
    Ok(state)
}

async fn put<R: ConfigResource, A: ManagementApi>(
    api: &A,
    operation: &str,
    planned: &Value,
    scope: &Scope,
    object_id: Option<&str>,
) -> ProviderResult<Value> {
    let model: R = serde_json::from_value(planned.clone())?;
    model.check().map_err(|message| ProviderError::InvalidConfig {
        resource_type: R::TYPE_NAME.to_string(),
        message,
    })?;
    let key = key_for::<R>(scope, object_id);
    let request = model.to_request();

    let response = api
        .put_config(key, request)
        .await
        .map_err(|e| ProviderError::api(format!("{operation} {}", R::TYPE_NAME), &e))?;

    let refreshed = R::from_response(scope.clone(), object_id.unwrap_or_default(), &response)?;
    into_state(&refreshed, scope, object_id, Some(planned))
}

/// Create the object described by a planned state and return the new state.
///
/// # Errors
///
/// Fails if the planned state is malformed, a non-singleton object already
/// exists at the same id, or the API call fails.
pub async fn create<R: ConfigResource, A: ManagementApi>(
    api: &A,
    planned: &Value,
) -> ProviderResult<Value> {
    let scope = Scope::from_state(planned)?;
    let object_id = match R::OBJECT_ID_ATTRIBUTE {
        None => None,
        Some(attribute) => {
            let configured = planned
                .get(attribute)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            let object_id = configured.or_else(R::generate_object_id).ok_or_else(|| {
                ProviderError::invalid_state(format!(
                    "{} plan is missing {attribute}",
                    R::TYPE_NAME
                ))
            })?;
            Some(object_id)
        }
    };

    let mut planned = planned.clone();
    if let (Some(attribute), Some(object_id), Some(obj)) = (
        R::OBJECT_ID_ATTRIBUTE,
        object_id.as_deref(),
        planned.as_object_mut(),
    ) {
        obj.insert(attribute.to_string(), Value::String(object_id.to_string()));
    }

    info!(
        "Creating {} {}",
        R::TYPE_NAME,
        format_import_id(&scope, object_id.as_deref())
    );

    // Singletons always exist on the platform; only identified objects can collide.
    if object_id.is_some() {
        let key = key_for::<R>(&scope, object_id.as_deref());
        let existing = api
            .get_config(key.clone())
            .await
            .map_err(|e| ProviderError::api(format!("create {}", R::TYPE_NAME), &e))?;
        if existing.is_some() {
            return Err(ProviderError::Api {
                operation: format!("create {}", R::TYPE_NAME),
                message: format!("{key} already exists; import it instead"),
            });
        }
    }

    put::<R, A>(api, "create", &planned, &scope, object_id.as_deref()).await
}

/// Refresh a state from the platform.
///
/// Returns `None` when the object no longer exists, which removes the
/// resource from state. Sensitive values the platform masks are carried over
/// from `prior`.
///
/// # Errors
///
/// Fails if the prior state is malformed or the API call fails.
pub async fn read<R: ConfigResource, A: ManagementApi>(
    api: &A,
    prior: &Value,
) -> ProviderResult<Option<Value>> {
    let scope = Scope::from_state(prior)?;
    let object_id = object_id_from_state::<R>(prior)?;
    let key = key_for::<R>(&scope, object_id.as_deref());
    debug!("Reading {} {}", R::TYPE_NAME, key);

    let response = api
        .get_config(key)
        .await
        .map_err(|e| ProviderError::api(format!("read {}", R::TYPE_NAME), &e))?;

    let Some(response) = response else {
        info!(
            "{} {} no longer exists; removing from state",
            R::TYPE_NAME,
            format_import_id(&scope, object_id.as_deref())
        );
        return Ok(None);
    };
    trace!("{} response: {}", R::TYPE_NAME, response);

    let refreshed = R::from_response(
        scope.clone(),
        object_id.as_deref().unwrap_or_default(),
        &response,
    )?;
    into_state(&refreshed, &scope, object_id.as_deref(), Some(prior)).map(Some)
}

/// Apply a planned state to an existing object.
///
/// # Errors
///
/// Fails if either state is malformed or the API call fails.
pub async fn update<R: ConfigResource, A: ManagementApi>(
    api: &A,
    prior: &Value,
    planned: &Value,
) -> ProviderResult<Value> {
    let scope = Scope::from_state(prior)?;
    let object_id = object_id_from_state::<R>(prior)?;

    // The id attribute may be computed and therefore unset in the plan.
    let mut planned = planned.clone();
    if let (Some(attribute), Some(object_id), Some(obj)) = (
        R::OBJECT_ID_ATTRIBUTE,
        object_id.as_deref(),
        planned.as_object_mut(),
    ) {
        let slot = obj.entry(attribute.to_string()).or_insert(Value::Null);
        if slot.is_null() {
            *slot = Value::String(object_id.to_string());
        }
    }

    info!(
        "Updating {} {}",
        R::TYPE_NAME,
        format_import_id(&scope, object_id.as_deref())
    );
    put::<R, A>(api, "update", &planned, &scope, object_id.as_deref()).await
}

/// Delete the object behind a state. Already-deleted objects are not an error.
///
/// # Errors
///
/// Fails if the state is malformed or the API call fails.
pub async fn delete<R: ConfigResource, A: ManagementApi>(
    api: &A,
    state: &Value,
) -> ProviderResult<()> {
    let scope = Scope::from_state(state)?;
    let object_id = object_id_from_state::<R>(state)?;
    let key = key_for::<R>(&scope, object_id.as_deref());
    info!("Deleting {} {}", R::TYPE_NAME, key);

    let existed = api
        .delete_config(key)
        .await
        .map_err(|e| ProviderError::api(format!("delete {}", R::TYPE_NAME), &e))?;
    if !existed {
        debug!("{} was already deleted", R::TYPE_NAME);
    }
    Ok(())
}

/// Import an existing object by import identifier and return its state.
///
/// # Errors
///
/// Fails if the identifier is malformed, the object does not exist, or the
/// API call fails.
pub async fn import<R: ConfigResource, A: ManagementApi>(
    api: &A,
    import_id: &str,
) -> ProviderResult<Value> {
    let (scope, object_id) =
        parse_import_id(R::TYPE_NAME, import_id, R::OBJECT_ID_ATTRIBUTE.is_none())?;

    let mut partial = serde_json::Map::new();
    partial.insert("project_slug".to_string(), Value::String(scope.project_slug.clone()));
    partial.insert(
        "environment_slug".to_string(),
        Value::String(scope.environment_slug.clone()),
    );
    if let (Some(attribute), Some(object_id)) = (R::OBJECT_ID_ATTRIBUTE, object_id.as_deref()) {
        partial.insert(attribute.to_string(), Value::String(object_id.to_string()));
    }

    info!("Importing {} {}", R::TYPE_NAME, import_id);
    read::<R, A>(api, &Value::Object(partial))
        .await?
        .ok_or_else(|| ProviderError::Api {
            operation: format!("import {}", R::TYPE_NAME),
            message: format!("cannot import non-existent remote object {import_id}"),
        })
}

/// Import identifiers of every object of this resource type in an environment.
///
/// # Errors
///
/// Fails if the API call fails.
pub async fn list_import_ids<R: ConfigResource, A: ManagementApi>(
    api: &A,
    scope: &Scope,
) -> ProviderResult<Vec<String>> {
    let prefix = ConfigKey::prefix(&scope.project_slug, &scope.environment_slug, R::KIND);
    debug!("Listing {} objects under {}", R::TYPE_NAME, prefix);
    let objects = api
        .list_configs(prefix)
        .await
        .map_err(|e| ProviderError::api(format!("list {}", R::TYPE_NAME), &e))?;
    Ok(objects
        .into_iter()
        .map(|(key, _)| {
            let object_id = R::OBJECT_ID_ATTRIBUTE.map(|_| key.id());
            format_import_id(scope, object_id)
        })
        .collect())
}
