//! Resource types and their mapping to the management API.
//!
//! Every resource except [`project`] is an environment-scoped configuration
//! object. Those implement [`ConfigResource`], which describes how a resource's
//! state maps onto an API object; [`crud`] implements create, read, update,
//! delete and import once for all of them.
//!
//! # Identifiers
//!
//! The `id` attribute of an environment-scoped resource, which is also its
//! import identifier, is `<project_slug>.<environment_slug>.<object_id>`, or
//! `<project_slug>.<environment_slug>` for singletons (one object per
//! environment). Slugs never contain dots, so object ids (such as redirect
//! URLs) may.

pub mod crud;
pub mod email_template;
pub mod event_log_streaming;
pub mod jwt_template;
pub mod password_config;
pub mod project;
pub mod rbac_policy;
pub mod redirect_url;
pub mod sdk_config;
pub mod trusted_token_profile;

pub use email_template::EmailTemplate;
pub use event_log_streaming::EventLogStreaming;
pub use jwt_template::JwtTemplate;
pub use password_config::PasswordConfig;
pub use project::ProjectResource;
pub use rbac_policy::RbacPolicy;
pub use redirect_url::RedirectUrl;
pub use sdk_config::SdkConfig;
pub use trusted_token_profile::TrustedTokenProfile;

use crate::error::{ProviderError, ProviderResult};
use crate::schema::ResourceSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// The project and environment a configuration object lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub project_slug: String,
    pub environment_slug: String,
}

impl Scope {
    pub fn new(project_slug: impl Into<String>, environment_slug: impl Into<String>) -> Self {
        Self {
            project_slug: project_slug.into(),
            environment_slug: environment_slug.into(),
        }
    }

    /// Read `project_slug` and `environment_slug` from a state object.
    ///
    /// # Errors
    ///
    /// Fails if either is missing or empty.
    pub fn from_state(state: &Value) -> ProviderResult<Self> {
        let field = |name: &str| {
            state
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ProviderError::invalid_state(format!("missing {name}")))
        };
        Ok(Self::new(field("project_slug")?, field("environment_slug")?))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.project_slug, self.environment_slug)
    }
}

/// An environment-scoped resource backed by a single configuration object.
///
/// The implementing type is the resource's state model: it serializes to the
/// state attributes (minus `id`, which is derived) and deserializes from a
/// configuration or planned state.
pub trait ConfigResource: Serialize + DeserializeOwned + Send + Sync {
    /// Resource type name as used in configuration.
    const TYPE_NAME: &'static str;

    /// Object kind in the management API.
    const KIND: &'static str;

    /// State attribute carrying the object's id within its environment.
    /// `None` for singletons.
    const OBJECT_ID_ATTRIBUTE: Option<&'static str>;

    fn schema() -> ResourceSchema;

    /// API request body for this state.
    fn to_request(&self) -> Value;

    /// Build state from an API response.
    ///
    /// # Errors
    ///
    /// Fails if the response does not have the expected shape.
    fn from_response(scope: Scope, object_id: &str, response: &Value) -> ProviderResult<Self>;

    /// Cross-attribute checks the schema cannot express.
    ///
    /// # Errors
    ///
    /// Returns a description of the inconsistency.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }

    /// Id for a new object whose id is assigned on create rather than
    /// configured. Only consulted when the planned state has none.
    fn generate_object_id() -> Option<String> {
        None
    }
}

/// Build the `id` attribute / import identifier of an environment-scoped object.
pub fn format_import_id(scope: &Scope, object_id: Option<&str>) -> String {
    match object_id {
        Some(object_id) => format!("{scope}.{object_id}"),
        None => scope.to_string(),
    }
}

/// Split an import identifier into scope and object id.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidImportId`] when a part is missing or empty.
pub fn parse_import_id(
    resource_type: &str,
    id: &str,
    singleton: bool,
) -> ProviderResult<(Scope, Option<String>)> {
    let invalid = || ProviderError::InvalidImportId {
        resource_type: resource_type.to_string(),
        id: id.to_string(),
        expected: if singleton {
            "<project_slug>.<environment_slug>".to_string()
        } else {
            "<project_slug>.<environment_slug>.<id>".to_string()
        },
    };

    let parts: Vec<&str> = if singleton {
        id.split('.').collect()
    } else {
        id.splitn(3, '.').collect()
    };
    let expected_parts = if singleton { 2 } else { 3 };
    if parts.len() != expected_parts || parts.iter().any(|p| p.is_empty()) {
        return Err(invalid());
    }

    let scope = Scope::new(parts[0], parts[1]);
    let object_id = parts.get(2).map(|p| (*p).to_string());
    Ok((scope, object_id))
}

/// Every resource type the provider supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Project,
    SdkConfig,
    PasswordConfig,
    RbacPolicy,
    RedirectUrl,
    JwtTemplate,
    EmailTemplate,
    EventLogStreaming,
    TrustedTokenProfile,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 9] = [
        ResourceKind::Project,
        ResourceKind::SdkConfig,
        ResourceKind::PasswordConfig,
        ResourceKind::RbacPolicy,
        ResourceKind::RedirectUrl,
        ResourceKind::JwtTemplate,
        ResourceKind::EmailTemplate,
        ResourceKind::EventLogStreaming,
        ResourceKind::TrustedTokenProfile,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            ResourceKind::Project => ProjectResource::TYPE_NAME,
            ResourceKind::SdkConfig => SdkConfig::TYPE_NAME,
            ResourceKind::PasswordConfig => PasswordConfig::TYPE_NAME,
            ResourceKind::RbacPolicy => RbacPolicy::TYPE_NAME,
            ResourceKind::RedirectUrl => RedirectUrl::TYPE_NAME,
            ResourceKind::JwtTemplate => JwtTemplate::TYPE_NAME,
            ResourceKind::EmailTemplate => EmailTemplate::TYPE_NAME,
            ResourceKind::EventLogStreaming => EventLogStreaming::TYPE_NAME,
            ResourceKind::TrustedTokenProfile => TrustedTokenProfile::TYPE_NAME,
        }
    }

    /// Look up a resource kind by type name.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnsupportedResourceType`] for unknown names.
    pub fn from_type_name(type_name: &str) -> ProviderResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.type_name() == type_name)
            .ok_or_else(|| ProviderError::UnsupportedResourceType(type_name.to_string()))
    }

    pub fn schema(self) -> ResourceSchema {
        match self {
            ResourceKind::Project => ProjectResource::schema(),
            ResourceKind::SdkConfig => SdkConfig::schema(),
            ResourceKind::PasswordConfig => PasswordConfig::schema(),
            ResourceKind::RbacPolicy => RbacPolicy::schema(),
            ResourceKind::RedirectUrl => RedirectUrl::schema(),
            ResourceKind::JwtTemplate => JwtTemplate::schema(),
            ResourceKind::EmailTemplate => EmailTemplate::schema(),
            ResourceKind::EventLogStreaming => EventLogStreaming::schema(),
            ResourceKind::TrustedTokenProfile => TrustedTokenProfile::schema(),
        }
    }

    /// Attribute carrying the object id. `None` for singletons and projects.
    pub fn object_id_attribute(self) -> Option<&'static str> {
        match self {
            ResourceKind::Project => None,
            ResourceKind::SdkConfig => SdkConfig::OBJECT_ID_ATTRIBUTE,
            ResourceKind::PasswordConfig => PasswordConfig::OBJECT_ID_ATTRIBUTE,
            ResourceKind::RbacPolicy => RbacPolicy::OBJECT_ID_ATTRIBUTE,
            ResourceKind::RedirectUrl => RedirectUrl::OBJECT_ID_ATTRIBUTE,
            ResourceKind::JwtTemplate => JwtTemplate::OBJECT_ID_ATTRIBUTE,
            ResourceKind::EmailTemplate => EmailTemplate::OBJECT_ID_ATTRIBUTE,
            ResourceKind::EventLogStreaming => EventLogStreaming::OBJECT_ID_ATTRIBUTE,
            ResourceKind::TrustedTokenProfile => TrustedTokenProfile::OBJECT_ID_ATTRIBUTE,
        }
    }

    /// Compute the `id` attribute for a state object of this kind.
    ///
    /// # Errors
    ///
    /// Fails if the state lacks the fields the id is built from.
    pub fn state_id(self, state: &Value) -> ProviderResult<String> {
        if self == ResourceKind::Project {
            return state
                .get("project_slug")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ProviderError::invalid_state("missing project_slug"));
        }

        let scope = Scope::from_state(state)?;
        match self.object_id_attribute() {
            Some(attribute) => {
                let object_id = state
                    .get(attribute)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| ProviderError::invalid_state(format!("missing {attribute}")))?;
                Ok(format_import_id(&scope, Some(object_id)))
            }
            None => Ok(format_import_id(&scope, None)),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Read a string field from an API response, treating absence as empty.
pub(crate) fn str_field(response: &Value, name: &str) -> String {
    response
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
