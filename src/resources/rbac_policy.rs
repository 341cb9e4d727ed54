//! Role-based access control policy of an environment.
//!
//! One policy per environment, holding every custom role and resource. Roles
//! grant actions on resources through permissions.

use super::{ConfigResource, Scope};
use crate::error::ProviderResult;
use crate::schema::{
    AttributeSchema, AttributeType, ResourceSchema, Validator, id_attribute, scope_attributes,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub resource_id: String,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub role_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<Permission>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyResource {
    pub resource_id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub available_actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbacPolicy {
    pub project_slug: String,
    pub environment_slug: String,
    #[serde(default)]
    pub roles: Option<Vec<Role>>,
    #[serde(default)]
    pub resources: Option<Vec<PolicyResource>>,
}

impl RbacPolicy {
    fn roles(&self) -> &[Role] {
        self.roles.as_deref().unwrap_or_default()
    }

    fn resources(&self) -> &[PolicyResource] {
        self.resources.as_deref().unwrap_or_default()
    }
}

fn permission_attributes() -> Vec<AttributeSchema> {
    vec![
        AttributeSchema::required("resource_id", AttributeType::String),
        AttributeSchema::required("actions", AttributeType::StringList)
            .with_validator(Validator::NonEmpty),
    ]
}

impl ConfigResource for RbacPolicy {
    const TYPE_NAME: &'static str = "rbac_policy";
    const KIND: &'static str = "rbac_policy";
    const OBJECT_ID_ATTRIBUTE: Option<&'static str> = None;

    fn schema() -> ResourceSchema {
        let [project_slug, environment_slug] = scope_attributes();
        ResourceSchema::new(Self::TYPE_NAME, "Custom roles and resources.")
            .with_attribute(id_attribute())
            .with_attribute(project_slug)
            .with_attribute(environment_slug)
            .with_attribute(AttributeSchema::optional(
                "roles",
                AttributeType::ObjectList(vec![
                    AttributeSchema::required("role_id", AttributeType::String)
                        .with_validator(Validator::NonEmpty),
                    AttributeSchema::optional("description", AttributeType::String),
                    AttributeSchema::optional(
                        "permissions",
                        AttributeType::ObjectList(permission_attributes()),
                    ),
                ]),
            ))
            .with_attribute(AttributeSchema::optional(
                "resources",
                AttributeType::ObjectList(vec![
                    AttributeSchema::required("resource_id", AttributeType::String)
                        .with_validator(Validator::NonEmpty),
                    AttributeSchema::optional("description", AttributeType::String),
                    AttributeSchema::required("available_actions", AttributeType::StringList),
                ]),
            ))
    }

    fn to_request(&self) -> Value {
        json!({
            "policy": {
                "custom_roles": self.roles(),
                "custom_resources": self.resources(),
            }
        })
    }

    fn from_response(scope: Scope, _object_id: &str, response: &Value) -> ProviderResult<Self> {
        let policy = response.get("policy").unwrap_or(&Value::Null);
        let roles: Vec<Role> = match policy.get("custom_roles") {
            Some(roles) => serde_json::from_value(roles.clone())?,
            None => Vec::new(),
        };
        let resources: Vec<PolicyResource> = match policy.get("custom_resources") {
            Some(resources) => serde_json::from_value(resources.clone())?,
            None => Vec::new(),
        };
        Ok(Self {
            project_slug: scope.project_slug,
            environment_slug: scope.environment_slug,
            roles: Some(roles).filter(|r| !r.is_empty()),
            resources: Some(resources).filter(|r| !r.is_empty()),
        })
    }

    fn check(&self) -> Result<(), String> {
        let mut role_ids = HashSet::new();
        for role in self.roles() {
            if !role_ids.insert(role.role_id.as_str()) {
                return Err(format!("role {} is declared more than once", role.role_id));
            }
        }

        let mut resource_actions = HashMap::new();
        for resource in self.resources() {
            if resource_actions
                .insert(resource.resource_id.as_str(), &resource.available_actions)
                .is_some()
            {
                return Err(format!(
                    "resource {} is declared more than once",
                    resource.resource_id
                ));
            }
        }

        for role in self.roles() {
            for permission in role.permissions.as_deref().unwrap_or_default() {
                let Some(available) = resource_actions.get(permission.resource_id.as_str()) else {
                    return Err(format!(
                        "role {} grants permissions on undeclared resource {}",
                        role.role_id, permission.resource_id
                    ));
                };
                for action in &permission.actions {
                    if action != "*" && !available.contains(action) {
                        return Err(format!(
                            "role {} grants action {} not available on resource {}",
                            role.role_id, action, permission.resource_id
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}
