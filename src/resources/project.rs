//! Projects.
//!
//! A project owns a live and a test environment, which the platform creates
//! with it. Unlike configuration objects a project is addressed by its slug
//! alone, which is also its `id` and import identifier.

use crate::client::{ManagementApi, Project, ProjectRequest, Vertical, is_valid_slug};
use crate::error::{ProviderError, ProviderResult};
use crate::schema::{
    AttributeSchema, AttributeType, PlanModifier, ResourceSchema, Validator, id_attribute,
};
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;

/// Configurable part of a project state.
#[derive(Debug, Clone, Deserialize)]
struct ProjectConfig {
    #[serde(default)]
    project_slug: Option<String>,
    name: String,
    vertical: Vertical,
}

impl ProjectConfig {
    fn from_state(state: &Value) -> ProviderResult<Self> {
        Ok(serde_json::from_value(state.clone())?)
    }
}

fn computed(name: &str) -> AttributeSchema {
    AttributeSchema::computed(name, AttributeType::String)
        .with_plan_modifier(PlanModifier::UseStateForUnknown)
}

fn slug_from_state(state: &Value) -> ProviderResult<&str> {
    state
        .get("project_slug")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProviderError::invalid_state("project state is missing project_slug"))
}

fn to_state(project: &Project) -> ProviderResult<Value> {
    let mut state = serde_json::to_value(project)?;
    if let Some(obj) = state.as_object_mut() {
        obj.insert(
            "id".to_string(),
            Value::String(project.project_slug.clone()),
        );
    }
    Ok(state)
}

/// The `project` resource.
pub struct ProjectResource;

impl ProjectResource {
    pub const TYPE_NAME: &'static str = "project";

    pub fn schema() -> ResourceSchema {
        ResourceSchema::new(
            Self::TYPE_NAME,
            "A project with its live and test environments.",
        )
        .with_attribute(id_attribute())
        .with_attribute(
            AttributeSchema::optional_computed("project_slug", AttributeType::String)
                .with_validator(Validator::LengthBetween(2, 64))
                .with_validator(Validator::Slug)
                .with_plan_modifier(PlanModifier::RequiresReplace)
                .with_plan_modifier(PlanModifier::UseStateForUnknown)
                .describe("Derived from the name when not set."),
        )
        .with_attribute(
            AttributeSchema::required("name", AttributeType::String)
                .with_validator(Validator::LengthBetween(1, 128)),
        )
        .with_attribute(
            AttributeSchema::required("vertical", AttributeType::String)
                .with_validator(Validator::one_of(&Vertical::ALL))
                .with_plan_modifier(PlanModifier::RequiresReplace),
        )
        .with_attribute(computed("live_environment_slug"))
        .with_attribute(computed("test_environment_slug"))
        .with_attribute(computed("live_project_id").describe("Legacy identifier of the live environment."))
        .with_attribute(computed("test_project_id").describe("Legacy identifier of the test environment."))
        .with_attribute(computed("created_at"))
    }

    /// Create a project and return its state.
    ///
    /// # Errors
    ///
    /// Fails if the plan is malformed or the API rejects the project, for
    /// example because the slug is taken.
    pub async fn create<A: ManagementApi>(api: &A, planned: &Value) -> ProviderResult<Value> {
        let config = ProjectConfig::from_state(planned)?;
        info!(
            "Creating project '{}' ({})",
            config.name,
            config.project_slug.as_deref().unwrap_or("slug derived from name")
        );
        let project = api
            .create_project(ProjectRequest {
                name: config.name,
                vertical: config.vertical,
                project_slug: config.project_slug.filter(|s| !s.is_empty()),
            })
            .await
            .map_err(|e| ProviderError::api("create project", &e))?;
        to_state(&project)
    }

    /// Refresh a project state. `None` when the project no longer exists.
    ///
    /// # Errors
    ///
    /// Fails if the state has no slug or the API call fails.
    pub async fn read<A: ManagementApi>(api: &A, prior: &Value) -> ProviderResult<Option<Value>> {
        let slug = slug_from_state(prior)?;
        debug!("Reading project {}", slug);
        let project = api
            .get_project(slug)
            .await
            .map_err(|e| ProviderError::api("read project", &e))?;
        match project {
            Some(project) => to_state(&project).map(Some),
            None => {
                info!("Project {} no longer exists; removing from state", slug);
                Ok(None)
            }
        }
    }

    /// Rename a project. Slug and vertical changes are replacements and never
    /// reach this point.
    ///
    /// # Errors
    ///
    /// Fails if either state is malformed or the API call fails.
    pub async fn update<A: ManagementApi>(
        api: &A,
        prior: &Value,
        planned: &Value,
    ) -> ProviderResult<Value> {
        let slug = slug_from_state(prior)?;
        let config = ProjectConfig::from_state(planned)?;
        info!("Updating project {}", slug);
        let project = api
            .update_project(
                slug,
                ProjectRequest {
                    name: config.name,
                    vertical: config.vertical,
                    project_slug: None,
                },
            )
            .await
            .map_err(|e| ProviderError::api("update project", &e))?;
        to_state(&project)
    }

    /// Delete a project together with its environments and their
    /// configuration. An already-deleted project is not an error.
    ///
    /// # Errors
    ///
    /// Fails if the state has no slug or the API call fails.
    pub async fn delete<A: ManagementApi>(api: &A, state: &Value) -> ProviderResult<()> {
        let slug = slug_from_state(state)?;
        info!("Deleting project {}", slug);
        let existed = api
            .delete_project(slug)
            .await
            .map_err(|e| ProviderError::api("delete project", &e))?;
        if !existed {
            debug!("Project {} was already deleted", slug);
        }
        Ok(())
    }

    /// Import a project by slug.
    ///
    /// # Errors
    ///
    /// Fails if the identifier is not a valid slug, the project does not
    /// exist, or the API call fails.
    pub async fn import<A: ManagementApi>(api: &A, import_id: &str) -> ProviderResult<Value> {
        if !is_valid_slug(import_id) {
            return Err(ProviderError::InvalidImportId {
                resource_type: Self::TYPE_NAME.to_string(),
                id: import_id.to_string(),
                expected: "<project_slug>".to_string(),
            });
        }
        info!("Importing project {}", import_id);
        let partial = serde_json::json!({ "project_slug": import_id });
        Self::read(api, &partial)
            .await?
            .ok_or_else(|| ProviderError::Api {
                operation: "import project".to_string(),
                message: format!("cannot import non-existent remote object {import_id}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemoryManagementApi;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_populates_computed_attributes() {
        let api = InMemoryManagementApi::new();
        let state = ProjectResource::create(
            &api,
            &json!({"name": "Acme Corp", "vertical": "B2B", "project_slug": null}),
        )
        .await
        .unwrap();

        assert_eq!(state["id"], "acme-corp");
        assert_eq!(state["project_slug"], "acme-corp");
        assert_eq!(state["vertical"], "B2B");
        assert_eq!(state["live_environment_slug"], "production");
        assert_eq!(state["test_environment_slug"], "test");
        assert!(
            state["live_project_id"]
                .as_str()
                .unwrap()
                .starts_with("project-live-")
        );
    }

    #[tokio::test]
    async fn test_read_missing_project() {
        let api = InMemoryManagementApi::new();
        let read = ProjectResource::read(&api, &json!({"project_slug": "gone"}))
            .await
            .unwrap();
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn test_import_rejects_scoped_id() {
        let api = InMemoryManagementApi::new();
        let err = ProjectResource::import(&api, "acme.production")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidImportId { .. }));
    }

    #[tokio::test]
    async fn test_update_renames() {
        let api = InMemoryManagementApi::new();
        let state = ProjectResource::create(
            &api,
            &json!({"name": "Acme", "vertical": "CONSUMER", "project_slug": "acme"}),
        )
        .await
        .unwrap();

        let mut planned = state.clone();
        planned["name"] = json!("Acme Inc");
        let updated = ProjectResource::update(&api, &state, &planned).await.unwrap();
        assert_eq!(updated["name"], "Acme Inc");
        assert_eq!(updated["created_at"], state["created_at"]);
    }
}
