//! In-memory implementation of the management API.
//!
//! Behaves like the platform for the operations the provider uses, closely
//! enough to drive every resource through its full lifecycle in tests:
//!
//! * Creating a project provisions a live (`production`) and a test (`test`)
//!   environment and registers legacy identifiers for both halves
//! * Configuration objects can only be written into an existing project
//!   environment
//! * Sensitive fields are masked on every read, including the body returned
//!   from a PUT
//! * Legacy project records can be seeded directly, including inconsistent
//!   ones the real platform occasionally returns
//! * A switch makes every call fail with a transport error
//!
//! # Example Usage
//!
//! ```rust
//! use idp_provider::client::{InMemoryManagementApi, ManagementApi, ProjectRequest, Vertical};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = InMemoryManagementApi::new();
//! let project = api
//!     .create_project(ProjectRequest {
//!         name: "Acme".to_string(),
//!         vertical: Vertical::Consumer,
//!         project_slug: None,
//!     })
//!     .await?;
//!
//! let legacy = api.get_legacy_project(&project.test_project_id).await?;
//! assert_eq!(legacy.project_slug, project.project_slug);
//! assert_eq!(legacy.test_environment_slug, "test");
//! # Ok(())
//! # }
//! ```

use crate::client::{
    ApiError, ConfigKey, ConfigPrefix, LegacyProject, ManagementApi, Project, ProjectRequest,
    is_valid_slug,
};
use log::{debug, trace};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Environment slug given to a new project's live environment.
pub const LIVE_ENVIRONMENT_SLUG: &str = "production";
/// Environment slug given to a new project's test environment.
pub const TEST_ENVIRONMENT_SLUG: &str = "test";

#[derive(Default)]
struct State {
    projects: HashMap<String, Project>,
    // legacy project id -> record
    legacy: HashMap<String, LegacyProject>,
    // ordered so list results come back sorted by key
    configs: BTreeMap<ConfigKey, Value>,
}

impl State {
    /// Configuration can only be written into an existing environment.
    ///
    /// Projects known only through seeded legacy records accept any
    /// environment.
    fn ensure_environment(&self, key: &ConfigKey) -> Result<(), ApiError> {
        let project_slug = key.project_slug();
        if let Some(project) = self.projects.get(project_slug) {
            let environment_slug = key.environment_slug();
            if environment_slug == project.live_environment_slug
                || environment_slug == project.test_environment_slug
            {
                return Ok(());
            }
            return Err(ApiError::not_found(format!(
                "environment {project_slug}/{environment_slug}"
            )));
        }
        if self
            .legacy
            .values()
            .any(|record| record.project_slug == project_slug)
        {
            return Ok(());
        }
        Err(ApiError::not_found(format!("project {project_slug}")))
    }
}

/// Thread-safe in-memory management API.
///
/// Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct InMemoryManagementApi {
    state: Arc<RwLock<State>>,
    // kind -> dot-separated paths masked on read
    masked_fields: Arc<HashMap<String, Vec<String>>>,
    unavailable: Arc<AtomicBool>,
    legacy_lookups: Arc<AtomicUsize>,
}

/// Object counts held by an [`InMemoryManagementApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryApiStats {
    pub project_count: usize,
    pub legacy_id_count: usize,
    pub config_count: usize,
    /// Legacy lookups attempted, including failed ones.
    pub legacy_lookups: usize,
}

impl InMemoryManagementApi {
    /// Create an empty API that masks the sensitive fields the platform masks.
    pub fn new() -> Self {
        let mut masked = HashMap::new();
        masked.insert(
            "event_log_streaming".to_string(),
            vec![
                "destination_config.datadog.api_key".to_string(),
                "destination_config.grafana_loki.password".to_string(),
            ],
        );
        Self {
            state: Arc::new(RwLock::new(State::default())),
            masked_fields: Arc::new(masked),
            unavailable: Arc::new(AtomicBool::new(false)),
            legacy_lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register a legacy project record under `legacy_project_id`.
    ///
    /// The record is stored as given, without any consistency checks, so tests
    /// can reproduce records with missing slugs or mismatched identifiers.
    pub async fn seed_legacy_project(
        &self,
        legacy_project_id: impl Into<String>,
        project: LegacyProject,
    ) {
        let mut state = self.state.write().await;
        state.legacy.insert(legacy_project_id.into(), project);
    }

    /// Make every subsequent call fail (or succeed again) with a transport error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Read a stored object without masking.
    pub async fn raw_config(&self, key: &ConfigKey) -> Option<Value> {
        let state = self.state.read().await;
        state.configs.get(key).cloned()
    }

    pub async fn stats(&self) -> InMemoryApiStats {
        let state = self.state.read().await;
        InMemoryApiStats {
            project_count: state.projects.len(),
            legacy_id_count: state.legacy.len(),
            config_count: state.configs.len(),
            legacy_lookups: self.legacy_lookups.load(Ordering::SeqCst),
        }
    }

    /// Remove everything.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = State::default();
    }

    fn check_available(&self) -> Result<(), ApiError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ApiError::unavailable(
                "connection refused by management API",
            ));
        }
        Ok(())
    }

    fn mask(&self, kind: &str, mut body: Value) -> Value {
        if let Some(paths) = self.masked_fields.get(kind) {
            for path in paths {
                mask_path(&mut body, path);
            }
        }
        body
    }

    fn slugify(name: &str) -> String {
        let mut slug = String::with_capacity(name.len());
        for ch in name.chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
            } else if !slug.ends_with('-') {
                slug.push('-');
            }
        }
        slug.trim_matches('-').to_string()
    }
}

impl Default for InMemoryManagementApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace the string at a dot-separated path with the empty string.
fn mask_path(body: &mut Value, path: &str) {
    let mut current = body;
    for part in path.split('.') {
        match current.get_mut(part) {
            Some(next) => current = next,
            None => return,
        }
    }
    if current.is_string() {
        *current = Value::String(String::new());
    }
}

impl ManagementApi for InMemoryManagementApi {
    type Error = ApiError;

    async fn get_legacy_project(&self, legacy_project_id: &str) -> Result<LegacyProject, ApiError> {
        self.legacy_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        debug!("Looking up legacy project '{}'", legacy_project_id);
        let state = self.state.read().await;
        state
            .legacy
            .get(legacy_project_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("legacy project {legacy_project_id}")))
    }

    async fn create_project(&self, request: ProjectRequest) -> Result<Project, ApiError> {
        self.check_available()?;
        let slug = match &request.project_slug {
            Some(slug) => slug.clone(),
            None => Self::slugify(&request.name),
        };
        if slug.is_empty() {
            return Err(ApiError::invalid_request(
                "project name must contain at least one alphanumeric character",
            ));
        }
        if !is_valid_slug(&slug) {
            return Err(ApiError::invalid_request(format!(
                "'{slug}' is not a valid project slug"
            )));
        }

        let mut state = self.state.write().await;
        if state.projects.contains_key(&slug) {
            return Err(ApiError::already_exists(format!("project {slug}")));
        }

        let project = Project {
            project_slug: slug.clone(),
            name: request.name,
            vertical: request.vertical,
            live_environment_slug: LIVE_ENVIRONMENT_SLUG.to_string(),
            test_environment_slug: TEST_ENVIRONMENT_SLUG.to_string(),
            live_project_id: format!("project-live-{}", uuid::Uuid::new_v4()),
            test_project_id: format!("project-test-{}", uuid::Uuid::new_v4()),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let legacy = LegacyProject {
            project_slug: slug.clone(),
            live_project_id: project.live_project_id.clone(),
            test_project_id: project.test_project_id.clone(),
            live_environment_slug: project.live_environment_slug.clone(),
            test_environment_slug: project.test_environment_slug.clone(),
        };
        state
            .legacy
            .insert(project.live_project_id.clone(), legacy.clone());
        state.legacy.insert(project.test_project_id.clone(), legacy);
        state.projects.insert(slug, project.clone());

        Ok(project)
    }

    async fn get_project(&self, project_slug: &str) -> Result<Option<Project>, ApiError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.projects.get(project_slug).cloned())
    }

    async fn update_project(
        &self,
        project_slug: &str,
        request: ProjectRequest,
    ) -> Result<Project, ApiError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let project = state
            .projects
            .get_mut(project_slug)
            .ok_or_else(|| ApiError::not_found(format!("project {project_slug}")))?;

        if project.vertical != request.vertical {
            return Err(ApiError::invalid_request(format!(
                "vertical of project {project_slug} cannot change from {} to {}",
                project.vertical, request.vertical
            )));
        }
        project.name = request.name;
        Ok(project.clone())
    }

    async fn delete_project(&self, project_slug: &str) -> Result<bool, ApiError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let Some(project) = state.projects.remove(project_slug) else {
            return Ok(false);
        };
        state.legacy.remove(&project.live_project_id);
        state.legacy.remove(&project.test_project_id);
        state
            .configs
            .retain(|key, _| key.project_slug() != project_slug);
        Ok(true)
    }

    async fn put_config(&self, key: ConfigKey, body: Value) -> Result<Value, ApiError> {
        self.check_available()?;
        if !body.is_object() {
            return Err(ApiError::invalid_request(format!(
                "body for {key} must be a JSON object"
            )));
        }
        trace!("PUT {}", key);
        let kind = key.kind().to_string();
        let mut state = self.state.write().await;
        state.ensure_environment(&key)?;
        state.configs.insert(key, body.clone());
        Ok(self.mask(&kind, body))
    }

    async fn get_config(&self, key: ConfigKey) -> Result<Option<Value>, ApiError> {
        self.check_available()?;
        trace!("GET {}", key);
        let state = self.state.read().await;
        Ok(state
            .configs
            .get(&key)
            .cloned()
            .map(|body| self.mask(key.kind(), body)))
    }

    async fn delete_config(&self, key: ConfigKey) -> Result<bool, ApiError> {
        self.check_available()?;
        trace!("DELETE {}", key);
        let mut state = self.state.write().await;
        Ok(state.configs.remove(&key).is_some())
    }

    async fn list_configs(&self, prefix: ConfigPrefix) -> Result<Vec<(ConfigKey, Value)>, ApiError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .configs
            .iter()
            .filter(|(key, _)| prefix.matches(key))
            .map(|(key, body)| (key.clone(), self.mask(key.kind(), body.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Vertical;
    use serde_json::json;

    fn project_request(name: &str) -> ProjectRequest {
        ProjectRequest {
            name: name.to_string(),
            vertical: Vertical::Consumer,
            project_slug: None,
        }
    }

    async fn api_with_project() -> InMemoryManagementApi {
        let api = InMemoryManagementApi::new();
        api.create_project(project_request("Acme")).await.unwrap();
        api
    }

    #[tokio::test]
    async fn test_create_project_registers_legacy_ids() {
        let api = InMemoryManagementApi::new();
        let project = api.create_project(project_request("Acme Corp")).await.unwrap();
        assert_eq!(project.project_slug, "acme-corp");
        assert!(project.live_project_id.starts_with("project-live-"));
        assert!(project.test_project_id.starts_with("project-test-"));

        let live = api.get_legacy_project(&project.live_project_id).await.unwrap();
        assert_eq!(live.project_slug, "acme-corp");
        assert_eq!(live.live_environment_slug, LIVE_ENVIRONMENT_SLUG);

        let stats = api.stats().await;
        assert_eq!(stats.project_count, 1);
        assert_eq!(stats.legacy_id_count, 2);
    }

    #[tokio::test]
    async fn test_duplicate_project_slug_rejected() {
        let api = InMemoryManagementApi::new();
        api.create_project(project_request("Acme")).await.unwrap();
        let err = api.create_project(project_request("acme")).await.unwrap_err();
        assert!(matches!(err, ApiError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_update_project_rejects_vertical_change() {
        let api = InMemoryManagementApi::new();
        api.create_project(project_request("Acme")).await.unwrap();
        let err = api
            .update_project(
                "acme",
                ProjectRequest {
                    name: "Acme".to_string(),
                    vertical: Vertical::B2b,
                    project_slug: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn test_delete_project_cascades() {
        let api = InMemoryManagementApi::new();
        let project = api.create_project(project_request("Acme")).await.unwrap();
        api.put_config(
            ConfigKey::new("acme", "production", "rbac_policy", ""),
            json!({"roles": []}),
        )
        .await
        .unwrap();

        assert!(api.delete_project("acme").await.unwrap());
        assert!(!api.delete_project("acme").await.unwrap());
        assert!(api.get_legacy_project(&project.live_project_id).await.is_err());
        assert_eq!(api.stats().await.config_count, 0);
    }

    #[tokio::test]
    async fn test_dotted_project_slug_rejected() {
        let api = InMemoryManagementApi::new();
        let err = api
            .create_project(ProjectRequest {
                name: "Acme".to_string(),
                vertical: Vertical::B2b,
                project_slug: Some("acme.corp".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest { .. }));
        assert_eq!(api.stats().await.project_count, 0);
    }

    #[tokio::test]
    async fn test_put_requires_existing_environment() {
        let api = api_with_project().await;
        let err = api
            .put_config(
                ConfigKey::new("globex", "production", "rbac_policy", ""),
                json!({"policy": {}}),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::not_found("project globex"));

        let err = api
            .put_config(
                ConfigKey::new("acme", "staging", "rbac_policy", ""),
                json!({"policy": {}}),
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(api.stats().await.config_count, 0);

        api.put_config(
            ConfigKey::new("acme", "test", "rbac_policy", ""),
            json!({"policy": {}}),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_legacy_only_project_accepts_configuration() {
        let api = InMemoryManagementApi::new();
        api.seed_legacy_project(
            "project-live-1",
            LegacyProject {
                project_slug: "acme".to_string(),
                live_project_id: "project-live-1".to_string(),
                ..Default::default()
            },
        )
        .await;
        api.put_config(
            ConfigKey::new("acme", "production", "sdk_config", ""),
            json!({"config": {}}),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let api = api_with_project().await;
        api.put_config(
            ConfigKey::new("acme", "production", "rbac_policy", ""),
            json!({"policy": {}}),
        )
        .await
        .unwrap();

        api.clear().await;
        let stats = api.stats().await;
        assert_eq!(stats.project_count, 0);
        assert_eq!(stats.legacy_id_count, 0);
        assert_eq!(stats.config_count, 0);
        assert!(api.get_project("acme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sensitive_fields_masked() {
        let api = api_with_project().await;
        let key = ConfigKey::new("acme", "production", "event_log_streaming", "DATADOG");
        let body = json!({
            "destination_type": "DATADOG",
            "destination_config": {"datadog": {"site": "US", "api_key": "dd-secret"}}
        });

        let stored = api.put_config(key.clone(), body).await.unwrap();
        assert_eq!(stored["destination_config"]["datadog"]["api_key"], "");

        let fetched = api.get_config(key.clone()).await.unwrap().unwrap();
        assert_eq!(fetched["destination_config"]["datadog"]["api_key"], "");
        assert_eq!(fetched["destination_config"]["datadog"]["site"], "US");

        let raw = api.raw_config(&key).await.unwrap();
        assert_eq!(raw["destination_config"]["datadog"]["api_key"], "dd-secret");
    }

    #[tokio::test]
    async fn test_list_configs_filters_by_prefix() {
        let api = api_with_project().await;
        for url in ["https://b.example", "https://a.example"] {
            api.put_config(
                ConfigKey::new("acme", "production", "redirect_url", url),
                json!({"url": url}),
            )
            .await
            .unwrap();
        }
        api.put_config(
            ConfigKey::new("acme", "test", "redirect_url", "https://c.example"),
            json!({"url": "https://c.example"}),
        )
        .await
        .unwrap();

        let listed = api
            .list_configs(ConfigKey::prefix("acme", "production", "redirect_url"))
            .await
            .unwrap();
        let ids: Vec<&str> = listed.iter().map(|(key, _)| key.id()).collect();
        assert_eq!(ids, vec!["https://a.example", "https://b.example"]);
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let api = InMemoryManagementApi::new();
        api.set_unavailable(true);
        let err = api.get_legacy_project("project-live-1").await.unwrap_err();
        assert!(matches!(err, ApiError::Unavailable { .. }));
        assert!(api.get_project("acme").await.is_err());

        api.set_unavailable(false);
        assert!(api.get_project("acme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_rejects_non_object() {
        let api = InMemoryManagementApi::new();
        let err = api
            .put_config(ConfigKey::new("acme", "production", "sdk_config", ""), json!([1]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest { .. }));
    }
}
