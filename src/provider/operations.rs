//! Engine operations: validate, plan, create, read, update, delete, import
//! and upgrade.
//!
//! Each operation looks up the resource kind by type name and dispatches to
//! [`ProjectResource`] or to the generic configuration-object CRUD in
//! [`crate::resources::crud`].

use super::core::{Provider, operation_failed};
use crate::client::ManagementApi;
use crate::diagnostics::Diagnostics;
use crate::error::ProviderError;
use crate::plan::{self, PlanResult};
use crate::resources::{
    ConfigResource, EmailTemplate, EventLogStreaming, JwtTemplate, PasswordConfig,
    ProjectResource, RbacPolicy, RedirectUrl, ResourceKind, Scope, SdkConfig, TrustedTokenProfile,
    crud,
};
use crate::schema::validate_config;
use crate::upgrade;
use log::{debug, warn};
use serde_json::Value;

/// Run `$config_call` with `R` bound to the model type of `$kind`, or
/// `$project_call` for projects.
macro_rules! dispatch {
    ($kind:expr, project => $project_call:expr, config<$r:ident> => $config_call:expr) => {
        match $kind {
            ResourceKind::Project => $project_call,
            ResourceKind::SdkConfig => {
                type $r = SdkConfig;
                $config_call
            }
            ResourceKind::PasswordConfig => {
                type $r = PasswordConfig;
                $config_call
            }
            ResourceKind::RbacPolicy => {
                type $r = RbacPolicy;
                $config_call
            }
            ResourceKind::RedirectUrl => {
                type $r = RedirectUrl;
                $config_call
            }
            ResourceKind::JwtTemplate => {
                type $r = JwtTemplate;
                $config_call
            }
            ResourceKind::EmailTemplate => {
                type $r = EmailTemplate;
                $config_call
            }
            ResourceKind::EventLogStreaming => {
                type $r = EventLogStreaming;
                $config_call
            }
            ResourceKind::TrustedTokenProfile => {
                type $r = TrustedTokenProfile;
                $config_call
            }
        }
    };
}

/// Cross-attribute checks of a configuration-object model.
fn check_model<R: ConfigResource>(config: &Value) -> Diagnostics {
    let error = match serde_json::from_value::<R>(config.clone()) {
        Ok(model) => match model.check() {
            Ok(()) => return Diagnostics::new(),
            Err(message) => ProviderError::InvalidConfig {
                resource_type: R::TYPE_NAME.to_string(),
                message,
            },
        },
        Err(e) => ProviderError::from(e),
    };
    Diagnostics::from(error)
}

impl<A: ManagementApi> Provider<A> {
    /// Validate a resource configuration.
    ///
    /// Schema checks run first; cross-attribute checks only run on
    /// configuration that passes them.
    pub fn validate(&self, type_name: &str, config: &Value) -> Diagnostics {
        let kind = match Self::kind(type_name) {
            Ok(kind) => kind,
            Err(diagnostics) => return diagnostics,
        };
        let mut diagnostics = validate_config(&kind.schema(), config);
        if diagnostics.has_error() {
            return diagnostics;
        }
        diagnostics.extend(dispatch!(kind,
            project => Diagnostics::new(),
            config<R> => check_model::<R>(config)
        ));
        diagnostics
    }

    /// Plan a resource. `config` is `None` for a resource removed from
    /// configuration, which plans a destroy.
    ///
    /// # Errors
    ///
    /// Returns an error diagnostic for unknown type names. Invalid
    /// configuration is reported in the [`PlanResult`]'s diagnostics.
    pub fn plan(
        &self,
        type_name: &str,
        prior: Option<&Value>,
        config: Option<&Value>,
    ) -> Result<PlanResult, Diagnostics> {
        let kind = Self::kind(type_name)?;
        let mut result = plan::plan(&kind.schema(), prior, config);
        if let (Some(config), Some(_)) = (config, &result.planned_state) {
            let checks = self.validate(type_name, config);
            if checks.has_error() {
                debug!("Plan for {} rejected by configuration checks", kind);
                result.planned_state = None;
                result.requires_replace.clear();
            }
            result.diagnostics.extend(checks);
        }
        Ok(result)
    }

    /// Create a resource from its planned state and return the new state.
    ///
    /// # Errors
    ///
    /// Returns one error diagnostic describing the failure.
    pub async fn create(&self, type_name: &str, planned: &Value) -> Result<Value, Diagnostics> {
        let kind = Self::kind(type_name)?;
        let api = &self.api;
        dispatch!(kind,
            project => ProjectResource::create(api, planned).await,
            config<R> => crud::create::<R, A>(api, planned).await
        )
        .map_err(|e| operation_failed(kind, "create", e))
    }

    /// Refresh a resource's state. `None` means the remote object is gone and
    /// the resource should be removed from state.
    ///
    /// # Errors
    ///
    /// Returns one error diagnostic describing the failure.
    pub async fn read(&self, type_name: &str, prior: &Value) -> Result<Option<Value>, Diagnostics> {
        let kind = Self::kind(type_name)?;
        let api = &self.api;
        dispatch!(kind,
            project => ProjectResource::read(api, prior).await,
            config<R> => crud::read::<R, A>(api, prior).await
        )
        .map_err(|e| operation_failed(kind, "read", e))
    }

    /// Apply a planned state to an existing resource.
    ///
    /// # Errors
    ///
    /// Returns one error diagnostic describing the failure.
    pub async fn update(
        &self,
        type_name: &str,
        prior: &Value,
        planned: &Value,
    ) -> Result<Value, Diagnostics> {
        let kind = Self::kind(type_name)?;
        let api = &self.api;
        dispatch!(kind,
            project => ProjectResource::update(api, prior, planned).await,
            config<R> => crud::update::<R, A>(api, prior, planned).await
        )
        .map_err(|e| operation_failed(kind, "update", e))
    }

    /// Delete a resource. Deleting an already-deleted resource succeeds.
    ///
    /// # Errors
    ///
    /// Returns one error diagnostic describing the failure.
    pub async fn delete(&self, type_name: &str, state: &Value) -> Result<(), Diagnostics> {
        let kind = Self::kind(type_name)?;
        let api = &self.api;
        dispatch!(kind,
            project => ProjectResource::delete(api, state).await,
            config<R> => crud::delete::<R, A>(api, state).await
        )
        .map_err(|e| operation_failed(kind, "delete", e))
    }

    /// Import an existing remote object by import identifier.
    ///
    /// # Errors
    ///
    /// Returns one error diagnostic for malformed identifiers, missing remote
    /// objects and API failures.
    pub async fn import_state(&self, type_name: &str, import_id: &str) -> Result<Value, Diagnostics> {
        let kind = Self::kind(type_name)?;
        let api = &self.api;
        dispatch!(kind,
            project => ProjectResource::import(api, import_id).await,
            config<R> => crud::import::<R, A>(api, import_id).await
        )
        .map_err(|e| operation_failed(kind, "import", e))
    }

    /// Import identifiers of every object of an environment-scoped resource
    /// type, for discovering objects to import.
    ///
    /// # Errors
    ///
    /// Returns an error diagnostic for projects, which are not environment
    /// scoped, and for API failures.
    pub async fn list_import_ids(
        &self,
        type_name: &str,
        project_slug: &str,
        environment_slug: &str,
    ) -> Result<Vec<String>, Diagnostics> {
        let kind = Self::kind(type_name)?;
        let scope = Scope::new(project_slug, environment_slug);
        let api = &self.api;
        dispatch!(kind,
            project => Err(ProviderError::InvalidConfig {
                resource_type: kind.type_name().to_string(),
                message: "projects are not environment scoped; import them by slug".to_string(),
            }),
            config<R> => crud::list_import_ids::<R, A>(api, &scope).await
        )
        .map_err(|e| operation_failed(kind, "list", e))
    }

    /// Upgrade state persisted at schema `version` to the current version.
    ///
    /// # Errors
    ///
    /// Returns one error diagnostic; a legacy identifier that cannot be
    /// resolved stops the upgrade.
    pub async fn upgrade_state(
        &self,
        type_name: &str,
        version: u64,
        state: Value,
    ) -> Result<Value, Diagnostics> {
        let kind = Self::kind(type_name)?;
        upgrade::upgrade_state(&self.api, kind, version, state)
            .await
            .map_err(|e| {
                warn!("Upgrading {} state from version {} failed: {}", kind, version, e);
                operation_failed(kind, "upgrade", e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemoryManagementApi;
    use crate::provider::ProviderConfig;
    use serde_json::json;

    fn provider() -> Provider<InMemoryManagementApi> {
        Provider::new(
            InMemoryManagementApi::new(),
            ProviderConfig::new("workspace-key-1", "secret"),
        )
    }

    #[test]
    fn test_unknown_type_is_diagnostic() {
        let diagnostics = provider().validate("user", &json!({}));
        assert!(diagnostics.has_error());
        assert!(provider().plan("user", None, Some(&json!({}))).is_err());
    }

    #[test]
    fn test_validate_runs_model_checks() {
        let diagnostics = provider().validate(
            "password_config",
            &json!({
                "project_slug": "acme",
                "environment_slug": "production",
                "validation_policy": "ZXCVBN",
                "luds_min_password_length": 10
            }),
        );
        assert!(diagnostics.has_error());
        assert_eq!(
            diagnostics.errors().next().map(|d| d.summary.as_str()),
            Some("Invalid resource configuration")
        );
    }

    #[test]
    fn test_plan_rejected_by_model_checks() {
        let result = provider()
            .plan(
                "event_log_streaming",
                None,
                Some(&json!({
                    "project_slug": "acme",
                    "environment_slug": "production",
                    "destination_type": "DATADOG",
                    "destination_config": {
                        "grafana_loki": {"hostname": "h", "username": "u", "password": "p"}
                    }
                })),
            )
            .unwrap();
        assert!(result.planned_state.is_none());
        assert!(result.diagnostics.has_error());
    }

    #[tokio::test]
    async fn test_api_failure_names_operation() {
        let provider = provider();
        provider.api().set_unavailable(true);
        let diagnostics = provider
            .read(
                "jwt_template",
                &json!({"project_slug": "acme", "environment_slug": "production", "template_type": "SESSION"}),
            )
            .await
            .unwrap_err();
        let error = diagnostics.errors().next().unwrap();
        assert_eq!(error.summary, "Management API error");
        assert!(error.detail.starts_with("read jwt_template:"));
    }
}
