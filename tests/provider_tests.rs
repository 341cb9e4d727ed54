//! Provider configuration, schema introspection and failure reporting.

mod common;

use common::{init_logging, provider, provider_with_project, redirect_url_config};
use idp_provider::client::InMemoryManagementApi;
use idp_provider::{CURRENT_SCHEMA_VERSION, ProviderBuilder, ProviderConfig};
use serde_json::json;

#[test]
fn test_every_resource_type_has_a_current_schema() {
    let provider = provider();
    let types = provider.resource_types();
    assert_eq!(types.len(), 9);
    for expected in [
        "project",
        "sdk_config",
        "password_config",
        "rbac_policy",
        "redirect_url",
        "jwt_template",
        "email_template",
        "event_log_streaming",
        "trusted_token_profile",
    ] {
        assert!(types.contains(&expected), "missing {expected}");
    }

    for schema in provider.schemas() {
        assert_eq!(schema.version, CURRENT_SCHEMA_VERSION, "{}", schema.type_name);
        assert!(schema.attribute("id").is_some(), "{} has no id", schema.type_name);
        if schema.type_name != "project" {
            assert!(schema.attribute("project_slug").is_some());
            assert!(schema.attribute("environment_slug").is_some());
        }
    }
}

#[test]
fn test_only_secrets_are_sensitive() {
    let provider = provider();
    let schema = provider.schema("event_log_streaming").unwrap();
    assert!(!schema.attribute("destination_type").unwrap().sensitive);

    let project = provider.schema("project").unwrap();
    assert!(project.attributes.iter().all(|a| !a.sensitive));
}

#[tokio::test]
async fn test_unknown_resource_type() {
    let provider = provider();
    let err = provider.schema("workflow_trigger").unwrap_err();
    assert_eq!(err.errors().next().unwrap().summary, "Unsupported resource type");

    assert!(provider.validate("workflow_trigger", &json!({})).has_error());
    assert!(provider.create("workflow_trigger", &json!({})).await.is_err());
    assert!(provider.import_state("workflow_trigger", "a.b").await.is_err());
    assert!(provider.upgrade_state("workflow_trigger", 1, json!({})).await.is_err());
}

#[test]
fn test_builder_uses_environment_fallbacks() {
    init_logging();
    let provider = ProviderBuilder::new(InMemoryManagementApi::new())
        .with_env_lookup(|name| match name {
            "IDP_WORKSPACE_KEY_ID" => Some("workspace-key-env".to_string()),
            "IDP_WORKSPACE_KEY_SECRET" => Some("env-secret".to_string()),
            _ => None,
        })
        .build()
        .unwrap();
    assert_eq!(
        provider.config().workspace_key_id.as_deref(),
        Some("workspace-key-env")
    );
    assert_eq!(provider.config().base_url(), idp_provider::provider::DEFAULT_BASE_URL);
}

#[test]
fn test_builder_rejects_incomplete_configuration() {
    init_logging();
    let err = ProviderBuilder::new(InMemoryManagementApi::new())
        .with_config(ProviderConfig::from_value(&json!({"workspace_key_id": "k"})).unwrap())
        .with_env_lookup(|_| None)
        .build()
        .err()
        .unwrap();
    assert!(err.to_string().contains("workspace_key_secret"));
}

#[test]
fn test_secret_is_not_printed() {
    let config = ProviderConfig::new("workspace-key-1", "very-secret-value");
    let printed = format!("{config:?}");
    assert!(!printed.contains("very-secret-value"));
    assert!(printed.contains("workspace-key-1"));
}

#[tokio::test]
async fn test_unavailable_api_is_reported_per_operation() {
    let provider = provider_with_project().await;
    let state = provider
        .create(
            "redirect_url",
            &redirect_url_config("acme", "production", "https://acme.com/cb"),
        )
        .await
        .unwrap();

    provider.api().set_unavailable(true);
    let diagnostics = provider.read("redirect_url", &state).await.unwrap_err();
    assert_eq!(diagnostics.len(), 1);
    let error = diagnostics.errors().next().unwrap();
    assert_eq!(error.summary, "Management API error");
    assert!(error.detail.contains("connection refused"));

    let diagnostics = provider.delete("redirect_url", &state).await.unwrap_err();
    assert!(diagnostics.errors().next().unwrap().detail.starts_with("delete redirect_url:"));

    provider.api().set_unavailable(false);
    assert!(provider.read("redirect_url", &state).await.unwrap().is_some());
}

#[tokio::test]
async fn test_projects_cannot_be_listed_by_environment() {
    let provider = provider();
    let err = provider
        .list_import_ids("project", "acme", "production")
        .await
        .unwrap_err();
    assert_eq!(
        err.errors().next().unwrap().summary,
        "Invalid resource configuration"
    );
}
