//! Shared helpers for the integration tests.
//!
//! Each test binary only uses some of these.
#![allow(dead_code)]

use idp_provider::client::{
    InMemoryManagementApi, LegacyProject, ManagementApi, ProjectRequest, Vertical,
};
use idp_provider::{Provider, ProviderBuilder};
use serde_json::{Value, json};

pub const LIVE_ID: &str = "project-live-0a1b2c";
pub const TEST_ID: &str = "project-test-3d4e5f";

/// Route log output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A provider over a fresh in-memory API.
pub fn provider() -> Provider<InMemoryManagementApi> {
    init_logging();
    ProviderBuilder::new(InMemoryManagementApi::new())
        .with_workspace_key("workspace-key-test-1", "test-secret")
        .with_env_lookup(|_| None)
        .build()
        .expect("test provider configuration is complete")
}

/// A provider whose API already holds project `acme` with the `production`
/// and `test` environments.
pub async fn provider_with_project() -> Provider<InMemoryManagementApi> {
    let provider = provider();
    provider
        .api()
        .create_project(ProjectRequest {
            name: "Acme".to_string(),
            vertical: Vertical::B2b,
            project_slug: None,
        })
        .await
        .expect("project acme is created");
    provider
}

/// A legacy record for project `acme` addressing both halves.
pub fn legacy_record(live_environment_slug: &str, test_environment_slug: &str) -> LegacyProject {
    LegacyProject {
        project_slug: "acme".to_string(),
        live_project_id: LIVE_ID.to_string(),
        test_project_id: TEST_ID.to_string(),
        live_environment_slug: live_environment_slug.to_string(),
        test_environment_slug: test_environment_slug.to_string(),
    }
}

/// Register `record` under both of its legacy identifiers.
pub async fn seed_legacy(api: &InMemoryManagementApi, record: LegacyProject) {
    api.seed_legacy_project(record.live_project_id.clone(), record.clone())
        .await;
    api.seed_legacy_project(record.test_project_id.clone(), record)
        .await;
}

pub fn redirect_url_config(project_slug: &str, environment_slug: &str, url: &str) -> Value {
    json!({
        "project_slug": project_slug,
        "environment_slug": environment_slug,
        "url": url,
        "valid_types": [
            {"type": "LOGIN", "is_default": true},
            {"type": "SIGNUP", "is_default": false}
        ]
    })
}

pub fn datadog_streaming_config(api_key: &str) -> Value {
    json!({
        "project_slug": "acme",
        "environment_slug": "production",
        "destination_type": "DATADOG",
        "destination_config": {
            "datadog": {"site": "US5", "api_key": api_key}
        }
    })
}

/// Plan a new resource and fail the test on any diagnostic.
pub fn plan_new(provider: &Provider<InMemoryManagementApi>, type_name: &str, config: &Value) -> Value {
    let result = provider
        .plan(type_name, None, Some(config))
        .expect("known resource type");
    assert!(
        !result.diagnostics.has_error(),
        "unexpected diagnostics: {}",
        result.diagnostics
    );
    result.planned_state.expect("create plan has a planned state")
}
