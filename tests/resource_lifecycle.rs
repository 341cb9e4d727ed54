//! Full plan/apply/refresh/import/destroy cycles through the provider surface.

mod common;

use common::{
    datadog_streaming_config, plan_new, provider, provider_with_project, redirect_url_config,
};
use idp_provider::client::ConfigKey;
use serde_json::json;

#[tokio::test]
async fn test_project_lifecycle() {
    let provider = provider();
    let config = json!({"name": "Acme Corp", "vertical": "B2B"});

    let planned = plan_new(&provider, "project", &config);
    assert!(planned["live_project_id"].is_null());

    let state = provider.create("project", &planned).await.unwrap();
    assert_eq!(state["id"], "acme-corp");
    assert_eq!(state["test_environment_slug"], "test");

    // A refresh with unchanged configuration plans nothing.
    let refreshed = provider.read("project", &state).await.unwrap().unwrap();
    assert_eq!(refreshed, state);
    let result = provider
        .plan("project", Some(&refreshed), Some(&config))
        .unwrap();
    assert!(result.is_no_op(Some(&refreshed)), "{:?}", result.planned_state);

    // Renaming updates in place; the slug survives as prior state.
    let renamed = json!({"name": "Acme Inc", "vertical": "B2B"});
    let result = provider
        .plan("project", Some(&refreshed), Some(&renamed))
        .unwrap();
    assert!(!result.requires_replace());
    let planned = result.planned_state.unwrap();
    assert_eq!(planned["project_slug"], "acme-corp");
    let updated = provider
        .update("project", &refreshed, &planned)
        .await
        .unwrap();
    assert_eq!(updated["name"], "Acme Inc");

    // Changing the vertical forces replacement.
    let result = provider
        .plan(
            "project",
            Some(&updated),
            Some(&json!({"name": "Acme Inc", "vertical": "CONSUMER"})),
        )
        .unwrap();
    assert_eq!(result.requires_replace, vec!["vertical".to_string()]);

    provider.delete("project", &updated).await.unwrap();
    assert!(provider.read("project", &updated).await.unwrap().is_none());
    // Deleting twice is fine.
    provider.delete("project", &updated).await.unwrap();
}

#[tokio::test]
async fn test_redirect_url_lifecycle() {
    let provider = provider_with_project().await;
    let config = redirect_url_config("acme", "production", "https://app.acme.com/authenticate");

    let planned = plan_new(&provider, "redirect_url", &config);
    let state = provider.create("redirect_url", &planned).await.unwrap();
    assert_eq!(
        state["id"],
        "acme.production.https://app.acme.com/authenticate"
    );
    assert_eq!(state["valid_types"][1]["type"], "SIGNUP");

    // Creating the same URL again must not silently take it over.
    let diagnostics = provider
        .create("redirect_url", &planned)
        .await
        .unwrap_err();
    assert!(diagnostics.to_string().contains("import it instead"));

    // The import id contains dots in the URL.
    let imported = provider
        .import_state("redirect_url", "acme.production.https://app.acme.com/authenticate")
        .await
        .unwrap();
    assert_eq!(imported, state);

    // Moving the URL to another environment is a replacement.
    let moved = redirect_url_config("acme", "test", "https://app.acme.com/authenticate");
    let result = provider
        .plan("redirect_url", Some(&state), Some(&moved))
        .unwrap();
    assert_eq!(result.requires_replace, vec!["environment_slug".to_string()]);

    provider.delete("redirect_url", &state).await.unwrap();
    assert!(provider.read("redirect_url", &state).await.unwrap().is_none());
}

#[tokio::test]
async fn test_singleton_create_takes_over_defaults() {
    let provider = provider_with_project().await;
    let config = json!({
        "project_slug": "acme",
        "environment_slug": "test",
        "validation_policy": "LUDS",
        "luds_min_password_length": 12,
        "luds_min_password_complexity": 3
    });

    let planned = plan_new(&provider, "password_config", &config);
    let state = provider.create("password_config", &planned).await.unwrap();
    assert_eq!(state["id"], "acme.test");
    assert_eq!(state["check_breach_on_creation"], true);

    // Creating again updates in place.
    provider.create("password_config", &planned).await.unwrap();

    // A later plan keeps the computed flags.
    let result = provider
        .plan("password_config", Some(&state), Some(&config))
        .unwrap();
    assert!(result.is_no_op(Some(&state)));

    let imported = provider
        .import_state("password_config", "acme.test")
        .await
        .unwrap();
    assert_eq!(imported, state);

    let err = provider
        .import_state("password_config", "acme.test.extra")
        .await
        .unwrap_err();
    assert_eq!(err.errors().next().unwrap().summary, "Invalid import ID");
}

#[tokio::test]
async fn test_sensitive_values_survive_refresh() {
    let provider = provider_with_project().await;
    let config = datadog_streaming_config("dd-api-key-1");

    let planned = plan_new(&provider, "event_log_streaming", &config);
    let state = provider.create("event_log_streaming", &planned).await.unwrap();
    assert_eq!(
        state["destination_config"]["datadog"]["api_key"],
        "dd-api-key-1"
    );

    // The platform stored the key but only ever returns it masked.
    let key = ConfigKey::new("acme", "production", "event_log_streaming", "DATADOG");
    let raw = provider.api().raw_config(&key).await.unwrap();
    assert_eq!(raw["destination_config"]["datadog"]["api_key"], "dd-api-key-1");

    let refreshed = provider
        .read("event_log_streaming", &state)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed, state);

    let result = provider
        .plan("event_log_streaming", Some(&refreshed), Some(&config))
        .unwrap();
    assert!(result.is_no_op(Some(&refreshed)));

    // Rotating the key is an in-place update.
    let rotated = datadog_streaming_config("dd-api-key-2");
    let result = provider
        .plan("event_log_streaming", Some(&refreshed), Some(&rotated))
        .unwrap();
    assert!(!result.requires_replace());
    let updated = provider
        .update("event_log_streaming", &refreshed, &result.planned_state.unwrap())
        .await
        .unwrap();
    assert_eq!(
        updated["destination_config"]["datadog"]["api_key"],
        "dd-api-key-2"
    );

    // An imported object has no way of knowing the key.
    let imported = provider
        .import_state("event_log_streaming", "acme.production.DATADOG")
        .await
        .unwrap();
    assert!(imported["destination_config"]["datadog"]["api_key"].is_null());
}

#[tokio::test]
async fn test_trusted_token_profile_gets_generated_id() {
    let provider = provider_with_project().await;
    let config = json!({
        "project_slug": "acme",
        "environment_slug": "production",
        "name": "Auth0",
        "audience": "acme-api",
        "issuer": "https://acme.auth0.com/",
        "public_key_type": "JWK",
        "jwks_url": "https://acme.auth0.com/.well-known/jwks.json",
        "attribute_mapping": {"email": "email", "name": "name"}
    });

    let planned = plan_new(&provider, "trusted_token_profile", &config);
    assert!(planned["profile_id"].is_null());

    let state = provider
        .create("trusted_token_profile", &planned)
        .await
        .unwrap();
    let profile_id = state["profile_id"].as_str().unwrap().to_string();
    assert!(profile_id.starts_with("trusted-token-profile-"));
    assert_eq!(state["id"], format!("acme.production.{profile_id}"));

    // Later plans keep the generated id and update against it.
    let mut changed = config.clone();
    changed["audience"] = json!("acme-api-v2");
    let result = provider
        .plan("trusted_token_profile", Some(&state), Some(&changed))
        .unwrap();
    let planned = result.planned_state.unwrap();
    assert_eq!(planned["profile_id"], profile_id.as_str());
    let updated = provider
        .update("trusted_token_profile", &state, &planned)
        .await
        .unwrap();
    assert_eq!(updated["audience"], "acme-api-v2");
    assert_eq!(updated["profile_id"], profile_id.as_str());

    let ids = provider
        .list_import_ids("trusted_token_profile", "acme", "production")
        .await
        .unwrap();
    assert_eq!(ids, vec![format!("acme.production.{profile_id}")]);
}

#[tokio::test]
async fn test_invalid_configuration_is_reported_per_attribute() {
    let provider = provider();
    let result = provider
        .plan(
            "redirect_url",
            None,
            Some(&json!({
                "project_slug": "",
                "environment_slug": "production",
                "url": "not a url",
                "valid_types": [{"type": "LOGOUT", "is_default": true}],
                "colour": "blue"
            })),
        )
        .unwrap();

    assert!(result.planned_state.is_none());
    let attributes: Vec<_> = result
        .diagnostics
        .errors()
        .filter_map(|d| d.attribute.clone())
        .collect();
    for expected in ["project_slug", "url", "valid_types[0].type", "colour"] {
        assert!(
            attributes.iter().any(|a| a == expected),
            "no diagnostic for {expected}: {attributes:?}"
        );
    }
}

#[tokio::test]
async fn test_destroy_plan_passes_through() {
    let provider = provider();
    let state = json!({"id": "acme.production", "project_slug": "acme", "environment_slug": "production"});
    let result = provider.plan("rbac_policy", Some(&state), None).unwrap();
    assert!(result.planned_state.is_none());
    assert!(result.diagnostics.is_empty());
}

#[tokio::test]
async fn test_deleting_project_removes_its_configuration() {
    let provider = provider();
    let project = provider
        .create(
            "project",
            &plan_new(&provider, "project", &json!({"name": "Acme", "vertical": "CONSUMER"})),
        )
        .await
        .unwrap();
    let url = provider
        .create(
            "redirect_url",
            &plan_new(
                &provider,
                "redirect_url",
                &redirect_url_config("acme", "production", "https://acme.com/cb"),
            ),
        )
        .await
        .unwrap();

    provider.delete("project", &project).await.unwrap();
    assert!(provider.read("redirect_url", &url).await.unwrap().is_none());
    assert_eq!(provider.api().stats().await.config_count, 0);
}

/// Create from `config`, refresh, and plan the same configuration again.
async fn assert_settles(
    provider: &idp_provider::Provider<idp_provider::client::InMemoryManagementApi>,
    type_name: &str,
    config: &serde_json::Value,
) {
    let planned = plan_new(provider, type_name, config);
    let state = provider.create(type_name, &planned).await.unwrap();
    let refreshed = provider.read(type_name, &state).await.unwrap().unwrap();
    assert_eq!(refreshed, state, "{type_name} drifted on refresh");
    let result = provider
        .plan(type_name, Some(&refreshed), Some(config))
        .unwrap();
    assert!(
        result.is_no_op(Some(&refreshed)),
        "{type_name} plans a change: {:?}",
        result.planned_state
    );
}

#[tokio::test]
async fn test_minimal_configuration_settles_for_every_kind() {
    let provider = provider();
    assert_settles(&provider, "project", &json!({"name": "Acme", "vertical": "B2B"})).await;

    let scoped = |extra: serde_json::Value| {
        let mut config = json!({"project_slug": "acme", "environment_slug": "production"});
        for (name, value) in extra.as_object().unwrap() {
            config[name] = value.clone();
        }
        config
    };
    let configs = [
        ("sdk_config", scoped(json!({"enabled": false}))),
        ("password_config", scoped(json!({"validation_policy": "ZXCVBN"}))),
        ("rbac_policy", scoped(json!({}))),
        (
            "redirect_url",
            redirect_url_config("acme", "production", "https://acme.com/cb"),
        ),
        (
            "jwt_template",
            scoped(json!({"template_type": "SESSION", "template_content": "{}"})),
        ),
        ("email_template", scoped(json!({"template_id": "welcome"}))),
        ("event_log_streaming", datadog_streaming_config("dd-api-key-1")),
        (
            "trusted_token_profile",
            scoped(json!({
                "name": "Auth0",
                "audience": "acme-api",
                "issuer": "https://acme.auth0.com/",
                "public_key_type": "JWK",
                "jwks_url": "https://acme.auth0.com/.well-known/jwks.json"
            })),
        ),
    ];
    assert_eq!(configs.len() + 1, provider.resource_types().len());
    for (type_name, config) in &configs {
        assert_settles(&provider, type_name, config).await;
    }
}

#[tokio::test]
async fn test_empty_collections_settle() {
    let provider = provider_with_project().await;
    let scope = json!({"project_slug": "acme", "environment_slug": "test"});

    let mut policy = scope.clone();
    policy["roles"] = json!([]);
    policy["resources"] = json!([]);
    assert_settles(&provider, "rbac_policy", &policy).await;

    let mut policy = scope.clone();
    policy["roles"] = json!([{"role_id": "viewer", "description": "", "permissions": []}]);
    assert_settles(&provider, "rbac_policy", &policy).await;

    let mut profile = scope.clone();
    for (name, value) in [
        ("name", json!("Okta")),
        ("audience", json!("acme-api")),
        ("issuer", json!("https://acme.okta.com/")),
        ("public_key_type", json!("JWK")),
        ("jwks_url", json!("https://acme.okta.com/keys")),
        ("pem_files", json!([])),
        ("attribute_mapping", json!({})),
    ] {
        profile[name] = value;
    }
    assert_settles(&provider, "trusted_token_profile", &profile).await;

    let mut template = scope.clone();
    template["template_id"] = json!("welcome");
    template["name"] = json!("");
    template["sender_information"] = json!({});
    assert_settles(&provider, "email_template", &template).await;
}

#[tokio::test]
async fn test_dotted_slugs_are_rejected() {
    let provider = provider();
    let result = provider
        .plan(
            "project",
            None,
            Some(&json!({"name": "Acme", "vertical": "B2B", "project_slug": "acme.corp"})),
        )
        .unwrap();
    assert!(result.planned_state.is_none());
    let error = result.diagnostics.errors().next().unwrap();
    assert_eq!(error.attribute.as_deref(), Some("project_slug"));

    let result = provider
        .plan(
            "redirect_url",
            None,
            Some(&redirect_url_config("acme.corp", "production", "https://acme.com/cb")),
        )
        .unwrap();
    assert!(result.planned_state.is_none());
    assert!(
        result
            .diagnostics
            .errors()
            .any(|d| d.attribute.as_deref() == Some("project_slug"))
    );

    // An accepted slug always yields an id that imports back to the same state.
    let state = provider
        .create(
            "project",
            &plan_new(
                &provider,
                "project",
                &json!({"name": "Acme", "vertical": "B2B", "project_slug": "acme-corp"}),
            ),
        )
        .await
        .unwrap();
    let url_config = redirect_url_config("acme-corp", "production", "https://acme.com/cb");
    let url = provider
        .create("redirect_url", &plan_new(&provider, "redirect_url", &url_config))
        .await
        .unwrap();
    let imported = provider
        .import_state("redirect_url", url["id"].as_str().unwrap())
        .await
        .unwrap();
    assert_eq!(imported, url);
    assert_eq!(
        provider.import_state("project", state["id"].as_str().unwrap()).await.unwrap(),
        state
    );
}

#[tokio::test]
async fn test_configuration_requires_existing_project() {
    let provider = provider();
    let planned = plan_new(
        &provider,
        "redirect_url",
        &redirect_url_config("globex", "production", "https://globex.com/cb"),
    );
    let diagnostics = provider.create("redirect_url", &planned).await.unwrap_err();
    let error = diagnostics.errors().next().unwrap();
    assert_eq!(error.summary, "Management API error");
    assert!(error.detail.contains("Not found"), "{}", error.detail);
    assert_eq!(provider.api().stats().await.config_count, 0);
}
