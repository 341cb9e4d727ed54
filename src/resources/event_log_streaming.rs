//! Streaming of event logs to an external log destination.
//!
//! One object per destination type. Credentials are write-only: the platform
//! returns them masked, so state keeps the configured value instead.

use super::{ConfigResource, Scope};
use crate::error::{ProviderError, ProviderResult};
use crate::schema::{
    AttributeSchema, AttributeType, PlanModifier, ResourceSchema, Validator, id_attribute,
    scope_attributes,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const DESTINATION_DATADOG: &str = "DATADOG";
pub const DESTINATION_GRAFANA_LOKI: &str = "GRAFANA_LOKI";

const DATADOG_SITES: [&str; 5] = ["US", "EU", "US3", "US5", "AP1"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatadogConfig {
    pub site: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrafanaLokiConfig {
    pub hostname: String,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationConfig {
    #[serde(default)]
    pub datadog: Option<DatadogConfig>,
    #[serde(default)]
    pub grafana_loki: Option<GrafanaLokiConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogStreaming {
    pub project_slug: String,
    pub environment_slug: String,
    pub destination_type: String,
    pub destination_config: DestinationConfig,
}

fn secret(name: &str) -> AttributeSchema {
    AttributeSchema::required(name, AttributeType::String)
        .sensitive()
        .with_validator(Validator::NonEmpty)
        .with_plan_modifier(PlanModifier::PreserveSensitive)
}

fn unmask(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl ConfigResource for EventLogStreaming {
    const TYPE_NAME: &'static str = "event_log_streaming";
    const KIND: &'static str = "event_log_streaming";
    const OBJECT_ID_ATTRIBUTE: Option<&'static str> = Some("destination_type");

    fn schema() -> ResourceSchema {
        let [project_slug, environment_slug] = scope_attributes();
        ResourceSchema::new(Self::TYPE_NAME, "Streams event logs to a log destination.")
            .with_attribute(id_attribute())
            .with_attribute(project_slug)
            .with_attribute(environment_slug)
            .with_attribute(
                AttributeSchema::required("destination_type", AttributeType::String)
                    .with_validator(Validator::one_of(&[
                        DESTINATION_DATADOG,
                        DESTINATION_GRAFANA_LOKI,
                    ]))
                    .with_plan_modifier(PlanModifier::RequiresReplace),
            )
            .with_attribute(AttributeSchema::required(
                "destination_config",
                AttributeType::Object(vec![
                    AttributeSchema::optional(
                        "datadog",
                        AttributeType::Object(vec![
                            AttributeSchema::required("site", AttributeType::String)
                                .with_validator(Validator::one_of(&DATADOG_SITES)),
                            secret("api_key"),
                        ]),
                    ),
                    AttributeSchema::optional(
                        "grafana_loki",
                        AttributeType::Object(vec![
                            AttributeSchema::required("hostname", AttributeType::String)
                                .with_validator(Validator::NonEmpty),
                            AttributeSchema::required("username", AttributeType::String)
                                .with_validator(Validator::NonEmpty),
                            secret("password"),
                        ]),
                    ),
                ]),
            ))
    }

    fn to_request(&self) -> Value {
        let mut destination_config = json!({});
        if let Some(datadog) = &self.destination_config.datadog {
            destination_config["datadog"] = json!(datadog);
        }
        if let Some(loki) = &self.destination_config.grafana_loki {
            destination_config["grafana_loki"] = json!(loki);
        }
        json!({
            "destination_type": self.destination_type,
            "destination_config": destination_config,
        })
    }

    fn from_response(scope: Scope, object_id: &str, response: &Value) -> ProviderResult<Self> {
        let destination_type = response
            .get("destination_type")
            .and_then(Value::as_str)
            .unwrap_or(object_id);
        if destination_type != object_id {
            return Err(ProviderError::invalid_state(format!(
                "event log streaming response for {object_id} returned {destination_type}"
            )));
        }
        let mut destination_config: DestinationConfig = match response.get("destination_config") {
            Some(config) => serde_json::from_value(config.clone())?,
            None => DestinationConfig::default(),
        };
        if let Some(datadog) = destination_config.datadog.as_mut() {
            datadog.api_key = unmask(datadog.api_key.take());
        }
        if let Some(loki) = destination_config.grafana_loki.as_mut() {
            loki.password = unmask(loki.password.take());
        }
        Ok(Self {
            project_slug: scope.project_slug,
            environment_slug: scope.environment_slug,
            destination_type: object_id.to_string(),
            destination_config,
        })
    }

    fn check(&self) -> Result<(), String> {
        let config = &self.destination_config;
        let (has_matching, has_other) = match self.destination_type.as_str() {
            DESTINATION_DATADOG => (config.datadog.is_some(), config.grafana_loki.is_some()),
            DESTINATION_GRAFANA_LOKI => (config.grafana_loki.is_some(), config.datadog.is_some()),
            other => return Err(format!("unknown destination_type {other}")),
        };
        if !has_matching || has_other {
            return Err(format!(
                "destination_config must contain exactly the {} block",
                self.destination_type.to_lowercase()
            ));
        }
        Ok(())
    }
}
