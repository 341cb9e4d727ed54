//! Frontend SDK configuration of an environment.
//!
//! The state is flat; the API groups the same settings by product area:
//!
//! ```text
//! {"config": {"basic": {...}, "sessions": {...}, "magic_links": {...},
//!             "otps": {...}, "passwords": {...}}}
//! ```

use super::{ConfigResource, Scope};
use crate::error::ProviderResult;
use crate::schema::{
    AttributeSchema, AttributeType, PlanModifier, ResourceSchema, Validator, id_attribute,
    scope_attributes,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One year.
const MAX_SESSION_DURATION_MINUTES: i64 = 525_600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfig {
    pub project_slug: String,
    pub environment_slug: String,
    pub enabled: bool,
    #[serde(default)]
    pub domains: Option<Vec<String>>,
    #[serde(default)]
    pub bundle_ids: Option<Vec<String>>,
    #[serde(default)]
    pub session_max_duration_minutes: Option<i64>,
    #[serde(default)]
    pub magic_links_login_or_create_enabled: Option<bool>,
    #[serde(default)]
    pub otp_sms_enabled: Option<bool>,
    #[serde(default)]
    pub passwords_enabled: Option<bool>,
}

fn toggle(name: &str) -> AttributeSchema {
    AttributeSchema::optional_computed(name, AttributeType::Bool)
        .with_plan_modifier(PlanModifier::UseStateForUnknown)
}

fn section<'a>(config: &'a Value, name: &str) -> &'a Value {
    config.get(name).unwrap_or(&Value::Null)
}

fn string_list(value: &Value) -> ProviderResult<Option<Vec<String>>> {
    if value.is_null() {
        return Ok(None);
    }
    let list: Vec<String> = serde_json::from_value(value.clone())?;
    Ok(Some(list).filter(|l| !l.is_empty()))
}

impl ConfigResource for SdkConfig {
    const TYPE_NAME: &'static str = "sdk_config";
    const KIND: &'static str = "sdk_config";
    const OBJECT_ID_ATTRIBUTE: Option<&'static str> = None;

    fn schema() -> ResourceSchema {
        let [project_slug, environment_slug] = scope_attributes();
        ResourceSchema::new(Self::TYPE_NAME, "Settings for the frontend SDKs.")
            .with_attribute(id_attribute())
            .with_attribute(project_slug)
            .with_attribute(environment_slug)
            .with_attribute(AttributeSchema::required("enabled", AttributeType::Bool))
            .with_attribute(
                AttributeSchema::optional("domains", AttributeType::StringList)
                    .describe("Origins allowed to call the frontend API."),
            )
            .with_attribute(AttributeSchema::optional("bundle_ids", AttributeType::StringList))
            .with_attribute(
                AttributeSchema::optional_computed("session_max_duration_minutes", AttributeType::Int)
                    .with_validator(Validator::IntBetween(5, MAX_SESSION_DURATION_MINUTES))
                    .with_plan_modifier(PlanModifier::UseStateForUnknown),
            )
            .with_attribute(toggle("magic_links_login_or_create_enabled"))
            .with_attribute(toggle("otp_sms_enabled"))
            .with_attribute(toggle("passwords_enabled"))
    }

    fn to_request(&self) -> Value {
        let mut config = json!({
            "basic": {
                "enabled": self.enabled,
                "domains": self.domains.as_deref().unwrap_or_default(),
                "bundle_ids": self.bundle_ids.as_deref().unwrap_or_default(),
            }
        });
        if let Some(minutes) = self.session_max_duration_minutes {
            config["sessions"] = json!({ "max_session_duration_minutes": minutes });
        }
        if let Some(enabled) = self.magic_links_login_or_create_enabled {
            config["magic_links"] = json!({ "login_or_create_enabled": enabled });
        }
        if let Some(enabled) = self.otp_sms_enabled {
            config["otps"] = json!({ "sms_enabled": enabled });
        }
        if let Some(enabled) = self.passwords_enabled {
            config["passwords"] = json!({ "enabled": enabled });
        }
        json!({ "config": config })
    }

    fn from_response(scope: Scope, _object_id: &str, response: &Value) -> ProviderResult<Self> {
        let config = section(response, "config");
        let basic = section(config, "basic");
        let flag = |area: &str, name: &str, default: bool| {
            Some(
                section(config, area)
                    .get(name)
                    .and_then(Value::as_bool)
                    .unwrap_or(default),
            )
        };
        Ok(Self {
            project_slug: scope.project_slug,
            environment_slug: scope.environment_slug,
            enabled: basic.get("enabled").and_then(Value::as_bool).unwrap_or(false),
            domains: string_list(section(basic, "domains"))?,
            bundle_ids: string_list(section(basic, "bundle_ids"))?,
            session_max_duration_minutes: section(config, "sessions")
                .get("max_session_duration_minutes")
                .and_then(Value::as_i64),
            magic_links_login_or_create_enabled: flag("magic_links", "login_or_create_enabled", false),
            otp_sms_enabled: flag("otps", "sms_enabled", false),
            passwords_enabled: flag("passwords", "enabled", false),
        })
    }

    fn check(&self) -> Result<(), String> {
        let has_origins = self.domains.as_ref().is_some_and(|d| !d.is_empty())
            || self.bundle_ids.as_ref().is_some_and(|b| !b.is_empty());
        if self.enabled && !has_origins {
            return Err("an enabled SDK needs at least one domain or bundle id".to_string());
        }
        for domain in self.domains.as_deref().unwrap_or_default() {
            if !domain.starts_with("https://") && !domain.starts_with("http://localhost") {
                return Err(format!(
                    "domain {domain} must use https (plain http is only allowed for localhost)"
                ));
            }
        }
        Ok(())
    }
}
