//! Password strength policy of an environment.

use super::{ConfigResource, Scope, str_field};
use crate::error::ProviderResult;
use crate::schema::{
    AttributeSchema, AttributeType, PlanModifier, ResourceSchema, Validator, id_attribute,
    scope_attributes,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

const POLICY_LUDS: &str = "LUDS";
const POLICY_ZXCVBN: &str = "ZXCVBN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordConfig {
    pub project_slug: String,
    pub environment_slug: String,
    #[serde(default)]
    pub check_breach_on_creation: Option<bool>,
    #[serde(default)]
    pub validate_on_login: Option<bool>,
    pub validation_policy: String,
    #[serde(default)]
    pub luds_min_password_length: Option<i64>,
    #[serde(default)]
    pub luds_min_password_complexity: Option<i64>,
}

impl ConfigResource for PasswordConfig {
    const TYPE_NAME: &'static str = "password_config";
    const KIND: &'static str = "password_config";
    const OBJECT_ID_ATTRIBUTE: Option<&'static str> = None;

    fn schema() -> ResourceSchema {
        let [project_slug, environment_slug] = scope_attributes();
        ResourceSchema::new(Self::TYPE_NAME, "Password strength policy.")
            .with_attribute(id_attribute())
            .with_attribute(project_slug)
            .with_attribute(environment_slug)
            .with_attribute(
                AttributeSchema::optional_computed("check_breach_on_creation", AttributeType::Bool)
                    .with_plan_modifier(PlanModifier::UseStateForUnknown),
            )
            .with_attribute(
                AttributeSchema::optional_computed("validate_on_login", AttributeType::Bool)
                    .with_plan_modifier(PlanModifier::UseStateForUnknown),
            )
            .with_attribute(
                AttributeSchema::required("validation_policy", AttributeType::String)
                    .with_validator(Validator::one_of(&[POLICY_LUDS, POLICY_ZXCVBN])),
            )
            .with_attribute(
                AttributeSchema::optional("luds_min_password_length", AttributeType::Int)
                    .with_validator(Validator::IntBetween(8, 32)),
            )
            .with_attribute(
                AttributeSchema::optional("luds_min_password_complexity", AttributeType::Int)
                    .with_validator(Validator::IntBetween(1, 4)),
            )
    }

    fn to_request(&self) -> Value {
        let mut config = Map::new();
        config.insert("validation_policy".to_string(), json!(self.validation_policy));
        if let Some(check) = self.check_breach_on_creation {
            config.insert("check_breach_on_creation".to_string(), json!(check));
        }
        if let Some(validate) = self.validate_on_login {
            config.insert("validate_on_login".to_string(), json!(validate));
        }
        if let Some(length) = self.luds_min_password_length {
            config.insert("luds_min_password_length".to_string(), json!(length));
        }
        if let Some(complexity) = self.luds_min_password_complexity {
            config.insert("luds_min_password_complexity".to_string(), json!(complexity));
        }
        json!({ "password_config": config })
    }

    fn from_response(scope: Scope, _object_id: &str, response: &Value) -> ProviderResult<Self> {
        let config = response.get("password_config").unwrap_or(&Value::Null);
        Ok(Self {
            project_slug: scope.project_slug,
            environment_slug: scope.environment_slug,
            // the platform defaults both checks to on
            check_breach_on_creation: Some(
                config
                    .get("check_breach_on_creation")
                    .and_then(Value::as_bool)
                    .unwrap_or(true),
            ),
            validate_on_login: Some(
                config
                    .get("validate_on_login")
                    .and_then(Value::as_bool)
                    .unwrap_or(true),
            ),
            validation_policy: str_field(config, "validation_policy"),
            luds_min_password_length: config.get("luds_min_password_length").and_then(Value::as_i64),
            luds_min_password_complexity: config
                .get("luds_min_password_complexity")
                .and_then(Value::as_i64),
        })
    }

    fn check(&self) -> Result<(), String> {
        let has_luds_settings =
            self.luds_min_password_length.is_some() || self.luds_min_password_complexity.is_some();
        if has_luds_settings && self.validation_policy != POLICY_LUDS {
            return Err(format!(
                "luds_min_password_length and luds_min_password_complexity require validation_policy = \"{POLICY_LUDS}\""
            ));
        }
        Ok(())
    }
}
