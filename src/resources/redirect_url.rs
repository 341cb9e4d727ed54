//! Redirect URLs allowed after authentication flows.

use super::{ConfigResource, Scope, str_field};
use crate::error::{ProviderError, ProviderResult};
use crate::schema::{
    AttributeSchema, AttributeType, PlanModifier, ResourceSchema, Validator, id_attribute,
    scope_attributes,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashSet;

const REDIRECT_TYPES: [&str; 5] = ["LOGIN", "SIGNUP", "INVITE", "RESET_PASSWORD", "DISCOVERY"];

/// A flow the URL may be redirected to from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidType {
    #[serde(rename = "type")]
    pub redirect_type: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectUrl {
    pub project_slug: String,
    pub environment_slug: String,
    pub url: String,
    pub valid_types: Vec<ValidType>,
}

impl ConfigResource for RedirectUrl {
    const TYPE_NAME: &'static str = "redirect_url";
    const KIND: &'static str = "redirect_url";
    const OBJECT_ID_ATTRIBUTE: Option<&'static str> = Some("url");

    fn schema() -> ResourceSchema {
        let [project_slug, environment_slug] = scope_attributes();
        ResourceSchema::new(Self::TYPE_NAME, "A URL users may be redirected to.")
            .with_attribute(id_attribute())
            .with_attribute(project_slug)
            .with_attribute(environment_slug)
            .with_attribute(
                AttributeSchema::required("url", AttributeType::String)
                    .with_validator(Validator::Url)
                    .with_plan_modifier(PlanModifier::RequiresReplace),
            )
            .with_attribute(
                AttributeSchema::required(
                    "valid_types",
                    AttributeType::ObjectList(vec![
                        AttributeSchema::required("type", AttributeType::String)
                            .with_validator(Validator::one_of(&REDIRECT_TYPES)),
                        AttributeSchema::required("is_default", AttributeType::Bool),
                    ]),
                )
                .with_validator(Validator::NonEmpty),
            )
    }

    fn to_request(&self) -> Value {
        json!({
            "url": self.url,
            "valid_types": self.valid_types,
        })
    }

    fn from_response(scope: Scope, object_id: &str, response: &Value) -> ProviderResult<Self> {
        let valid_types = match response.get("valid_types") {
            Some(types) => serde_json::from_value(types.clone())?,
            None => Vec::new(),
        };
        let url = match str_field(response, "url") {
            url if url.is_empty() => object_id.to_string(),
            url => url,
        };
        if url != object_id {
            return Err(ProviderError::invalid_state(format!(
                "redirect URL response for {object_id} returned {url}"
            )));
        }
        Ok(Self {
            project_slug: scope.project_slug,
            environment_slug: scope.environment_slug,
            url,
            valid_types,
        })
    }

    fn check(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for valid_type in &self.valid_types {
            if !seen.insert(valid_type.redirect_type.as_str()) {
                return Err(format!(
                    "redirect type {} listed more than once for {}",
                    valid_type.redirect_type, self.url
                ));
            }
        }
        Ok(())
    }
}
