//! Custom claim templates for session and machine-to-machine JWTs.

use super::{ConfigResource, Scope, str_field};
use crate::error::{ProviderError, ProviderResult};
use crate::schema::{
    AttributeSchema, AttributeType, PlanModifier, ResourceSchema, Validator, id_attribute,
    scope_attributes,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const TEMPLATE_TYPES: [&str; 2] = ["SESSION", "M2M"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtTemplate {
    pub project_slug: String,
    pub environment_slug: String,
    pub template_type: String,
    pub template_content: String,
    #[serde(default)]
    pub custom_audience: Option<String>,
}

impl ConfigResource for JwtTemplate {
    const TYPE_NAME: &'static str = "jwt_template";
    const KIND: &'static str = "jwt_template";
    const OBJECT_ID_ATTRIBUTE: Option<&'static str> = Some("template_type");

    fn schema() -> ResourceSchema {
        let [project_slug, environment_slug] = scope_attributes();
        ResourceSchema::new(Self::TYPE_NAME, "Custom claims added to issued JWTs.")
            .with_attribute(id_attribute())
            .with_attribute(project_slug)
            .with_attribute(environment_slug)
            .with_attribute(
                AttributeSchema::required("template_type", AttributeType::String)
                    .with_validator(Validator::one_of(&TEMPLATE_TYPES))
                    .with_plan_modifier(PlanModifier::RequiresReplace),
            )
            .with_attribute(
                AttributeSchema::required("template_content", AttributeType::String)
                    .describe("JSON template rendered into the token's custom claims."),
            )
            .with_attribute(AttributeSchema::optional("custom_audience", AttributeType::String))
    }

    fn to_request(&self) -> Value {
        let mut request = json!({
            "template_type": self.template_type,
            "template_content": self.template_content,
        });
        if let Some(audience) = &self.custom_audience {
            request["custom_audience"] = json!(audience);
        }
        request
    }

    fn from_response(scope: Scope, object_id: &str, response: &Value) -> ProviderResult<Self> {
        if !response.is_object() {
            return Err(ProviderError::invalid_state(
                "JWT template response is not an object",
            ));
        }
        let custom_audience = Some(str_field(response, "custom_audience")).filter(|a| !a.is_empty());
        Ok(Self {
            project_slug: scope.project_slug,
            environment_slug: scope.environment_slug,
            template_type: object_id.to_string(),
            template_content: str_field(response, "template_content"),
            custom_audience,
        })
    }

    fn check(&self) -> Result<(), String> {
        serde_json::from_str::<Value>(&self.template_content)
            .map(|_| ())
            .map_err(|e| format!("template_content is not valid JSON: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audience_omitted_when_unset() {
        let template = JwtTemplate {
            project_slug: "acme".to_string(),
            environment_slug: "production".to_string(),
            template_type: "SESSION".to_string(),
            template_content: r#"{"role": "{{ user.trusted_metadata.role }}"}"#.to_string(),
            custom_audience: None,
        };
        let request = template.to_request();
        assert!(request.get("custom_audience").is_none());
        assert!(template.check().is_ok());
    }

    #[test]
    fn test_empty_audience_reads_as_unset() {
        let template = JwtTemplate::from_response(
            Scope::new("acme", "test"),
            "M2M",
            &json!({"template_content": "{}", "custom_audience": ""}),
        )
        .unwrap();
        assert_eq!(template.template_type, "M2M");
        assert!(template.custom_audience.is_none());
    }

    #[test]
    fn test_invalid_template_content() {
        let template = JwtTemplate {
            project_slug: "acme".to_string(),
            environment_slug: "production".to_string(),
            template_type: "SESSION".to_string(),
            template_content: "{not json".to_string(),
            custom_audience: None,
        };
        assert!(template.check().unwrap_err().contains("not valid JSON"));
    }
}
