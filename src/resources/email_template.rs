//! Custom email templates.

use super::{ConfigResource, Scope, str_field};
use crate::error::ProviderResult;
use crate::schema::{
    AttributeSchema, AttributeType, PlanModifier, ResourceSchema, Validator, id_attribute,
    scope_attributes,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

const TEMPLATE_TYPES: [&str; 6] = [
    "LOGIN",
    "SIGNUP",
    "INVITE",
    "RESET_PASSWORD",
    "ONE_TIME_PASSCODE",
    "VERIFY_EMAIL",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderInformation {
    #[serde(default)]
    pub from_local_part: Option<String>,
    #[serde(default)]
    pub from_domain: Option<String>,
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default)]
    pub reply_to_local_part: Option<String>,
    #[serde(default)]
    pub reply_to_name: Option<String>,
}

impl SenderInformation {
    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomHtmlCustomization {
    pub template_type: String,
    pub subject: String,
    pub html_content: String,
    #[serde(default)]
    pub plaintext_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub project_slug: String,
    pub environment_slug: String,
    pub template_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sender_information: Option<SenderInformation>,
    #[serde(default)]
    pub custom_html_customization: Option<CustomHtmlCustomization>,
}

fn optional_string(name: &str) -> AttributeSchema {
    AttributeSchema::optional(name, AttributeType::String)
}

impl ConfigResource for EmailTemplate {
    const TYPE_NAME: &'static str = "email_template";
    const KIND: &'static str = "email_template";
    const OBJECT_ID_ATTRIBUTE: Option<&'static str> = Some("template_id");

    fn schema() -> ResourceSchema {
        let [project_slug, environment_slug] = scope_attributes();
        ResourceSchema::new(Self::TYPE_NAME, "A custom email template.")
            .with_attribute(id_attribute())
            .with_attribute(project_slug)
            .with_attribute(environment_slug)
            .with_attribute(
                AttributeSchema::required("template_id", AttributeType::String)
                    .with_validator(Validator::LengthBetween(1, 64))
                    .with_plan_modifier(PlanModifier::RequiresReplace),
            )
            .with_attribute(optional_string("name"))
            .with_attribute(AttributeSchema::optional(
                "sender_information",
                AttributeType::Object(vec![
                    optional_string("from_local_part"),
                    optional_string("from_domain"),
                    optional_string("from_name"),
                    optional_string("reply_to_local_part"),
                    optional_string("reply_to_name"),
                ]),
            ))
            .with_attribute(AttributeSchema::optional(
                "custom_html_customization",
                AttributeType::Object(vec![
                    AttributeSchema::required("template_type", AttributeType::String)
                        .with_validator(Validator::one_of(&TEMPLATE_TYPES)),
                    AttributeSchema::required("subject", AttributeType::String)
                        .with_validator(Validator::NonEmpty),
                    AttributeSchema::required("html_content", AttributeType::String)
                        .with_validator(Validator::NonEmpty),
                    optional_string("plaintext_content"),
                ]),
            ))
    }

    fn to_request(&self) -> Value {
        let mut template = Map::new();
        template.insert("template_id".to_string(), json!(self.template_id));
        if let Some(name) = &self.name {
            template.insert("name".to_string(), json!(name));
        }
        if let Some(sender) = self.sender_information.as_ref().filter(|s| !s.is_empty()) {
            template.insert("sender_information".to_string(), json!(sender));
        }
        if let Some(custom) = &self.custom_html_customization {
            template.insert("custom_html_customization".to_string(), json!(custom));
        }
        json!({ "email_template": template })
    }

    fn from_response(scope: Scope, object_id: &str, response: &Value) -> ProviderResult<Self> {
        let template = response.get("email_template").unwrap_or(&Value::Null);
        let sender_information: Option<SenderInformation> = match template.get("sender_information") {
            Some(sender) => serde_json::from_value(sender.clone())?,
            None => None,
        };
        let custom_html_customization = match template.get("custom_html_customization") {
            Some(custom) => serde_json::from_value(custom.clone())?,
            None => None,
        };
        Ok(Self {
            project_slug: scope.project_slug,
            environment_slug: scope.environment_slug,
            template_id: object_id.to_string(),
            name: Some(str_field(template, "name")).filter(|n| !n.is_empty()),
            sender_information: sender_information.filter(|s| !s.is_empty()),
            custom_html_customization,
        })
    }

    fn check(&self) -> Result<(), String> {
        if let Some(sender) = &self.sender_information
            && sender.from_local_part.is_some() != sender.from_domain.is_some()
        {
            return Err(
                "sender_information.from_local_part and from_domain must be set together"
                    .to_string(),
            );
        }
        Ok(())
    }
}
