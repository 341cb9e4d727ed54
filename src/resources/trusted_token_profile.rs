//! Trusted token profiles: external JWT issuers whose tokens can be exchanged
//! for platform sessions.

use super::{ConfigResource, Scope, str_field};
use crate::error::ProviderResult;
use crate::schema::{
    AttributeSchema, AttributeType, PlanModifier, ResourceSchema, Validator, id_attribute,
    scope_attributes,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use uuid::Uuid;

const KEY_TYPE_JWK: &str = "JWK";
const KEY_TYPE_PEM: &str = "PEM";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedTokenProfile {
    pub project_slug: String,
    pub environment_slug: String,
    /// Assigned on create.
    #[serde(default)]
    pub profile_id: String,
    pub name: String,
    pub audience: String,
    pub issuer: String,
    pub public_key_type: String,
    #[serde(default)]
    pub jwks_url: Option<String>,
    #[serde(default)]
    pub pem_files: Option<Vec<String>>,
    #[serde(default)]
    pub attribute_mapping: Option<BTreeMap<String, String>>,
}

impl ConfigResource for TrustedTokenProfile {
    const TYPE_NAME: &'static str = "trusted_token_profile";
    const KIND: &'static str = "trusted_token_profile";
    const OBJECT_ID_ATTRIBUTE: Option<&'static str> = Some("profile_id");

    fn schema() -> ResourceSchema {
        let [project_slug, environment_slug] = scope_attributes();
        ResourceSchema::new(Self::TYPE_NAME, "An external issuer of trusted JWTs.")
            .with_attribute(id_attribute())
            .with_attribute(project_slug)
            .with_attribute(environment_slug)
            .with_attribute(
                AttributeSchema::computed("profile_id", AttributeType::String)
                    .with_plan_modifier(PlanModifier::UseStateForUnknown),
            )
            .with_attribute(
                AttributeSchema::required("name", AttributeType::String)
                    .with_validator(Validator::LengthBetween(1, 128)),
            )
            .with_attribute(
                AttributeSchema::required("audience", AttributeType::String)
                    .with_validator(Validator::NonEmpty),
            )
            .with_attribute(
                AttributeSchema::required("issuer", AttributeType::String)
                    .with_validator(Validator::NonEmpty),
            )
            .with_attribute(
                AttributeSchema::required("public_key_type", AttributeType::String)
                    .with_validator(Validator::one_of(&[KEY_TYPE_JWK, KEY_TYPE_PEM])),
            )
            .with_attribute(
                AttributeSchema::optional("jwks_url", AttributeType::String)
                    .with_validator(Validator::Url),
            )
            .with_attribute(AttributeSchema::optional("pem_files", AttributeType::StringList))
            .with_attribute(
                AttributeSchema::optional("attribute_mapping", AttributeType::StringMap)
                    .describe("Maps token claims to user attributes."),
            )
    }

    fn to_request(&self) -> Value {
        let mut request = Map::new();
        request.insert("name".to_string(), json!(self.name));
        request.insert("audience".to_string(), json!(self.audience));
        request.insert("issuer".to_string(), json!(self.issuer));
        request.insert("public_key_type".to_string(), json!(self.public_key_type));
        if let Some(url) = &self.jwks_url {
            request.insert("jwks_url".to_string(), json!(url));
        }
        if let Some(pem_files) = &self.pem_files {
            request.insert("pem_files".to_string(), json!(pem_files));
        }
        request.insert(
            "attribute_mapping".to_string(),
            json!(self.attribute_mapping.clone().unwrap_or_default()),
        );
        Value::Object(request)
    }

    fn from_response(scope: Scope, object_id: &str, response: &Value) -> ProviderResult<Self> {
        let pem_files: Option<Vec<String>> = match response.get("pem_files") {
            Some(files) if !files.is_null() => serde_json::from_value(files.clone())?,
            _ => None,
        };
        let attribute_mapping: Option<BTreeMap<String, String>> =
            match response.get("attribute_mapping") {
                Some(mapping) if !mapping.is_null() => serde_json::from_value(mapping.clone())?,
                _ => None,
            };
        Ok(Self {
            project_slug: scope.project_slug,
            environment_slug: scope.environment_slug,
            profile_id: object_id.to_string(),
            name: str_field(response, "name"),
            audience: str_field(response, "audience"),
            issuer: str_field(response, "issuer"),
            public_key_type: str_field(response, "public_key_type"),
            jwks_url: Some(str_field(response, "jwks_url")).filter(|u| !u.is_empty()),
            pem_files: pem_files.filter(|f| !f.is_empty()),
            attribute_mapping: attribute_mapping.filter(|m| !m.is_empty()),
        })
    }

    fn check(&self) -> Result<(), String> {
        match self.public_key_type.as_str() {
            KEY_TYPE_JWK if self.jwks_url.is_none() => {
                Err("public_key_type JWK requires jwks_url".to_string())
            }
            KEY_TYPE_PEM if self.pem_files.as_ref().is_none_or(Vec::is_empty) => {
                Err("public_key_type PEM requires at least one pem_files entry".to_string())
            }
            KEY_TYPE_PEM if self.jwks_url.is_some() => {
                Err("jwks_url cannot be used with public_key_type PEM".to_string())
            }
            _ => Ok(()),
        }
    }

    fn generate_object_id() -> Option<String> {
        Some(format!("trusted-token-profile-{}", Uuid::new_v4()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> TrustedTokenProfile {
        TrustedTokenProfile {
            project_slug: "acme".to_string(),
            environment_slug: "production".to_string(),
            profile_id: "trusted-token-profile-1".to_string(),
            name: "Auth0".to_string(),
            audience: "acme-api".to_string(),
            issuer: "https://acme.auth0.com/".to_string(),
            public_key_type: KEY_TYPE_JWK.to_string(),
            jwks_url: Some("https://acme.auth0.com/.well-known/jwks.json".to_string()),
            pem_files: None,
            attribute_mapping: Some(BTreeMap::from([(
                "email".to_string(),
                "email".to_string(),
            )])),
        }
    }

    #[test]
    fn test_round_trip_through_api_shape() {
        let original = profile();
        let read = TrustedTokenProfile::from_response(
            Scope::new("acme", "production"),
            "trusted-token-profile-1",
            &original.to_request(),
        )
        .unwrap();
        assert_eq!(read, original);
    }

    #[test]
    fn test_key_type_requirements() {
        let mut profile = profile();
        assert!(profile.check().is_ok());

        profile.public_key_type = KEY_TYPE_PEM.to_string();
        assert!(profile.check().unwrap_err().contains("pem_files"));

        profile.pem_files = Some(vec!["-----BEGIN PUBLIC KEY-----".to_string()]);
        assert!(profile.check().unwrap_err().contains("jwks_url"));

        profile.jwks_url = None;
        assert!(profile.check().is_ok());

        profile.public_key_type = KEY_TYPE_JWK.to_string();
        assert!(profile.check().is_err());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let first = TrustedTokenProfile::generate_object_id().unwrap();
        let second = TrustedTokenProfile::generate_object_id().unwrap();
        assert!(first.starts_with("trusted-token-profile-"));
        assert_ne!(first, second);
    }
}
