//! Provider configuration.
//!
//! The provider block carries the workspace key used to authenticate against
//! the management API and, optionally, the API's base URL. Each setting left
//! empty in the block is read from the environment instead.

use crate::error::{ProviderError, ProviderResult};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

pub const ENV_WORKSPACE_KEY_ID: &str = "IDP_WORKSPACE_KEY_ID";
pub const ENV_WORKSPACE_KEY_SECRET: &str = "IDP_WORKSPACE_KEY_SECRET";
pub const ENV_BASE_URL: &str = "IDP_BASE_URL";

/// Management API endpoint used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://management.idp.example.com";

/// Settings of the provider block.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub workspace_key_id: Option<String>,
    #[serde(default)]
    pub workspace_key_secret: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(workspace_key_id: impl Into<String>, workspace_key_secret: impl Into<String>) -> Self {
        Self {
            workspace_key_id: Some(workspace_key_id.into()),
            workspace_key_secret: Some(workspace_key_secret.into()),
            base_url: None,
        }
    }

    /// Parse a provider block.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] for unknown settings or
    /// settings of the wrong type.
    pub fn from_value(block: &Value) -> ProviderResult<Self> {
        if block.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(block.clone())
            .map_err(|e| ProviderError::configuration(format!("invalid provider block: {e}")))
    }

    /// Fill unset or empty settings from `lookup`, which maps an environment
    /// variable name to its value.
    pub fn with_fallbacks(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fill = |slot: &mut Option<String>, variable: &str| {
            if slot.as_deref().is_none_or(str::is_empty) {
                *slot = lookup(variable).filter(|v| !v.is_empty());
            }
        };
        fill(&mut self.workspace_key_id, ENV_WORKSPACE_KEY_ID);
        fill(&mut self.workspace_key_secret, ENV_WORKSPACE_KEY_SECRET);
        fill(&mut self.base_url, ENV_BASE_URL);
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    /// Check that the configuration is complete.
    ///
    /// # Errors
    ///
    /// Fails when the workspace key id or secret is missing, or the base URL
    /// is not an http(s) URL.
    pub fn validate(&self) -> ProviderResult<()> {
        let missing = |value: &Option<String>| value.as_deref().is_none_or(str::is_empty);
        if missing(&self.workspace_key_id) {
            return Err(ProviderError::configuration(format!(
                "workspace_key_id is required (or set {ENV_WORKSPACE_KEY_ID})"
            )));
        }
        if missing(&self.workspace_key_secret) {
            return Err(ProviderError::configuration(format!(
                "workspace_key_secret is required (or set {ENV_WORKSPACE_KEY_SECRET})"
            )));
        }
        let base_url = self.base_url();
        if !base_url.starts_with("https://") && !base_url.starts_with("http://") {
            return Err(ProviderError::configuration(format!(
                "base_url must start with http:// or https://, got {base_url}"
            )));
        }
        Ok(())
    }
}

// The secret must never reach logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("workspace_key_id", &self.workspace_key_id)
            .field(
                "workspace_key_secret",
                &self.workspace_key_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("base_url", &self.base_url())
            .finish()
    }
}
