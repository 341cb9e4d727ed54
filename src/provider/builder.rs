//! Builder for configured [`Provider`] instances.

use super::config::ProviderConfig;
use super::core::Provider;
use crate::client::ManagementApi;
use crate::error::ProviderResult;
use log::info;

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Builder wiring a [`ProviderConfig`] and a [`ManagementApi`] into a
/// [`Provider`].
///
/// Settings missing from the configuration are read from the process
/// environment at [`build`](Self::build) time.
///
/// # Examples
///
/// ```rust
/// use idp_provider::ProviderBuilder;
/// use idp_provider::client::InMemoryManagementApi;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new(InMemoryManagementApi::new())
///     .with_workspace_key("workspace-key-prod-1", "secret")
///     .with_base_url("http://localhost:8080")
///     .build()?;
/// assert_eq!(provider.config().base_url(), "http://localhost:8080");
/// # Ok(())
/// # }
/// ```
pub struct ProviderBuilder<A> {
    api: A,
    config: ProviderConfig,
    env: fn(&str) -> Option<String>,
}

impl<A: ManagementApi> ProviderBuilder<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            config: ProviderConfig::default(),
            env: process_env,
        }
    }

    /// Replace the whole configuration, typically one parsed from the
    /// provider block with [`ProviderConfig::from_value`].
    pub fn with_config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_workspace_key(
        mut self,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
    ) -> Self {
        self.config.workspace_key_id = Some(key_id.into());
        self.config.workspace_key_secret = Some(key_secret.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Read fallback settings from `lookup` instead of the process environment.
    pub fn with_env_lookup(mut self, lookup: fn(&str) -> Option<String>) -> Self {
        self.env = lookup;
        self
    }

    /// Apply environment fallbacks, validate and build the provider.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`](crate::error::ProviderError::Configuration)
    /// when the configuration is incomplete.
    pub fn build(self) -> ProviderResult<Provider<A>> {
        let config = self.config.with_fallbacks(self.env);
        config.validate()?;
        info!(
            "Configured provider for workspace key {} at {}",
            config.workspace_key_id.as_deref().unwrap_or_default(),
            config.base_url()
        );
        Ok(Provider::new(self.api, config))
    }
}
