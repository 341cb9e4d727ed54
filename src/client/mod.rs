//! Management API abstraction.
//!
//! The provider never talks to the platform directly. Every call goes through
//! the [`ManagementApi`] trait, which is injected into the provider at build
//! time. This keeps the resource layer testable and lets the transport (HTTP
//! client, recorded fixtures, the in-memory implementation) vary independently.
//!
//! # Object model
//!
//! - Projects are top-level objects addressed by their slug. Each project has a
//!   live and a test environment.
//! - Everything else is an environment-scoped configuration object addressed
//!   by a [`ConfigKey`] and exchanged as JSON. At this level create and update
//!   are the same PUT; the distinction belongs to the resource layer.
//! - Legacy project identifiers predate slugs and can only be looked up, via
//!   [`ManagementApi::get_legacy_project`].
//!
//! # Example Usage
//!
//! ```rust
//! use idp_provider::client::{
//!     ConfigKey, InMemoryManagementApi, ManagementApi, ProjectRequest, Vertical,
//! };
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = InMemoryManagementApi::new();
//! api.create_project(ProjectRequest {
//!     name: "Acme".to_string(),
//!     vertical: Vertical::B2b,
//!     project_slug: None,
//! })
//! .await?;
//! let key = ConfigKey::new("acme", "production", "jwt_template", "SESSION");
//! api.put_config(key.clone(), json!({"template_content": "{}"})).await?;
//! assert!(api.get_config(key.clone()).await?.is_some());
//! assert!(api.delete_config(key).await?);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;
pub mod types;

pub use errors::ApiError;
pub use in_memory::{InMemoryApiStats, InMemoryManagementApi};
pub use types::{
    ConfigKey, ConfigPrefix, LegacyProject, Project, ProjectRequest, Vertical, is_valid_slug,
};

use serde_json::Value;
use std::future::Future;

/// Operations the provider needs from the identity platform's management API.
pub trait ManagementApi: Send + Sync {
    /// The error type returned by API calls.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Look up a project by a legacy (pre-slug) project identifier.
    ///
    /// The identifier may refer to either the live or the test half of the
    /// project; the returned record carries both.
    fn get_legacy_project(
        &self,
        legacy_project_id: &str,
    ) -> impl Future<Output = Result<LegacyProject, Self::Error>> + Send;

    /// Create a project with its live and test environments.
    fn create_project(
        &self,
        request: ProjectRequest,
    ) -> impl Future<Output = Result<Project, Self::Error>> + Send;

    /// Fetch a project by slug. `None` when it does not exist.
    fn get_project(
        &self,
        project_slug: &str,
    ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send;

    /// Update a project's mutable fields.
    fn update_project(
        &self,
        project_slug: &str,
        request: ProjectRequest,
    ) -> impl Future<Output = Result<Project, Self::Error>> + Send;

    /// Delete a project. Returns `false` if it did not exist.
    fn delete_project(
        &self,
        project_slug: &str,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Store a configuration object and return what the platform stored.
    ///
    /// Replaces any existing object at the same key. The returned body is what
    /// a subsequent [`get_config`](Self::get_config) would return, including any
    /// masking of sensitive fields. Fails with a not-found error when the
    /// project or environment does not exist.
    fn put_config(
        &self,
        key: ConfigKey,
        body: Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;

    /// Fetch a configuration object. `None` when it does not exist.
    fn get_config(
        &self,
        key: ConfigKey,
    ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send;

    /// Delete a configuration object. Returns `false` if it did not exist.
    fn delete_config(
        &self,
        key: ConfigKey,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// List every configuration object under a prefix, ordered by id.
    fn list_configs(
        &self,
        prefix: ConfigPrefix,
    ) -> impl Future<Output = Result<Vec<(ConfigKey, Value)>, Self::Error>> + Send;
}
