//! Declarative configuration provider for an identity platform.
//!
//! Maps the host engine's resource lifecycle (validate, plan, create, read,
//! update, delete, import, state upgrade) onto the platform's management API.
//!
//! # Core Components
//!
//! - [`Provider`] - Every engine operation, keyed by resource type name
//! - [`ManagementApi`] - Trait for management API clients
//! - [`resolve_legacy_project_id`] - Translation of legacy project identifiers
//!   into project and environment slugs
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use idp_provider::ProviderBuilder;
//! use idp_provider::client::InMemoryManagementApi;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ProviderBuilder::new(InMemoryManagementApi::new())
//!     .with_workspace_key("workspace-key-prod-1", "secret")
//!     .build()?;
//!
//! let project = provider
//!     .create("project", &json!({"name": "Acme", "vertical": "B2B"}))
//!     .await?;
//! assert_eq!(project["id"], "acme");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod diagnostics;
pub mod error;
pub mod plan;
pub mod provider;
pub mod resolver;
pub mod resources;
pub mod schema;
pub mod upgrade;

pub use client::{ApiError, InMemoryManagementApi, ManagementApi};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ProviderError, ProviderResult};
pub use plan::PlanResult;
pub use provider::{Provider, ProviderBuilder, ProviderConfig};
pub use resolver::{ResolutionError, ResolvedIdentity, resolve_legacy_project_id};
pub use resources::ResourceKind;
pub use schema::{CURRENT_SCHEMA_VERSION, ResourceSchema};
