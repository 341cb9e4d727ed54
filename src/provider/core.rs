//! Core provider structure and schema introspection.

use super::config::ProviderConfig;
use crate::client::ManagementApi;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::ProviderError;
use crate::resources::ResourceKind;
use crate::schema::ResourceSchema;

/// The provider: every engine operation for every resource type, executed
/// against a [`ManagementApi`].
///
/// Operations are keyed by resource type name and report failures as
/// [`Diagnostics`]. The provider holds no state of its own between calls.
///
/// # Type Parameters
///
/// * `A` - The management API client
pub struct Provider<A> {
    pub(super) api: A,
    pub(super) config: ProviderConfig,
}

impl<A: ManagementApi> Provider<A> {
    /// Creates a provider from an already validated configuration. Prefer
    /// [`ProviderBuilder`](super::ProviderBuilder), which applies environment
    /// fallbacks and validates.
    pub fn new(api: A, config: ProviderConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Schemas of every supported resource type.
    pub fn schemas(&self) -> Vec<ResourceSchema> {
        ResourceKind::ALL.into_iter().map(ResourceKind::schema).collect()
    }

    /// Type names of every supported resource type.
    pub fn resource_types(&self) -> Vec<&'static str> {
        ResourceKind::ALL.into_iter().map(ResourceKind::type_name).collect()
    }

    /// Schema of a single resource type.
    ///
    /// # Errors
    ///
    /// Returns an error diagnostic for unknown type names.
    pub fn schema(&self, type_name: &str) -> Result<ResourceSchema, Diagnostics> {
        Ok(Self::kind(type_name)?.schema())
    }

    pub(super) fn kind(type_name: &str) -> Result<ResourceKind, Diagnostics> {
        ResourceKind::from_type_name(type_name).map_err(Diagnostics::from)
    }
}

/// Attach the resource type to a failed operation's diagnostic.
pub(super) fn operation_failed(kind: ResourceKind, operation: &str, error: ProviderError) -> Diagnostics {
    let summary = error.summary();
    Diagnostics::from(Diagnostic::error(
        summary,
        format!("{operation} {kind}: {error}"),
    ))
}
