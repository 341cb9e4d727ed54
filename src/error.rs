//! Error types for provider operations.
//!
//! Lower layers return [`ProviderError`]; the provider surface converts it into
//! [`Diagnostics`] so that every failure reaches the operator as one error
//! diagnostic with a stable summary line.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::resolver::ResolutionError;

/// Main error type for provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A management API call failed.
    #[error("{operation} failed: {message}")]
    Api { operation: String, message: String },

    /// A legacy project identifier could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// State, configuration or an API response did not have the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No resource is registered under this type name.
    #[error("Unsupported resource type: {0}")]
    UnsupportedResourceType(String),

    /// Resource configuration is well-typed but inconsistent.
    #[error("Invalid {resource_type} configuration: {message}")]
    InvalidConfig {
        resource_type: String,
        message: String,
    },

    /// An import identifier did not have the expected format.
    #[error("Invalid import ID '{id}' for {resource_type}: expected {expected}")]
    InvalidImportId {
        resource_type: String,
        id: String,
        expected: String,
    },

    /// Persisted state is at a schema version no upgrader handles.
    #[error("Unsupported state version {version} for {resource_type}")]
    UnsupportedStateVersion { resource_type: String, version: u64 },

    /// Persisted state is missing something every version must carry.
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// Provider configuration is incomplete or invalid.
    #[error("Invalid provider configuration: {message}")]
    Configuration { message: String },
}

impl ProviderError {
    /// Wrap a management API error with the operation that produced it.
    pub fn api<E>(operation: impl Into<String>, error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        Self::Api {
            operation: operation.into(),
            message: error.to_string(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Short summary line used when the error becomes a diagnostic.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Api { .. } => "Management API error",
            Self::Resolution(_) => "Unable to resolve legacy project ID",
            Self::Json(_) => "Malformed data",
            Self::UnsupportedResourceType(_) => "Unsupported resource type",
            Self::InvalidConfig { .. } => "Invalid resource configuration",
            Self::InvalidImportId { .. } => "Invalid import ID",
            Self::UnsupportedStateVersion { .. } => "Unable to upgrade state",
            Self::InvalidState { .. } => "Invalid state",
            Self::Configuration { .. } => "Invalid provider configuration",
        }
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(error: ProviderError) -> Self {
        Diagnostic::error(error.summary(), error.to_string())
    }
}

impl From<ProviderError> for Diagnostics {
    fn from(error: ProviderError) -> Self {
        Diagnostics::from(Diagnostic::from(error))
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
