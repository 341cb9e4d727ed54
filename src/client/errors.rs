//! Error types for management API calls.
//!
//! These errors describe what went wrong talking to the platform. They carry no
//! knowledge of resources, schemas or plans; the resource layer turns them into
//! diagnostics.

/// Errors that can occur during a management API call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The addressed object does not exist.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// An object with the same identity already exists.
    #[error("Already exists: {resource}")]
    AlreadyExists { resource: String },

    /// The platform rejected the request body or parameters.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Transport failure or the platform is temporarily unavailable.
    #[error("Management API unavailable: {message}")]
    Unavailable { message: String },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn already_exists(resource: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource: resource.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Whether the error means the addressed object is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ApiError::not_found("acme/production/rbac_policy/");
        assert_eq!(error.to_string(), "Not found: acme/production/rbac_policy/");
        assert!(error.is_not_found());

        let error = ApiError::unavailable("connection reset by peer");
        assert!(error.to_string().contains("connection reset by peer"));
        assert!(!error.is_not_found());
    }
}
