//! Resolution of legacy project identifiers.
//!
//! Before slugs existed, every resource addressed a project by an opaque
//! identifier naming either its live or its test half. The current API wants a
//! `(project_slug, environment_slug)` pair instead. [`resolve_legacy_project_id`]
//! performs that translation with a single lookup against the management API.
//!
//! The live half falls back to [`DEFAULT_LIVE_ENVIRONMENT_SLUG`] when the
//! platform has no environment slug on record. The test half has no fallback:
//! a test project without a recorded slug cannot be resolved.
//!
//! # Example
//!
//! ```rust
//! use idp_provider::client::{InMemoryManagementApi, LegacyProject};
//! use idp_provider::resolver::resolve_legacy_project_id;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = InMemoryManagementApi::new();
//! api.seed_legacy_project(
//!     "project-live-abc123",
//!     LegacyProject {
//!         project_slug: "myproj".to_string(),
//!         live_project_id: "project-live-abc123".to_string(),
//!         ..Default::default()
//!     },
//! )
//! .await;
//!
//! let resolved = resolve_legacy_project_id(&api, "project-live-abc123").await?;
//! assert_eq!(resolved.project_slug, "myproj");
//! assert_eq!(resolved.environment_slug, "production");
//! # Ok(())
//! # }
//! ```

use crate::client::ManagementApi;
use log::{debug, warn};

/// Environment slug assumed for a live project with none on record.
pub const DEFAULT_LIVE_ENVIRONMENT_SLUG: &str = "production";

/// The current-generation address of a legacy project identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub project_slug: String,
    pub environment_slug: String,
}

/// Why a legacy identifier could not be resolved.
///
/// Every variant is terminal for the operation that requested the resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("legacy project ID is empty")]
    MissingIdentifier,

    #[error("failed to look up legacy project {legacy_project_id}: {message}")]
    LookupFailed {
        legacy_project_id: String,
        message: String,
    },

    #[error("legacy project {legacy_project_id} has no project slug on record")]
    MissingSlug { legacy_project_id: String },

    #[error(
        "legacy project ID {legacy_project_id} matches neither the live nor the test project of {project_slug}"
    )]
    UnknownIdentifier {
        legacy_project_id: String,
        project_slug: String,
    },

    #[error("no environment slug on record for legacy project {legacy_project_id} ({project_slug})")]
    MissingEnvironmentSlug {
        legacy_project_id: String,
        project_slug: String,
    },
}

/// Translate a legacy project identifier into a project slug and environment slug.
///
/// Performs exactly one lookup, none at all for an empty identifier. The result
/// is never cached.
///
/// # Errors
///
/// See [`ResolutionError`] for the failure taxonomy.
pub async fn resolve_legacy_project_id<A: ManagementApi>(
    api: &A,
    legacy_project_id: &str,
) -> Result<ResolvedIdentity, ResolutionError> {
    if legacy_project_id.is_empty() {
        return Err(ResolutionError::MissingIdentifier);
    }

    debug!("Resolving legacy project ID '{}'", legacy_project_id);
    let project = api
        .get_legacy_project(legacy_project_id)
        .await
        .map_err(|e| {
            warn!("Legacy project lookup for '{}' failed: {}", legacy_project_id, e);
            ResolutionError::LookupFailed {
                legacy_project_id: legacy_project_id.to_string(),
                message: e.to_string(),
            }
        })?;

    if project.project_slug.is_empty() {
        return Err(ResolutionError::MissingSlug {
            legacy_project_id: legacy_project_id.to_string(),
        });
    }

    let environment_slug = if legacy_project_id == project.live_project_id {
        if project.live_environment_slug.is_empty() {
            DEFAULT_LIVE_ENVIRONMENT_SLUG.to_string()
        } else {
            project.live_environment_slug
        }
    } else if legacy_project_id == project.test_project_id {
        project.test_environment_slug
    } else {
        return Err(ResolutionError::UnknownIdentifier {
            legacy_project_id: legacy_project_id.to_string(),
            project_slug: project.project_slug,
        });
    };

    if environment_slug.is_empty() {
        return Err(ResolutionError::MissingEnvironmentSlug {
            legacy_project_id: legacy_project_id.to_string(),
            project_slug: project.project_slug,
        });
    }

    debug!(
        "Resolved legacy project ID '{}' to {}/{}",
        legacy_project_id, project.project_slug, environment_slug
    );
    Ok(ResolvedIdentity {
        project_slug: project.project_slug,
        environment_slug,
    })
}
