//! Request and response shapes exchanged with the management API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A project record as returned by the legacy lookup endpoint.
///
/// Legacy identifiers address one half of a project (live or test). The record
/// carries both halves so callers can tell which one an identifier refers to.
/// Any field may be empty when the platform has not populated it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyProject {
    pub project_slug: String,
    #[serde(default)]
    pub live_project_id: String,
    #[serde(default)]
    pub test_project_id: String,
    #[serde(default)]
    pub live_environment_slug: String,
    #[serde(default)]
    pub test_environment_slug: String,
}

/// Whether `s` can be used as a project or environment slug: lowercase ASCII
/// letters, digits, `-` and `_`. Slugs never contain dots, which separate the
/// parts of an import identifier.
pub fn is_valid_slug(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Product vertical a project is created for. Cannot be changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vertical {
    Consumer,
    B2b,
}

impl Vertical {
    pub const ALL: [&'static str; 2] = ["CONSUMER", "B2B"];

    pub fn as_str(self) -> &'static str {
        match self {
            Vertical::Consumer => "CONSUMER",
            Vertical::B2b => "B2B",
        }
    }
}

impl fmt::Display for Vertical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a project create or update call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
    pub vertical: Vertical,
    /// Requested slug. The platform derives one from the name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_slug: Option<String>,
}

/// A project as the current-generation API reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_slug: String,
    pub name: String,
    pub vertical: Vertical,
    pub live_environment_slug: String,
    pub test_environment_slug: String,
    pub live_project_id: String,
    pub test_project_id: String,
    pub created_at: String,
}

/// Location of an environment-scoped configuration object.
///
/// Objects are organized as `project_slug` → `environment_slug` → `kind` → `id`.
/// Singleton objects (one per environment) use the empty string as their id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey {
    project_slug: String,
    environment_slug: String,
    kind: String,
    id: String,
}

impl ConfigKey {
    pub fn new(
        project_slug: impl Into<String>,
        environment_slug: impl Into<String>,
        kind: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            project_slug: project_slug.into(),
            environment_slug: environment_slug.into(),
            kind: kind.into(),
            id: id.into(),
        }
    }

    pub fn project_slug(&self) -> &str {
        &self.project_slug
    }

    pub fn environment_slug(&self) -> &str {
        &self.environment_slug
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Create a prefix for listing every object of a kind within an environment.
    pub fn prefix(
        project_slug: impl Into<String>,
        environment_slug: impl Into<String>,
        kind: impl Into<String>,
    ) -> ConfigPrefix {
        ConfigPrefix {
            project_slug: project_slug.into(),
            environment_slug: environment_slug.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.project_slug, self.environment_slug, self.kind, self.id
        )
    }
}

/// A prefix for listing configuration objects of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPrefix {
    project_slug: String,
    environment_slug: String,
    kind: String,
}

impl ConfigPrefix {
    pub fn project_slug(&self) -> &str {
        &self.project_slug
    }

    pub fn environment_slug(&self) -> &str {
        &self.environment_slug
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Whether `key` falls under this prefix.
    pub fn matches(&self, key: &ConfigKey) -> bool {
        key.project_slug == self.project_slug
            && key.environment_slug == self.environment_slug
            && key.kind == self.kind
    }
}

impl fmt::Display for ConfigPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.project_slug, self.environment_slug, self.kind
        )
    }
}
