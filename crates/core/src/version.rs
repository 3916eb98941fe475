//! Version lifecycle domain types.
//!
//! The publish state machine is `draft -> published -> deprecated`, with
//! `deprecated` terminal. Transitions are validated here, centrally, so the
//! persistence layer never has to reason about status strings.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Resource kinds
// ---------------------------------------------------------------------------

/// The two concrete resource kinds the versioning core is bound to.
///
/// A collection's live definition is its field-descriptor list; a module's
/// is its configuration payload. There is no other behavioral difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Collection,
    Module,
}

impl ResourceKind {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Module => "module",
        }
    }

    /// Entity name used in not-found errors for the live resource.
    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::Collection => "Collection",
            Self::Module => "Module",
        }
    }

    /// Default human-facing label for a version when the caller supplies
    /// none. The scheme is cosmetic; `version_num` stays authoritative for
    /// ordering.
    pub fn default_label(&self, version_num: i32) -> String {
        match self {
            Self::Collection => format!("1.0.{version_num}"),
            Self::Module => format!("{version_num}.0.0"),
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Resource reference
// ---------------------------------------------------------------------------

/// Explicit reference to a versioned resource: app id plus resource code.
///
/// Passed as a parameter everywhere; there is no ambient "current app".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub app_id: DbId,
    pub kind: ResourceKind,
    pub code: String,
}

impl ResourceRef {
    pub fn new(app_id: DbId, kind: ResourceKind, code: impl Into<String>) -> Self {
        Self {
            app_id,
            kind,
            code: code.into(),
        }
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.app_id, self.kind, self.code)
    }
}

// ---------------------------------------------------------------------------
// Version status state machine
// ---------------------------------------------------------------------------

/// Lifecycle status of a version snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    Draft,
    Published,
    Deprecated,
}

impl VersionStatus {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Deprecated => "deprecated",
        }
    }

    /// Check that a snapshot in this status may transition to `published`.
    ///
    /// Only `draft` snapshots are publishable: a published snapshot stays
    /// published until superseded, and a deprecated snapshot is terminal
    /// (rollback re-activates old content by appending a new snapshot
    /// instead).
    pub fn ensure_publishable(&self) -> Result<(), CoreError> {
        match self {
            Self::Draft => Ok(()),
            Self::Published => Err(CoreError::InvalidState(
                "version is already published".to_string(),
            )),
            Self::Deprecated => Err(CoreError::InvalidState(
                "deprecated versions cannot be republished; roll back instead".to_string(),
            )),
        }
    }
}

impl FromStr for VersionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "deprecated" => Ok(Self::Deprecated),
            other => Err(CoreError::Validation(format!(
                "unknown version status '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
