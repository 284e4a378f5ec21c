//! Error codes and diagnostics
//!
//! IMPORTANT: Error codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Error code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Model references
    /// An explore or join references a view that is not defined
    UnknownView,

    /// Two views share the same name
    DuplicateView,

    /// Two fields share the same name within a view
    DuplicateField,

    // Field translation
    /// A field type has no counterpart in the cube vocabulary
    UnsupportedFieldType,

    /// A derived cube never received a SQL expression
    MissingSourceSql,

    // Join graph
    /// A join starts from a view that has not been joined yet
    JoinOrderError,

    /// The same pair of views is joined more than once
    DuplicateJoin,

    /// A view is joined to itself
    SelfJoin,

    // Run
    /// A view was excluded by the allowlist
    ViewSkipped,
}

impl ErrorCode {
    /// Get the error code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownView => "UNKNOWN_VIEW",
            Self::DuplicateView => "DUPLICATE_VIEW",
            Self::DuplicateField => "DUPLICATE_FIELD",
            Self::UnsupportedFieldType => "UNSUPPORTED_FIELD_TYPE",
            Self::MissingSourceSql => "MISSING_SOURCE_SQL",
            Self::JoinOrderError => "JOIN_ORDER_ERROR",
            Self::DuplicateJoin => "DUPLICATE_JOIN",
            Self::SelfJoin => "SELF_JOIN",
            Self::ViewSkipped => "VIEW_SKIPPED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - the run continued without the offending entity
    Warn,

    /// Error - the run was aborted
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable error code
    pub code: ErrorCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Name of the view, field or explore the message is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: ErrorCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            entity: None,
        }
    }

    /// Set the entity the diagnostic refers to
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}
