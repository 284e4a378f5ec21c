//! Translation errors
//!
//! Every error is fatal to the translation run that produced it. Each
//! variant names the offending view, field or explore.

use crate::diagnostic::{Diagnostic, ErrorCode, Severity};

/// Errors raised while building the intermediate model or translating it
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error("Unknown view '{view}' referenced by {referenced_by}")]
    UnknownView { view: String, referenced_by: String },

    #[error("View '{view}' is defined more than once")]
    DuplicateView { view: String },

    #[error("Field '{field}' is defined more than once in view '{view}'")]
    DuplicateField { view: String, field: String },

    #[error("Unsupported {kind} type '{field_type}' for field '{field}' in view '{view}'")]
    UnsupportedFieldType {
        view: String,
        field: String,
        kind: String,
        field_type: String,
    },

    #[error("Derived cube '{cube}' has no SQL expression")]
    MissingSourceSql { cube: String },

    #[error(
        "Join of '{view}' in explore '{explore}' starts from '{join_from}', \
         which has not been joined yet"
    )]
    JoinOrderError {
        explore: String,
        view: String,
        join_from: String,
    },

    #[error("Explore '{explore}' joins '{left}' and '{right}' more than once")]
    DuplicateJoin {
        explore: String,
        left: String,
        right: String,
    },

    #[error("Explore '{explore}' joins view '{view}' to itself")]
    SelfJoin { explore: String, view: String },
}

impl TranslateError {
    /// Stable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownView { .. } => ErrorCode::UnknownView,
            Self::DuplicateView { .. } => ErrorCode::DuplicateView,
            Self::DuplicateField { .. } => ErrorCode::DuplicateField,
            Self::UnsupportedFieldType { .. } => ErrorCode::UnsupportedFieldType,
            Self::MissingSourceSql { .. } => ErrorCode::MissingSourceSql,
            Self::JoinOrderError { .. } => ErrorCode::JoinOrderError,
            Self::DuplicateJoin { .. } => ErrorCode::DuplicateJoin,
            Self::SelfJoin { .. } => ErrorCode::SelfJoin,
        }
    }

    /// Name of the entity that caused the error
    pub fn entity(&self) -> &str {
        match self {
            Self::UnknownView { view, .. } => view,
            Self::DuplicateView { view } => view,
            Self::DuplicateField { field, .. } => field,
            Self::UnsupportedFieldType { field, .. } => field,
            Self::MissingSourceSql { cube } => cube,
            Self::JoinOrderError { explore, .. } => explore,
            Self::DuplicateJoin { explore, .. } => explore,
            Self::SelfJoin { explore, .. } => explore,
        }
    }

    /// Convert into a diagnostic with the given severity
    pub fn to_diagnostic(&self, severity: Severity) -> Diagnostic {
        Diagnostic::new(self.code(), severity, self.to_string()).with_entity(self.entity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_entity() {
        let err = TranslateError::UnsupportedFieldType {
            view: "orders".to_string(),
            field: "total".to_string(),
            kind: "measure".to_string(),
            field_type: "percentile".to_string(),
        };

        let message = err.to_string();
        assert!(message.contains("orders"));
        assert!(message.contains("total"));
        assert!(message.contains("percentile"));
        assert_eq!(err.code(), ErrorCode::UnsupportedFieldType);
    }

    #[test]
    fn diagnostic_from_error() {
        let err = TranslateError::SelfJoin {
            explore: "orders".to_string(),
            view: "orders".to_string(),
        };

        let diag = err.to_diagnostic(Severity::Warn);
        assert_eq!(diag.code, ErrorCode::SelfJoin);
        assert_eq!(diag.severity, Severity::Warn);
        assert_eq!(diag.entity.as_deref(), Some("orders"));
    }
}
