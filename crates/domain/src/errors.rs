//! Error types used throughout the scheduling core.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::types::VisitStatusKind;

/// Main error type for showings operations.
///
/// Every rejection carries enough detail for a caller to present an
/// actionable message: the offending field, the conflicting appointment id,
/// or the current/target state pair.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum SchedulingError {
    #[error("invalid field `{field}`: {message}")]
    Validation { field: String, message: String },

    #[error("requested slot overlaps appointment {conflicting_id}")]
    Conflict { conflicting_id: Uuid },

    #[error("cannot transition visit from `{from}` to `{to}`")]
    InvalidTransition { from: VisitStatusKind, to: VisitStatusKind },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl SchedulingError {
    /// Build a validation error for a single offending field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }
}

/// Result type alias for showings operations.
pub type Result<T> = std::result::Result<T, SchedulingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_the_field() {
        let err = SchedulingError::validation("scheduled_date", "date is in the past");
        assert_eq!(
            err.to_string(),
            "invalid field `scheduled_date`: date is in the past"
        );
    }

    #[test]
    fn invalid_transition_reports_state_pair() {
        let err = SchedulingError::InvalidTransition {
            from: VisitStatusKind::Completed,
            to: VisitStatusKind::Confirmed,
        };
        assert_eq!(
            err.to_string(),
            "cannot transition visit from `completed` to `confirmed`"
        );
    }

    #[test]
    fn errors_serialize_with_type_tag() {
        let err = SchedulingError::NotFound("appointment abc".into());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"type\":\"NotFound\""));
    }
}
