// ── Core error types ──
//
// Canonicalization never fails, so everything here comes from validation,
// code allocation or the persistence collaborator. Store errors the engine
// has a policy for (duplicate keys, dependent records) are translated;
// the rest are surfaced unmodified.

use thiserror::Error;

use crate::store::StoreError;

/// First failing rule of a client validation, in field priority order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    MissingName,

    #[error("Phone is required")]
    MissingPhone,

    #[error("Email is required")]
    MissingEmail,

    #[error("Salesperson is required")]
    MissingSalesperson,

    #[error("Phone has {actual} digits, at most {max} are allowed")]
    PhoneTooLong { max: usize, actual: usize },
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── User input ───────────────────────────────────────────────────
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // ── Code allocation ──────────────────────────────────────────────
    #[error("Could not obtain a client code: {reason}")]
    AllocationUnavailable { reason: String },

    #[error("Client code {code} collided again after re-allocation")]
    PersistenceConflict { code: String },

    // ── Deletion ─────────────────────────────────────────────────────
    #[error("{message}")]
    DependencyConflict { code: String, message: String },

    // ── Persistence (surfaced unmodified) ────────────────────────────
    #[error(transparent)]
    Store(#[from] StoreError),

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Whether retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AllocationUnavailable { .. }
                | Self::PersistenceConflict { .. }
                | Self::Store(StoreError::Unavailable { .. })
        )
    }

    /// Allocation failures: any store error raised while peeking or
    /// consuming the sequence.
    pub(crate) fn allocation(err: &StoreError) -> Self {
        Self::AllocationUnavailable {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_user_facing() {
        let err = CoreError::from(ValidationError::MissingEmail);
        assert_eq!(err.to_string(), "Email is required");

        let err = ValidationError::PhoneTooLong { max: 20, actual: 23 };
        assert_eq!(err.to_string(), "Phone has 23 digits, at most 20 are allowed");
    }

    #[test]
    fn dependency_conflict_message_is_verbatim() {
        let err = CoreError::DependencyConflict {
            code: "CL000001".into(),
            message: "Cannot delete: the client has associated services".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot delete: the client has associated services"
        );
    }

    #[test]
    fn retryable_classification() {
        assert!(
            CoreError::AllocationUnavailable {
                reason: "offline".into()
            }
            .is_retryable()
        );
        assert!(CoreError::Store(StoreError::Unavailable { reason: "x".into() }).is_retryable());
        assert!(!CoreError::from(ValidationError::MissingName).is_retryable());
    }
}
