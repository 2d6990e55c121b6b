//! Error handling for the footwear inventory core
//!
//! Errors are returned to the controller layer as typed results; that
//! layer owns the mapping to transport-specific responses. Every
//! ledger-mutating failure leaves previously-committed state untouched.

use shared::models::InvalidTransition;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input errors
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    // Lookup errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Insufficient stock for {component}: requested {requested}, available {available}")]
    InsufficientStock {
        /// The short SKU, labeled with its role where one applies
        /// (e.g. "strap component[...]")
        component: String,
        requested: i32,
        available: i32,
    },

    // Unique-constraint violations. SKU-row races are absorbed by the
    // ledger upserts; this surfaces for duplicate dimension names.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code for the transport layer
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the same call can ever succeed without an
    /// intervening real-world change
    pub fn is_retryable(&self) -> bool {
        // Insufficient stock clears after a restock; everything else
        // needs a different request.
        matches!(self, AppError::InsufficientStock { .. })
    }

    pub(crate) fn validation(field: &str, message: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errs: validator::ValidationErrors) -> Self {
        let field = errs
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "input".to_string());
        AppError::Validation {
            field,
            message: errs.to_string(),
        }
    }
}

impl From<InvalidTransition> for AppError {
    fn from(err: InvalidTransition) -> Self {
        AppError::InvalidStateTransition(err.to_string())
    }
}

/// Result type alias for service calls
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderState;

    #[test]
    fn transition_error_maps_to_invalid_state() {
        let err: AppError = OrderState::Completed
            .transition(OrderState::Completed)
            .unwrap_err()
            .into();
        assert_eq!(err.code(), "INVALID_STATE_TRANSITION");
        assert!(!err.is_retryable());
    }

    #[test]
    fn insufficient_stock_is_the_only_retryable_error() {
        let err = AppError::InsufficientStock {
            component: "strap component[cat=1 model=2 type=3 size=4 color=5]".into(),
            requested: 10,
            available: 5,
        };
        assert!(err.is_retryable());
        assert!(!AppError::NotFound("Order".into()).is_retryable());
    }
}
