//! Closed error taxonomy for all turret operations.
//!
//! Every fallible operation in the workspace returns one of these kinds.
//! Rejections carry a caller-facing reason string; `Payment` additionally
//! carries the computed cost so a client can correct the fee and retry.

use crate::amount::Amount;
use serde::{Deserialize, Serialize};

/// Unified error type for turret operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum TurretError {
    /// Malformed or out-of-policy request. User-caused, never retried.
    #[error("invalid request: {reason}")]
    Validation {
        /// What the request violated
        reason: String,
    },

    /// Duplicate upload of an already-stored function.
    #[error("conflict: {reason}")]
    Conflict {
        /// Which resource already exists
        reason: String,
    },

    /// Not allow-listed on a restricted network.
    #[error("forbidden: {reason}")]
    Forbidden {
        /// Why the request was refused
        reason: String,
    },

    /// Fee invalid, missing, wrong amount, or already used.
    ///
    /// This is an expected negotiation step, not a fault: the cost lets the
    /// caller retry with a correct fee.
    #[error("payment required: {reason}")]
    Payment {
        /// What was wrong with the payment
        reason: String,
        /// Exact cost the caller should pay, when known
        cost: Option<Amount>,
    },

    /// Unknown function, unknown remote signer, or missing directory entry.
    #[error("not found: {reason}")]
    NotFound {
        /// What could not be found
        reason: String,
    },

    /// Transient network or ledger failure. Safe to retry with backoff.
    #[error("unavailable: {reason}")]
    Unavailable {
        /// What failed underneath
        reason: String,
    },

    /// Local configuration unreadable. Fatal; trust queries fail closed.
    #[error("config error: {reason}")]
    Config {
        /// What was wrong with the configuration
        reason: String,
    },
}

impl TurretError {
    /// Create a validation error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Create a conflict error.
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    /// Create a forbidden error.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Create a payment error with no cost attached yet.
    pub fn payment(reason: impl Into<String>) -> Self {
        Self::Payment {
            reason: reason.into(),
            cost: None,
        }
    }

    /// Create a not-found error.
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound {
            reason: reason.into(),
        }
    }

    /// Create an unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Create a config error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Attach a cost to a `Payment` error; other kinds pass through.
    pub fn with_cost(self, cost: Amount) -> Self {
        match self {
            Self::Payment { reason, .. } => Self::Payment {
                reason,
                cost: Some(cost),
            },
            other => other,
        }
    }

    /// Whether the caller may retry this operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Standard result type for turret operations.
pub type Result<T> = std::result::Result<T, TurretError>;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn with_cost_fills_payment_only() {
        let err = TurretError::payment("fee too low").with_cost(Amount::from_stroops(42));
        assert_matches!(err, TurretError::Payment { cost: Some(c), .. } if c.stroops() == 42);

        let err = TurretError::not_found("nope").with_cost(Amount::from_stroops(42));
        assert_matches!(err, TurretError::NotFound { .. });
    }

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(TurretError::unavailable("horizon down").is_retryable());
        assert!(!TurretError::validation("bad id").is_retryable());
        assert!(!TurretError::config("bad toml").is_retryable());
    }
}
