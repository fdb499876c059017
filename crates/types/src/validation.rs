//! Input validation for actions.
//!
//! Applied by the contract service before any storage is touched, so an
//! oversized payload is rejected without a write transaction ever being opened.
//!
//! Limits come from [`LimitsConfig`].

use std::fmt;

use crate::{config::LimitsConfig, types::Transaction};

/// Validation error with structured context.
///
/// Contains the specific constraint that was violated and the field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Description of the violated constraint.
    pub constraint: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.constraint)
    }
}

impl std::error::Error for ValidationError {}

/// Validates node contents against the configured size limit.
///
/// Empty data is allowed.
///
/// # Errors
///
/// Returns [`ValidationError`] if `data` exceeds `max_node_bytes`.
pub fn validate_node_data(data: &[u8], config: &LimitsConfig) -> Result<(), ValidationError> {
    if data.len() > config.max_node_bytes {
        return Err(ValidationError {
            field: "data".to_string(),
            constraint: format!(
                "length {} bytes exceeds maximum {} bytes",
                data.len(),
                config.max_node_bytes
            ),
        });
    }
    Ok(())
}

/// Validates the number of actions in a transaction.
///
/// # Errors
///
/// Returns [`ValidationError`] if the transaction carries more than
/// `max_actions_per_transaction` actions.
pub fn validate_transaction(tx: &Transaction, config: &LimitsConfig) -> Result<(), ValidationError> {
    if tx.actions.len() > config.max_actions_per_transaction {
        return Err(ValidationError {
            field: "actions".to_string(),
            constraint: format!(
                "count {} exceeds maximum {}",
                tx.actions.len(),
                config.max_actions_per_transaction
            ),
        });
    }
    Ok(())
}
