//! Error types for the Quota Engine.
//!
//! The calculation itself cannot fail over a valid
//! [`CompanyProfile`](crate::models::CompanyProfile); every variant
//! here is raised at a boundary (submission intake or rule loading)
//! before any ceiling arithmetic runs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuotaError {
    /// A submission field is negative, out of range or unrecognised.
    /// The caller should re-prompt; no partial result exists.
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },

    /// A rule table holds a rate that cannot be applied.
    #[error("invalid quota rules: {0}")]
    InvalidRules(String),

    #[error("failed to read quota rules from {path}: {source}")]
    RulesIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse quota rules from {path}: {source}")]
    RulesParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl QuotaError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        QuotaError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, QuotaError::InvalidInput { .. })
    }
}
