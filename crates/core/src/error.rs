//! Domain error model.

use thiserror::Error;

/// Failures raised while building catalog values from raw input.
///
/// Lookups, storage and transport failures live in `catalog-infra`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A product field or image attribute was rejected.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A product, image or category id did not parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
