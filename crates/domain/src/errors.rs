//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Invalid language tag
    #[error("Invalid language code: {0}")]
    InvalidLanguageCode(String),

    /// Unknown voice variant
    #[error("Invalid voice variant: {0}")]
    InvalidVoiceVariant(String),
}
