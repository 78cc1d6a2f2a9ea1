//! Error types for the insomnia_core library.
//!
//! The diagnosis itself never fails; these errors cover the fallible edges
//! around it (configuration files, injected tables, answer files).

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for insomnia_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Questionnaire table validation error
    #[error("Questionnaire validation error: {0}")]
    QuestionnaireValidation(String),
}
