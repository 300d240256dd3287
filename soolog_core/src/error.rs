//! Error types for the soolog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for soolog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record store error (corrupt document, unknown id, ...)
    #[error("Store error: {0}")]
    Store(String),

    /// Entry-flow validation error
    #[error("Entry error: {0}")]
    Entry(String),

    /// Health store bridge error
    #[error("Health sync error: {0}")]
    HealthSync(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
