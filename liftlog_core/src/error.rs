//! Error types for the liftlog_core library.

use std::io;

use crate::RecordId;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for liftlog_core operations
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

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// A schema field with the wrong arity or a non-numeric token
    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    /// A performance field with a bad session or set fragment
    #[error("Malformed performance: {0}")]
    MalformedPerformance(String),

    /// An id-list field holding something other than comma-separated ids
    #[error("Malformed id list: {0}")]
    MalformedIdList(String),

    /// An id-list references a record that does not resolve
    #[error("Unknown member: exercise {id} does not resolve")]
    UnknownMember { id: RecordId },

    /// A linkage transition that the current link state does not allow
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Store lookup miss
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: RecordId },
}
