//! Error types for the dashboard tour.
//!
//! None of these ever reach the host application from a tour operation: the
//! controller logs them and degrades. They surface only from constructors
//! that load content or configuration.

/// Top-level error type for the tour engine.
#[derive(Debug, thiserror::Error)]
pub enum TourError {
    #[error("Unknown tour step: {id}")]
    UnknownStep { id: String },

    #[error("Target element not found: {id}")]
    TargetNotFound { id: String },

    #[error("Navigation to {path} failed: {reason}")]
    Navigation { path: String, reason: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors loading or validating the step content map.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Failed to parse tour content: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tour content has no steps")]
    Empty,

    #[error("Duplicate step id: {id}")]
    DuplicateStep { id: String },
}

/// Durable flag store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for the tour engine.
pub type Result<T> = std::result::Result<T, TourError>;
