//! Error types for the Relume enhancement pipeline.
//!
//! Errors are organized by stage so callers can tell a failed fetch apart
//! from a failed decode or filter pass, with the source URL attached for
//! context.

use thiserror::Error;

/// Top-level error type for Relume operations.
#[derive(Error, Debug)]
pub enum RelumeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Enhancement pipeline errors
    #[error("Enhancement error: {0}")]
    Enhance(#[from] EnhanceError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Enhancement errors, organized by stage.
///
/// A fetch failure never reaches the caller as an error: the orchestrator
/// degrades to the original URL instead (see `EnhanceOutcome::Degraded`).
/// The `Fetch` variant exists so the fetch stage can report what went wrong
/// and the orchestrator can decide.
#[derive(Error, Debug)]
pub enum EnhanceError {
    /// Retrieving the source image failed
    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// The fetched bytes could not be decoded as an image
    #[error("Decode failed for {url}: {message}")]
    Decode { url: String, message: String },

    /// A filter stage raised an unexpected condition
    #[error("Filter stage '{stage}' failed for {url}: {message}")]
    Filter {
        url: String,
        stage: String,
        message: String,
    },

    /// Re-encoding the processed raster failed
    #[error("Encode failed for {url}: {message}")]
    Encode { url: String, message: String },

    /// A stage exceeded its configured time budget
    #[error("Timeout in {stage} stage for {url} after {timeout_ms}ms")]
    Timeout {
        url: String,
        stage: String,
        timeout_ms: u64,
    },

    /// Source exceeds the configured byte-size limit
    #[error("Source too large: {url} ({size_mb}MB > {max_mb}MB)")]
    TooLarge {
        url: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Decoded dimensions exceed the configured limit
    #[error("Image too large: {url} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        url: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// The job's reply channel was dropped before a result arrived
    #[error("Job for {url} was dropped before completion")]
    Canceled { url: String },
}

/// Convenience type alias for Relume results.
pub type Result<T> = std::result::Result<T, RelumeError>;

/// Convenience type alias for enhancement-stage results.
pub type EnhanceResult<T> = std::result::Result<T, EnhanceError>;
