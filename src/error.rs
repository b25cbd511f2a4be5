//! Error types for the synthetic population generator.
//!
//! Empty frequency tables and unknown names are data conditions, not errors;
//! they are handled by the name sampler's sentinel fallback.

use thiserror::Error;

/// Top-level error type for the generator.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Invalid generation parameters. Raised before any sampling starts.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed item/weight pairing handed to a weighted sampler.
    #[error("Sampler construction error: {0}")]
    SamplerConstruction(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// Failure inside a frequency provider call, propagated verbatim.
    #[error("Frequency provider error: {0}")]
    Provider(#[source] anyhow::Error),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SynthError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Wrap any provider-side failure.
    pub fn provider(err: impl Into<anyhow::Error>) -> Self {
        Self::Provider(err.into())
    }
}

/// Result type alias for the generator.
pub type Result<T> = std::result::Result<T, SynthError>;
