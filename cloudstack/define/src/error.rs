//! Error types for catalog and layout loading.

use thiserror::Error;

/// Errors that can occur while loading definitions.
#[derive(Debug, Error)]
pub enum DefineError {
    /// The catalog document is not well-formed.
    #[error("Failed to parse catalog: {0}")]
    Parse(#[source] serde_json::Error),

    /// A definition file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The layout document is not well-formed.
    #[error("Failed to parse layout: {0}")]
    Layout(#[from] toml::de::Error),
}
