//! Error types for the cloudstack generator.

use cloudstack_define::DefineError;
use thiserror::Error;

/// Errors that can occur during code generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Failed to parse the API catalog or layout
    #[error("Failed to parse API definition: {0}")]
    ParseError(String),

    /// Failed to read an input file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to generate code
    #[error("Code generation failed: {0}")]
    CodeGenError(String),

    /// Failed to write output file
    #[error("Failed to write output file '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Output directory does not exist
    #[error("Output directory does not exist: {0}")]
    OutputDirNotFound(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// An operation named in the layout is missing from the catalog.
    #[error("Could not find API details for: {operation}")]
    OperationNotFound {
        /// The operation name as written in the layout.
        operation: String,
    },

    /// A service could not be emitted.
    ///
    /// Sibling services are still generated; the failure is reported at the end of the run.
    #[error("API {service} failed to generate code: {source}")]
    ServiceFailed {
        /// The service name.
        service: String,
        #[source]
        source: Box<GeneratorError>,
    },

    /// The external formatter failed or could not be started.
    #[error("Failed to format generated code: {output}")]
    FormatFailed {
        /// Combined stdout/stderr of the formatter, or the spawn error.
        output: String,
    },
}

impl GeneratorError {
    /// Tags an error with the service it was raised for.
    pub fn for_service(self, service: impl Into<String>) -> Self {
        GeneratorError::ServiceFailed {
            service: service.into(),
            source: Box::new(self),
        }
    }
}

impl From<DefineError> for GeneratorError {
    fn from(err: DefineError) -> Self {
        match err {
            DefineError::Read { path, source } => GeneratorError::ReadError { path, source },
            other => GeneratorError::ParseError(other.to_string()),
        }
    }
}
