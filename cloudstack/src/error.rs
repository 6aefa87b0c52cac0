//! Runtime error type.
//!
//! Every generated operation returns `Result<_, CloudStackError>`.

use thiserror::Error;

/// Errors that can occur when calling the platform API.
#[derive(Debug, Error)]
pub enum CloudStackError {
    /// HTTP request failed (network error, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to decode or encode a JSON payload.
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The platform answered with a non-200 status and a structured error.
    #[error("CloudStack API error {errorcode} (CSExceptionErrorCode: {cserrorcode}): {errortext}")]
    Api {
        /// HTTP-like error code reported by the platform.
        errorcode: i32,
        /// Platform exception code.
        cserrorcode: i32,
        /// Human-readable error text.
        errortext: String,
    },

    /// A non-200 response whose body was not a structured error.
    #[error("Failed to parse error response (status {status}): {body}")]
    ErrorParse {
        /// HTTP status code of the response.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The response body was not a single-key envelope.
    #[error("Unable to extract the raw value from: {body}")]
    Envelope {
        /// Raw response body.
        body: String,
    },

    /// An async job finished with status 2.
    #[error("{0}")]
    JobFailed(String),

    /// An async job did not finish within the configured timeout.
    ///
    /// `submission` holds the original submission response, so callers can
    /// keep tracking the job themselves.
    #[error("Timeout while waiting for async job {job_id} to finish")]
    AsyncTimeout {
        job_id: String,
        submission: Option<serde_json::Value>,
    },

    /// A courtesy lookup found nothing.
    #[error("No match found for {needle}: {count} results")]
    NoMatch { needle: String, count: i32 },

    /// A courtesy lookup by name found several entries and none matched exactly.
    #[error("Could not find an exact match for {needle}: {count} results")]
    AmbiguousMatch { needle: String, count: i32 },

    /// A lookup by id returned more than one entry.
    #[error("There is more than one result for {kind} UUID: {id}!")]
    MultipleResults { kind: String, id: String, count: i32 },

    /// A backward-compatibility conversion hit a value it cannot convert.
    #[error("Cannot convert field '{field}' value {value:?} to an integer")]
    Compat { field: String, value: String },

    /// The client configuration is invalid.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl CloudStackError {
    /// Attaches the job submission response to an [`CloudStackError::AsyncTimeout`].
    ///
    /// Other variants are returned unchanged.
    pub fn with_submission(self, value: serde_json::Value) -> Self {
        match self {
            Self::AsyncTimeout { job_id, .. } => Self::AsyncTimeout {
                job_id,
                submission: Some(value),
            },
            other => other,
        }
    }

    /// Returns `true` for the async timeout condition.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::AsyncTimeout { .. })
    }

    /// Returns the lookup count carried by a courtesy-helper error.
    pub fn match_count(&self) -> Option<i32> {
        match self {
            Self::NoMatch { count, .. }
            | Self::AmbiguousMatch { count, .. }
            | Self::MultipleResults { count, .. } => Some(*count),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message() {
        let err = CloudStackError::Api {
            errorcode: 431,
            cserrorcode: 4350,
            errortext: "Unable to execute API command".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "CloudStack API error 431 (CSExceptionErrorCode: 4350): Unable to execute API command"
        );
    }

    #[test]
    fn with_submission_only_touches_timeouts() {
        let err = CloudStackError::AsyncTimeout {
            job_id: "j1".to_string(),
            submission: None,
        }
        .with_submission(serde_json::json!({"jobid": "j1"}));

        match err {
            CloudStackError::AsyncTimeout { job_id, submission } => {
                assert_eq!(job_id, "j1");
                assert_eq!(submission.unwrap()["jobid"], "j1");
            }
            other => panic!("unexpected {other:?}"),
        }

        let err = CloudStackError::JobFailed("boom".into()).with_submission(serde_json::Value::Null);
        assert!(matches!(err, CloudStackError::JobFailed(_)));
    }

    #[test]
    fn match_count_for_lookup_errors() {
        let err = CloudStackError::NoMatch {
            needle: "Zone9".into(),
            count: 0,
        };
        assert_eq!(err.match_count(), Some(0));
        assert!(!err.is_timeout());
        assert_eq!(CloudStackError::Config("x".into()).match_count(), None);
    }
}
