//! Async job completion.
//!
//! Operations the catalog marks asynchronous answer with a job id. The
//! caller then polls the job status until it is terminal: status 1 returns
//! the job result, status 2 becomes [`CloudStackError::JobFailed`], and a
//! job still pending after the timeout becomes
//! [`CloudStackError::AsyncTimeout`].
//!
//! Polling happens inside the caller's future and suspends only at the sleep
//! between polls. Sleeps use [`tokio::time`], so a paused test runtime
//! advances through them instantly.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::error::CloudStackError;

/// Job status meaning "finished successfully".
pub const JOB_SUCCEEDED: i32 = 1;
/// Job status meaning "finished with an error".
pub const JOB_FAILED: i32 = 2;

/// Default wait before giving up on an async job.
pub const DEFAULT_ASYNC_TIMEOUT: Duration = Duration::from_secs(300);

/// Longest pause between two polls, in seconds.
const MAX_BACKOFF_SECS: u64 = 15;

/// One answer of the job-status operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobStatus {
    pub jobid: String,
    pub cmd: String,
    pub jobstatus: i32,
    pub jobprocstatus: i32,
    pub jobresultcode: i32,
    pub jobresulttype: String,
    pub jobresult: Value,
    pub jobinstancetype: String,
    pub jobinstanceid: String,
    pub created: String,
    pub completed: String,
}

impl JobStatus {
    /// Returns `true` once the job has succeeded or failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self.jobstatus, JOB_SUCCEEDED | JOB_FAILED)
    }

    /// Builds the error for a failed job.
    ///
    /// Text-typed results carry their message; anything else is reported as
    /// an undefined error with the raw result.
    pub fn failure(&self) -> CloudStackError {
        if self.jobresulttype == "text" {
            let message = match &self.jobresult {
                Value::String(text) => text.clone(),
                Value::Object(map) => match map.get("errortext") {
                    Some(Value::String(text)) => text.clone(),
                    _ => self.jobresult.to_string(),
                },
                other => other.to_string(),
            };
            CloudStackError::JobFailed(message)
        } else {
            CloudStackError::JobFailed(format!("Undefined error: {}", self.jobresult))
        }
    }
}

/// Something that can report the status of an async job.
pub trait JobSource {
    fn job_status(&self, job_id: &str) -> impl Future<Output = Result<JobStatus, CloudStackError>> + Send;
}

/// Bounded linear backoff: 1s, 2s, 3s ... up to a ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    current: u64,
    ceiling: u64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::with_ceiling(MAX_BACKOFF_SECS)
    }
}

impl Backoff {
    /// Creates a backoff capped at `ceiling` seconds.
    pub fn with_ceiling(ceiling: u64) -> Self {
        Self { current: 0, ceiling }
    }

    /// Returns the next pause.
    ///
    /// ## Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use cloudstack_runtime::jobs::Backoff;
    ///
    /// let mut backoff = Backoff::with_ceiling(2);
    /// assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    /// assert_eq!(backoff.next_delay(), Duration::from_secs(2));
    /// assert_eq!(backoff.next_delay(), Duration::from_secs(2));
    /// ```
    pub fn next_delay(&mut self) -> Duration {
        if self.current < self.ceiling {
            self.current += 1;
        }
        Duration::from_secs(self.current)
    }
}

/// Polls `source` until job `job_id` is terminal or `timeout` has elapsed.
///
/// The first poll is immediate. The timeout is measured from the start of
/// the loop and checked after every non-terminal poll.
///
/// ## Errors
///
/// - [`CloudStackError::JobFailed`] when the job reports status 2
/// - [`CloudStackError::AsyncTimeout`] (without a submission) on timeout
/// - any error returned by the poll source
#[instrument(skip(source), fields(timeout_secs = timeout.as_secs()))]
pub async fn poll_job<S>(source: &S, job_id: &str, timeout: Duration) -> Result<Value, CloudStackError>
where
    S: JobSource,
{
    let started = Instant::now();
    let mut backoff = Backoff::default();

    loop {
        let status = source.job_status(job_id).await?;
        match status.jobstatus {
            JOB_SUCCEEDED => {
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "job finished");
                return Ok(status.jobresult);
            }
            JOB_FAILED => {
                debug!(resulttype = %status.jobresulttype, "job failed");
                return Err(status.failure());
            }
            _ => {}
        }

        if started.elapsed() > timeout {
            return Err(CloudStackError::AsyncTimeout {
                job_id: job_id.to_string(),
                submission: None,
            });
        }

        let delay = backoff.next_delay();
        debug!(jobstatus = status.jobstatus, delay_secs = delay.as_secs(), "job pending");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn backoff_ramps_linearly_to_fifteen() {
        let mut backoff = Backoff::default();
        let delays: Vec<u64> = (0..17).map(|_| backoff.next_delay().as_secs()).collect();
        assert_eq!(&delays[..3], &[1, 2, 3]);
        assert_eq!(delays[14], 15);
        assert_eq!(delays[16], 15);
    }

    #[test]
    fn text_failure_uses_message() {
        let status = JobStatus {
            jobstatus: JOB_FAILED,
            jobresulttype: "text".into(),
            jobresult: json!("disk full"),
            ..Default::default()
        };
        assert_eq!(status.failure().to_string(), "disk full");

        let status = JobStatus {
            jobresult: json!({"errorcode": 530, "errortext": "no capacity"}),
            ..status
        };
        assert_eq!(status.failure().to_string(), "no capacity");
    }

    #[test]
    fn non_text_failure_is_undefined() {
        let status = JobStatus {
            jobstatus: JOB_FAILED,
            jobresulttype: "object".into(),
            jobresult: json!({"errorcode": 530}),
            ..Default::default()
        };
        assert_eq!(status.failure().to_string(), r#"Undefined error: {"errorcode":530}"#);
    }

    #[test]
    fn job_status_decodes_with_missing_fields() {
        let status: JobStatus = serde_json::from_value(json!({"jobid": "j1", "jobstatus": 0})).unwrap();
        assert_eq!(status.jobid, "j1");
        assert!(!status.is_terminal());
        assert_eq!(status.jobresult, Value::Null);
    }
}
