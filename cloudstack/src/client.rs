//! Client configuration and the signed HTTP transport.
//!
//! A [`Transport`] is built once per client and shared by every generated
//! service facade. It adds the mandatory parameters, signs the request,
//! picks GET or POST, unwraps the response envelope and decodes platform
//! errors.

use std::time::Duration;

use cloudstack_define::{PolicyFlag, operation_policy};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{Span, instrument, warn};
use url::Url;

use crate::envelope::{unwrap_envelope, unwrap_value};
use crate::error::CloudStackError;
use crate::jobs::{DEFAULT_ASYNC_TIMEOUT, JobSource, JobStatus, poll_job};
use crate::query::Query;
use crate::signing::{sign, signed_url};

/// Default HTTP request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// The operation used to poll async jobs.
pub const JOB_STATUS_COMMAND: &str = "queryAsyncJobResult";

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_PAUSE: Duration = Duration::from_millis(500);

/// Connection settings for a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_url: Url,
    api_key: String,
    secret: String,
    async_mode: bool,
    verify_ssl: bool,
    http_get_only: bool,
    async_timeout: Duration,
    http_timeout: Duration,
}

impl ClientConfig {
    /// Starts a builder for the given endpoint and credentials.
    ///
    /// ## Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use cloudstack_runtime::ClientConfig;
    ///
    /// let config = ClientConfig::builder("https://cloud.example/client/api", "key", "secret")
    ///     .async_mode(true)
    ///     .async_timeout(Duration::from_secs(600))
    ///     .build()
    ///     .unwrap();
    /// assert!(config.async_mode());
    /// assert!(config.verify_ssl());
    /// ```
    pub fn builder(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        secret: impl Into<String>,
    ) -> ClientConfigBuilder {
        ClientConfigBuilder {
            api_url: api_url.into(),
            api_key: api_key.into(),
            secret: secret.into(),
            async_mode: false,
            verify_ssl: true,
            http_get_only: false,
            async_timeout: DEFAULT_ASYNC_TIMEOUT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Whether async operations wait for their job to finish.
    pub fn async_mode(&self) -> bool {
        self.async_mode
    }

    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    /// Whether every request is sent as a GET.
    pub fn http_get_only(&self) -> bool {
        self.http_get_only
    }

    pub fn async_timeout(&self) -> Duration {
        self.async_timeout
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    api_url: String,
    api_key: String,
    secret: String,
    async_mode: bool,
    verify_ssl: bool,
    http_get_only: bool,
    async_timeout: Duration,
    http_timeout: Duration,
}

impl ClientConfigBuilder {
    /// Waits for async jobs instead of returning the submission response.
    pub fn async_mode(mut self, enabled: bool) -> Self {
        self.async_mode = enabled;
        self
    }

    /// Disable to accept self-signed certificates.
    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// Sends every request as a GET, including the POST-form operations.
    pub fn http_get_only(mut self, get_only: bool) -> Self {
        self.http_get_only = get_only;
        self
    }

    /// Sets how long async jobs are polled. A zero duration keeps the default.
    pub fn async_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.async_timeout = timeout;
        }
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Validates the settings.
    ///
    /// ## Errors
    ///
    /// Returns [`CloudStackError::Config`] if the API url does not parse or
    /// the key or secret is empty.
    pub fn build(self) -> Result<ClientConfig, CloudStackError> {
        let api_url = Url::parse(&self.api_url)
            .map_err(|e| CloudStackError::Config(format!("invalid API url '{}': {e}", self.api_url)))?;
        if self.api_key.is_empty() {
            return Err(CloudStackError::Config("API key is empty".to_string()));
        }
        if self.secret.is_empty() {
            return Err(CloudStackError::Config("secret key is empty".to_string()));
        }

        Ok(ClientConfig {
            api_url,
            api_key: self.api_key,
            secret: self.secret,
            async_mode: self.async_mode,
            verify_ssl: self.verify_ssl,
            http_get_only: self.http_get_only,
            async_timeout: self.async_timeout,
            http_timeout: self.http_timeout,
        })
    }
}

/// Structured error body of a non-200 response.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errorcode: i32,
    #[serde(default)]
    cserrorcode: i32,
    errortext: String,
}

/// The signed HTTP transport shared by all service facades.
#[derive(Debug)]
pub struct Transport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Transport {
    /// Builds the HTTP client for `config`.
    ///
    /// ## Errors
    ///
    /// Returns [`CloudStackError::Http`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, CloudStackError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .cookie_store(true)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether async operations should wait for their job.
    pub fn is_async(&self) -> bool {
        self.config.async_mode
    }

    /// Sends `command` with `params` and returns the unwrapped payload.
    ///
    /// ## Errors
    ///
    /// - [`CloudStackError::Http`] on transport failure
    /// - [`CloudStackError::Api`] for a structured non-200 answer
    /// - [`CloudStackError::ErrorParse`] for any other non-200 answer
    /// - [`CloudStackError::Json`] / [`CloudStackError::Envelope`] for a
    ///   malformed 200 body
    #[instrument(
        name = "cloudstack_request",
        skip(self, params),
        fields(
            http.method = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
        )
    )]
    pub async fn request(&self, command: &str, params: &Query) -> Result<Value, CloudStackError> {
        let query = self.prepare(command, params);
        let base = self.config.api_url.as_str();

        let response = if self.use_post(command) {
            Span::current().record("http.method", "POST");
            let signature = sign(&query, &self.config.secret)?;
            let mut form: Vec<(&str, &str)> = query.iter().collect();
            form.push(("signature", signature.as_str()));
            self.http.post(base).form(&form).send().await?
        } else {
            Span::current().record("http.method", "GET");
            let url = signed_url(base, &query, &self.config.secret)?;
            self.http.get(url).send().await?
        };

        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            return Err(decode_error(status.as_u16(), &body));
        }
        unwrap_envelope(&body)
    }

    /// Like [`Transport::request`], but retries failed attempts.
    ///
    /// Makes up to three attempts with a fixed half-second pause between
    /// them. Structured API errors are returned immediately.
    pub async fn request_idempotent(&self, command: &str, params: &Query) -> Result<Value, CloudStackError> {
        let mut attempt = 1;
        loop {
            match self.request(command, params).await {
                Ok(value) => return Ok(value),
                Err(err @ CloudStackError::Api { .. }) => return Err(err),
                Err(err) if attempt < RETRY_ATTEMPTS => {
                    warn!(command, attempt, error = %err, "idempotent request failed, retrying");
                    tokio::time::sleep(RETRY_PAUSE).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Polls job `job_id` until it finishes or the configured timeout passes.
    ///
    /// ## Errors
    ///
    /// See [`poll_job`].
    pub async fn wait_for_job(&self, job_id: &str) -> Result<Value, CloudStackError> {
        poll_job(self, job_id, self.config.async_timeout).await
    }

    fn prepare(&self, command: &str, params: &Query) -> Query {
        let mut query = params.clone();
        query
            .set("apiKey", self.config.api_key.as_str())
            .set("command", command)
            .set("response", "json");
        query
    }

    fn use_post(&self, command: &str) -> bool {
        !self.config.http_get_only && operation_policy(command).has(PolicyFlag::PostForm)
    }
}

impl JobSource for Transport {
    async fn job_status(&self, job_id: &str) -> Result<JobStatus, CloudStackError> {
        let mut params = Query::new();
        params.set("jobid", job_id);
        let value = self.request_idempotent(JOB_STATUS_COMMAND, &params).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Decodes the body of a non-200 response.
fn decode_error(status: u16, body: &[u8]) -> CloudStackError {
    let parsed = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| unwrap_value(value).ok())
        .and_then(|inner| serde_json::from_value::<ApiErrorBody>(inner).ok());

    match parsed {
        Some(e) => CloudStackError::Api {
            errorcode: e.errorcode,
            cserrorcode: e.cserrorcode,
            errortext: e.errortext,
        },
        None => CloudStackError::ErrorParse {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::builder("https://cloud.example/client/api", "key", "secret")
            .build()
            .unwrap()
    }

    #[test]
    fn builder_defaults() {
        let config = config();
        assert!(!config.async_mode());
        assert!(!config.http_get_only());
        assert_eq!(config.async_timeout(), Duration::from_secs(300));
        assert_eq!(config.http_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn zero_async_timeout_keeps_default() {
        let config = ClientConfig::builder("https://cloud.example/client/api", "key", "secret")
            .async_timeout(Duration::ZERO)
            .build()
            .unwrap();
        assert_eq!(config.async_timeout(), DEFAULT_ASYNC_TIMEOUT);
    }

    #[test]
    fn builder_rejects_bad_url_and_empty_credentials() {
        let err = ClientConfig::builder("not a url", "key", "secret").build().unwrap_err();
        assert!(matches!(err, CloudStackError::Config(_)));

        let err = ClientConfig::builder("https://cloud.example", "", "secret").build().unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn post_selection_honours_get_only() {
        let transport = Transport::new(config()).unwrap();
        assert!(transport.use_post("deployVirtualMachine"));
        assert!(!transport.use_post("listZones"));

        let get_only = ClientConfig::builder("https://cloud.example/client/api", "key", "secret")
            .http_get_only(true)
            .build()
            .unwrap();
        let transport = Transport::new(get_only).unwrap();
        assert!(!transport.use_post("deployVirtualMachine"));
    }

    #[test]
    fn prepare_adds_mandatory_params() {
        let transport = Transport::new(config()).unwrap();
        let mut params = Query::new();
        params.set("name", "Zone1");

        let query = transport.prepare("listZones", &params);
        assert_eq!(query.get("apiKey"), Some("key"));
        assert_eq!(query.get("command"), Some("listZones"));
        assert_eq!(query.get("response"), Some("json"));
        assert_eq!(query.get("name"), Some("Zone1"));
    }

    #[test]
    fn decode_error_structured_and_unstructured() {
        let err = decode_error(
            431,
            br#"{"listzonesresponse":{"errorcode":431,"cserrorcode":4350,"errortext":"bad"}}"#,
        );
        assert!(matches!(err, CloudStackError::Api { errorcode: 431, cserrorcode: 4350, .. }));

        let err = decode_error(502, b"<html>Bad Gateway</html>");
        assert!(matches!(err, CloudStackError::ErrorParse { status: 502, .. }));
    }

    mod retry {
        use wiremock::matchers::{method, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        use super::*;

        async fn transport_for(server: &MockServer) -> Transport {
            let config = ClientConfig::builder(format!("{}/client/api", server.uri()), "key", "secret")
                .build()
                .unwrap();
            Transport::new(config).unwrap()
        }

        #[tokio::test]
        #[tracing_test::traced_test]
        async fn idempotent_request_retries_until_success() {
            let server = MockServer::start().await;

            Mock::given(method("GET"))
                .and(query_param("command", JOB_STATUS_COMMAND))
                .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
                .up_to_n_times(2)
                .expect(2)
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(query_param("command", JOB_STATUS_COMMAND))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "queryasyncjobresultresponse": {"jobid": "j1", "jobstatus": 1, "jobresult": {}}
                })))
                .expect(1)
                .mount(&server)
                .await;

            let transport = transport_for(&server).await;
            let status = transport.job_status("j1").await.unwrap();

            assert_eq!(status.jobstatus, 1);
            assert!(logs_contain("idempotent request failed, retrying"));
        }

        #[tokio::test]
        async fn idempotent_request_gives_up_after_three_attempts() {
            let server = MockServer::start().await;

            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
                .expect(3)
                .mount(&server)
                .await;

            let transport = transport_for(&server).await;
            let err = transport
                .request_idempotent(JOB_STATUS_COMMAND, &Query::new())
                .await
                .unwrap_err();

            assert!(matches!(err, CloudStackError::ErrorParse { status: 503, .. }));
        }

        #[tokio::test]
        async fn structured_api_errors_are_not_retried() {
            let server = MockServer::start().await;

            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(530).set_body_json(serde_json::json!({
                    "queryasyncjobresultresponse": {"errorcode": 530, "cserrorcode": 9999, "errortext": "no such job"}
                })))
                .expect(1)
                .mount(&server)
                .await;

            let transport = transport_for(&server).await;
            let err = transport
                .request_idempotent(JOB_STATUS_COMMAND, &Query::new())
                .await
                .unwrap_err();

            assert!(matches!(err, CloudStackError::Api { errorcode: 530, .. }));
        }
    }
}
