//! Execute Request Use Case
//!
//! Builds one HTTP request from a test definition and the variables visible
//! to it, sends it through the [`HttpClient`] port, and normalizes the outcome
//! into a [`TestResult`].

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use apiprobe_domain::{
    BodySource, DomainError, RequestSpec, ResponseSpec, TestCase, TestResult, Variables,
};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::ports::{FileSystem, FileSystemError, HttpClient, HttpClientError};
use crate::variable_resolver::VariableResolver;

/// Why a request could not produce a response.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The test definition is invalid (e.g. both `body` and `body_file`).
    #[error(transparent)]
    Config(#[from] DomainError),

    /// The final URL is not a valid absolute URL.
    #[error("failed to create request: invalid URL '{url}': {message}")]
    InvalidUrl {
        /// URL after joining and substitution.
        url: String,
        /// Parser message.
        message: String,
    },

    /// The body file could not be loaded.
    #[error("failed to read body file '{path}': {source}")]
    BodyFile {
        /// Path after substitution.
        path: String,
        /// File system failure.
        source: FileSystemError,
    },

    /// The response arrived but its body could not be read.
    #[error("failed to read response body: {message}")]
    BodyRead {
        /// Reader message.
        message: String,
        /// What was received before the failure.
        response: Box<ResponseSpec>,
    },

    /// The transport call failed.
    #[error("request failed: {source}")]
    Transport {
        /// Transport failure.
        source: HttpClientError,
        /// Time spent in the call before it failed.
        elapsed: Duration,
    },
}

impl RequestError {
    fn from_transport(error: HttpClientError, elapsed: Duration) -> Self {
        match error {
            HttpClientError::BodyRead { message, response } => Self::BodyRead { message, response },
            source => Self::Transport { source, elapsed },
        }
    }

    /// Turns the error into a failed result, keeping any response data received.
    #[must_use]
    pub fn into_result(self, name: &str) -> TestResult {
        let message = self.to_string();
        match self {
            Self::BodyRead { response, .. } => {
                let mut result = TestResult::from_response(name, *response);
                result.fail(message);
                result
            }
            Self::Transport { elapsed, .. } => TestResult {
                duration: elapsed,
                ..TestResult::failure(name, message)
            },
            Self::Config(_) | Self::InvalidUrl { .. } | Self::BodyFile { .. } => {
                TestResult::failure(name, message)
            }
        }
    }
}

/// Joins a test URL to the suite base URL.
///
/// URLs starting with `http://` or `https://` pass through unchanged; other
/// paths are joined with exactly one slash.
#[must_use]
pub fn build_url(base_url: &str, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }

    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if base.is_empty() {
        path.to_string()
    } else {
        format!("{base}/{path}")
    }
}

pub(crate) fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Use case for executing a single test request.
///
/// Holds no per-call state: a test's timeout is passed with its request and
/// never affects later calls.
pub struct RequestExecutor<C: HttpClient, F: FileSystem> {
    client: Arc<C>,
    fs: Arc<F>,
}

impl<C: HttpClient, F: FileSystem> RequestExecutor<C, F> {
    /// Creates a new executor over the given ports.
    pub const fn new(client: Arc<C>, fs: Arc<F>) -> Self {
        Self { client, fs }
    }

    /// Executes the test's request and returns its result record.
    ///
    /// Never fails: any error becomes a result with `success == false`.
    pub async fn execute(&self, test: &TestCase, base_url: &str, variables: &Variables) -> TestResult {
        match self.send(test, base_url, variables).await {
            Ok(response) => TestResult::from_response(&test.name, response),
            Err(error) => error.into_result(&test.name),
        }
    }

    /// Builds and sends the request.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] on configuration, body-file or transport failure.
    pub async fn send(
        &self,
        test: &TestCase,
        base_url: &str,
        variables: &Variables,
    ) -> Result<ResponseSpec, RequestError> {
        let request = self.build_request(test, base_url, variables).await?;
        let start = Instant::now();
        let response = self
            .client
            .execute(&request)
            .await
            .map_err(|e| RequestError::from_transport(e, start.elapsed()))?;
        debug!(
            test = %test.name,
            method = %request.method,
            url = %request.url,
            status = response.status,
            elapsed_ms = %response.duration.as_millis(),
            "request completed"
        );
        Ok(response)
    }

    /// Resolves the test definition into a transport-ready request.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] when the body is ambiguous, the body file
    /// cannot be read, or the URL is invalid.
    pub async fn build_request(
        &self,
        test: &TestCase,
        base_url: &str,
        variables: &Variables,
    ) -> Result<RequestSpec, RequestError> {
        let resolver = VariableResolver::new(variables);

        let body = match test.body_source()? {
            None => None,
            Some(BodySource::Inline(body)) => Some(resolver.resolve(body)),
            Some(BodySource::File(path)) => {
                let path = resolver.resolve(path);
                let contents = self
                    .fs
                    .read_file_string(Path::new(&path))
                    .await
                    .map_err(|source| RequestError::BodyFile {
                        path: path.clone(),
                        source,
                    })?;
                Some(resolver.resolve(&contents))
            }
        };

        let url = resolver.resolve(&build_url(base_url, &test.url));
        let unresolved = resolver.find_unresolved(&url);
        if !unresolved.is_empty() {
            debug!(test = %test.name, ?unresolved, "URL has unresolved placeholders");
        }
        Url::parse(&url).map_err(|e| RequestError::InvalidUrl {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let mut request = RequestSpec::new(test.method, url);
        for (name, value) in &test.headers {
            request = request.with_header(name, resolver.resolve(value));
        }
        request.body = body;
        request.timeout = test.timeout.filter(|t| !t.is_zero());

        Ok(request)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::future::Future;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    use apiprobe_domain::{HttpMethod, ResponseHeaders};
    use pretty_assertions::assert_eq;

    use super::*;

    /// Mock HTTP client recording every request it receives.
    #[derive(Default)]
    struct RecordingClient {
        requests: Mutex<Vec<RequestSpec>>,
        failure: Option<HttpClientError>,
        latency: Duration,
    }

    impl HttpClient for RecordingClient {
        fn execute(
            &self,
            request: &RequestSpec,
        ) -> impl Future<Output = Result<ResponseSpec, HttpClientError>> + Send {
            self.requests.lock().unwrap().push(request.clone());
            let outcome = self.failure.clone().map_or_else(
                || {
                    Ok(ResponseSpec::new(
                        200,
                        ResponseHeaders::new(),
                        b"ok",
                        Duration::from_millis(5),
                    ))
                },
                Err,
            );
            let latency = self.latency;
            async move {
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                outcome
            }
        }
    }

    #[derive(Default)]
    struct MemoryFs {
        files: HashMap<PathBuf, String>,
    }

    impl FileSystem for MemoryFs {
        fn read_file_string(
            &self,
            path: &Path,
        ) -> impl Future<Output = Result<String, FileSystemError>> + Send {
            let outcome = self
                .files
                .get(path)
                .cloned()
                .ok_or_else(|| FileSystemError::NotFound(path.to_path_buf()));
            async move { outcome }
        }
    }

    fn executor(
        client: RecordingClient,
        fs: MemoryFs,
    ) -> (RequestExecutor<RecordingClient, MemoryFs>, Arc<RecordingClient>) {
        let client = Arc::new(client);
        (
            RequestExecutor::new(Arc::clone(&client), Arc::new(fs)),
            client,
        )
    }

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_build_url() {
        assert_eq!(build_url("http://api/", "/users"), "http://api/users");
        assert_eq!(build_url("http://api", "users"), "http://api/users");
        assert_eq!(
            build_url("http://api", "https://other/x"),
            "https://other/x"
        );
        assert_eq!(build_url("", "/users"), "users");
    }

    #[tokio::test]
    async fn test_interpolates_url_headers_and_body() {
        let (executor, client) = executor(RecordingClient::default(), MemoryFs::default());
        let test = TestCase::new("create", "/users/${id}")
            .with_method(HttpMethod::Put)
            .with_header("Authorization", "Bearer ${token}")
            .with_body(r#"{"name":"${name}"}"#)
            .with_timeout(Duration::from_secs(2));

        let result = executor
            .execute(
                &test,
                "http://localhost:8080/",
                &vars(&[("id", "7"), ("token", "t0k"), ("name", "Ada")]),
            )
            .await;

        assert!(result.success);
        assert_eq!(result.status_code, 200);
        let sent = client.requests.lock().unwrap()[0].clone();
        assert_eq!(sent.url, "http://localhost:8080/users/7");
        assert_eq!(sent.header("authorization"), Some("Bearer t0k"));
        assert_eq!(sent.body.as_deref(), Some(r#"{"name":"Ada"}"#));
        assert_eq!(sent.timeout, Some(Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn test_body_file_path_and_contents_are_interpolated() {
        let mut fs = MemoryFs::default();
        fs.files.insert(
            PathBuf::from("fixtures/user-7.json"),
            r#"{"owner":"${owner}"}"#.to_string(),
        );
        let (executor, client) = executor(RecordingClient::default(), fs);
        let test = TestCase::new("upload", "http://localhost/upload")
            .with_method(HttpMethod::Post)
            .with_body_file("fixtures/user-${id}.json");

        let result = executor
            .execute(&test, "", &vars(&[("id", "7"), ("owner", "ada")]))
            .await;

        assert!(result.success, "{:?}", result.error);
        let sent = client.requests.lock().unwrap()[0].clone();
        assert_eq!(sent.body.as_deref(), Some(r#"{"owner":"ada"}"#));
    }

    #[tokio::test]
    async fn test_configuration_errors_become_failed_results() {
        let (executor, client) = executor(RecordingClient::default(), MemoryFs::default());

        let both = TestCase::new("both", "http://localhost/")
            .with_body("{}")
            .with_body_file("a.json");
        let result = executor.execute(&both, "", &Variables::new()).await;
        assert!(!result.success);
        assert_eq!(
            result.error_message(),
            "cannot specify both 'body' and 'body_file' in the same test"
        );

        let missing = TestCase::new("missing", "http://localhost/").with_body_file("nope.json");
        let result = executor.execute(&missing, "", &Variables::new()).await;
        assert_eq!(
            result.error_message(),
            "failed to read body file 'nope.json': file not found: nope.json"
        );

        let bad_url = TestCase::new("bad", "/relative");
        let result = executor.execute(&bad_url, "", &Variables::new()).await;
        assert!(result.error_message().starts_with("failed to create request"));

        assert!(client.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let client = RecordingClient {
            failure: Some(HttpClientError::ConnectionFailed("refused".to_string())),
            latency: Duration::from_millis(20),
            ..RecordingClient::default()
        };
        let (executor, _) = executor(client, MemoryFs::default());
        let result = executor
            .execute(&TestCase::new("t", "http://localhost/"), "", &Variables::new())
            .await;

        assert!(!result.success);
        assert_eq!(result.status_code, 0);
        assert!(result.duration >= Duration::from_millis(20));
        assert_eq!(
            result.error_message(),
            "request failed: connection failed: refused"
        );
    }

    #[tokio::test]
    async fn test_body_read_failure_keeps_response_metadata() {
        let received = ResponseSpec::new(
            502,
            ResponseHeaders::new().with("X-Upstream", "edge-1"),
            b"",
            Duration::from_millis(9),
        );
        let client = RecordingClient {
            failure: Some(HttpClientError::BodyRead {
                message: "connection reset".to_string(),
                response: Box::new(received),
            }),
            ..RecordingClient::default()
        };
        let (executor, _) = executor(client, MemoryFs::default());
        let result = executor
            .execute(&TestCase::new("t", "http://localhost/"), "", &Variables::new())
            .await;

        assert!(!result.success);
        assert_eq!(result.status_code, 502);
        assert_eq!(result.duration, Duration::from_millis(9));
        assert_eq!(result.headers.first("x-upstream"), Some("edge-1"));
        assert_eq!(
            result.error_message(),
            "failed to read response body: connection reset"
        );
    }

    #[tokio::test]
    async fn test_zero_timeout_uses_transport_default() {
        let (executor, client) = executor(RecordingClient::default(), MemoryFs::default());
        let test = TestCase::new("t", "http://localhost/").with_timeout(Duration::ZERO);
        executor.execute(&test, "", &Variables::new()).await;
        assert_eq!(client.requests.lock().unwrap()[0].timeout, None);
    }
}
