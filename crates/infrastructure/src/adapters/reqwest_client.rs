//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! It handles all HTTP communication for the engine.

use std::time::{Duration, Instant};

use apiprobe_application::ports::{HttpClient, HttpClientError};
use apiprobe_domain::{HttpMethod, RequestSpec, ResponseHeaders, ResponseSpec};
use reqwest::{Client, Method, Url};

/// Timeout applied when a request does not set its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_REDIRECTS: usize = 10;

const USER_AGENT: &str = concat!("apiprobe/", env!("CARGO_PKG_VERSION"));

/// HTTP client implementation using reqwest.
///
/// Wraps `reqwest::Client` and implements the `HttpClient` port from the
/// application layer. The client is cheap to share; connections are pooled.
pub struct ReqwestHttpClient {
    client: Client,
    default_timeout: Duration,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// Default configuration:
    /// - Request timeout: 30 seconds
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: "apiprobe/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, HttpClientError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client whose default request timeout is `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Returns the timeout used when a request sets none.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Maps reqwest errors to the port's `HttpClientError`.
    fn map_error(error: &reqwest::Error, timeout: Duration) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }

        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error_chain(error);
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return HttpClientError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        HttpClientError::Other(error_chain(error))
    }
}

/// Joins an error with its sources; reqwest keeps the useful part in the chain.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}

impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
        let url = Url::parse(&request.url)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {}", request.url)))?;
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        // Timed up to the response headers, body download excluded.
        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout))?;
        let duration = start.elapsed();

        let status = response.status().as_u16();
        let headers: ResponseHeaders = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                return Err(HttpClientError::BodyRead {
                    message: error_chain(&e),
                    response: Box::new(ResponseSpec::new(status, headers, &[], duration)),
                });
            }
        };

        Ok(ResponseSpec::new(status, headers, &body, duration))
    }
}
