//! HTTP Client port

use std::future::Future;

use apiprobe_domain::{RequestSpec, ResponseSpec};
use thiserror::Error;

/// Transport-level failures reported by an [`HttpClient`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// The URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request did not complete within its timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Timeout that applied to the call.
        timeout_ms: u64,
    },

    /// The server actively refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The host name could not be resolved.
    #[error("could not resolve host {host}: {message}")]
    DnsError {
        /// Target host.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// Any other connection-level failure.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect limit was exceeded.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit.
        max: usize,
    },

    /// Headers arrived but the body could not be read.
    #[error("failed to read response body: {message}")]
    BodyRead {
        /// Reader message.
        message: String,
        /// Status, headers and timing received before the failure; empty body.
        response: Box<ResponseSpec>,
    },

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the application layer to be independent of specific HTTP libraries.
pub trait HttpClient: Send + Sync {
    /// Executes an HTTP request and returns the response.
    ///
    /// The returned response's `duration` covers the time from sending the
    /// request until the response headers arrived. A `timeout` on the request
    /// applies to this call only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails due to network issues,
    /// timeout, or a body that cannot be read.
    fn execute(
        &self,
        request: &RequestSpec,
    ) -> impl Future<Output = Result<ResponseSpec, HttpClientError>> + Send;
}
