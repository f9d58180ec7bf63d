//! Response specification type
//!
//! Normalized view of an HTTP response as returned by a transport adapter.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ResponseHeaders;

/// HTTP response specification.
///
/// Contains all information received from an HTTP call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// HTTP status code.
    pub status: u16,
    /// Response headers (multi-valued).
    #[serde(default)]
    pub headers: ResponseHeaders,
    /// Response body decoded as (lossy) UTF-8.
    pub body: String,
    /// Time from sending the request until the response headers arrived.
    #[serde(with = "crate::serde_duration::millis")]
    pub duration: Duration,
}

impl ResponseSpec {
    /// Creates a new `ResponseSpec` from raw response data.
    ///
    /// Invalid UTF-8 sequences in the body are replaced with the replacement character.
    #[must_use]
    pub fn new(status: u16, headers: ResponseHeaders, body: &[u8], duration: Duration) -> Self {
        Self {
            status,
            headers,
            body: String::from_utf8_lossy(body).into_owned(),
            duration,
        }
    }
}
