use crate::headers::HeaderMap;
use crate::headers::standard::CONTENT_LENGTH;
use crate::stream::{NetworkStream, StreamError};

use super::Version;

/// HTTP Response.
///
/// The body stream is attached only when the peer announced a positive `Content-Length`.
#[derive(Debug)]
pub struct Response {
    version: Version,
    status: u16,
    reason: String,
    headers: HeaderMap,
    body: Option<NetworkStream>,
}

impl Response {
    pub(crate) fn new(
        version: Version,
        status: u16,
        reason: String,
        headers: HeaderMap,
        body: Option<NetworkStream>,
    ) -> Self {
        Self {
            version,
            status,
            reason,
            headers,
            body,
        }
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the status code, e.g: `200`.
    #[inline]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the reason phrase, e.g: `OK`.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the announced `Content-Length`.
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.parse().ok())
    }

    /// Returns `true` if a body stream is attached.
    #[inline]
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    #[inline]
    pub fn body_mut(&mut self) -> Option<&mut NetworkStream> {
        self.body.as_mut()
    }

    /// Detach the body stream.
    #[inline]
    pub fn take_body(&mut self) -> Option<NetworkStream> {
        self.body.take()
    }

    /// Read the whole body as a string.
    ///
    /// Returns an empty string when there is no body.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError`] if reading the body fails.
    pub async fn text(&mut self) -> Result<String, StreamError> {
        match &mut self.body {
            Some(body) => body.read_to_end_async().await,
            None => Ok(String::new()),
        }
    }
}
