use crate::headers::standard::CONTENT_LENGTH;
use crate::headers::{HeaderError, HeaderMap};

use super::{Method, Version};

/// HTTP Request head.
///
/// The request is read-only once handed to the transport.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: Method,
    target: String,
    version: Version,
    headers: HeaderMap,
    content_length: Option<u64>,
}

impl Request {
    /// Create new [`Request`] with given method and request target, e.g: `/thing`.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            content_length: None,
        }
    }

    /// Create new `GET` request.
    #[inline]
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    /// Create new `POST` request.
    #[inline]
    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    /// Create new `PUT` request.
    #[inline]
    pub fn put(target: impl Into<String>) -> Self {
        Self::new(Method::PUT, target)
    }

    /// Create new `DELETE` request.
    #[inline]
    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::DELETE, target)
    }

    /// Append a header, builder style.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError`] if the name or value is invalid.
    pub fn with_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, HeaderError> {
        self.headers.append(name, value)?;
        Ok(self)
    }

    /// Set the declared body length, builder style.
    #[inline]
    pub fn with_content_length(mut self, len: u64) -> Self {
        self.content_length = Some(len);
        self
    }

    #[inline]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }
}

// ===== Ref =====

impl Request {
    #[inline]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the request target, e.g: `/thing?id=1`.
    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    #[inline]
    pub fn set_content_length(&mut self, len: Option<u64>) {
        self.content_length = len;
    }

    /// Returns the declared body length.
    ///
    /// An explicitly set length takes precedence over a `Content-Length` header.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length.or_else(|| {
            self.headers
                .get(CONTENT_LENGTH)
                .and_then(|value| value.trim().parse().ok())
        })
    }
}
