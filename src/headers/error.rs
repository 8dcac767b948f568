//! Error types that can occur during header related operation.

/// An error that can occur in header related operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderError {
    /// Header name is empty.
    Empty,
    /// Header name contains invalid character.
    InvalidName,
    /// Header value contains control or non-ASCII character.
    InvalidValue,
}

impl HeaderError {
    pub(crate) const fn message(&self) -> &'static str {
        match self {
            Self::Empty => "header name cannot be empty",
            Self::InvalidName => "header name contains invalid byte",
            Self::InvalidValue => "header value contains invalid byte",
        }
    }
}

impl std::error::Error for HeaderError {}

impl std::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
