use super::HeaderError;

/// Header Field.
///
/// Contains the header name as it was given, and a single value.
#[derive(Clone, PartialEq, Eq)]
pub struct HeaderField {
    name: String,
    value: String,
}

impl HeaderField {
    /// Create new validated [`HeaderField`].
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError`] if the name is not a valid token, or the value contains control
    /// characters or non-ASCII bytes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, HeaderError> {
        let name = name.into();
        let value = value.into();
        validate_name(&name)?;
        validate_value(&value)?;
        Ok(Self { name, value })
    }

    /// Create [`HeaderField`] from already validated parts.
    pub(crate) fn new_unchecked(name: String, value: String) -> Self {
        debug_assert!(validate_name(&name).is_ok());
        Self { name, value }
    }

    /// Returns the header name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the header value.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns `true` if the name equals `name`, ignoring ASCII case.
    #[inline]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub(crate) fn set_value(&mut self, value: String) -> String {
        std::mem::replace(&mut self.value, value)
    }

    pub(crate) fn into_value(self) -> String {
        self.value
    }
}

impl std::fmt::Debug for HeaderField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?}", self.name, self.value)
    }
}

// ===== Validation =====

// rfc9110 token: any VCHAR except delimiters
const fn is_token(byte: u8) -> bool {
    matches!(
        byte,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`'
            | b'|' | b'~' | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z'
    )
}

// visible ASCII, space and tab; non-ASCII is rejected, the wire format is ASCII only
const fn is_value_char(byte: u8) -> bool {
    matches!(byte, b'\t' | b' '..=b'~')
}

pub(crate) fn validate_name(name: &str) -> Result<(), HeaderError> {
    if name.is_empty() {
        return Err(HeaderError::Empty);
    }
    if !name.bytes().all(is_token) {
        return Err(HeaderError::InvalidName);
    }
    Ok(())
}

pub(crate) fn validate_value(value: &str) -> Result<(), HeaderError> {
    if !value.bytes().all(is_value_char) {
        return Err(HeaderError::InvalidValue);
    }
    Ok(())
}
