use super::field::{validate_name, validate_value};
use super::{GetAll, HeaderError, HeaderField, Iter};

/// Ordered HTTP header list with case-insensitive lookup.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    fields: Vec<HeaderField>,
}

impl HeaderMap {
    /// Create new empty [`HeaderMap`].
    ///
    /// This function does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Create new empty [`HeaderMap`] with at least the specified capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of header fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if headers has no element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ===== Lookup =====

impl HeaderMap {
    /// Returns `true` if the map contains a header value for given header name.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.is(name))
    }

    /// Returns the first value for given header name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.is(name))
            .map(HeaderField::value)
    }

    /// Returns an iterator over every value of given header name.
    #[inline]
    pub fn get_all<'a>(&'a self, name: &'a str) -> GetAll<'a> {
        GetAll::new(name, &self.fields)
    }

    /// Returns an iterator over all headers in insertion order.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.fields)
    }
}

// ===== Mutation =====

impl HeaderMap {
    /// Append a header field at the end of the list.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError`] if the name or value is invalid.
    pub fn append(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), HeaderError> {
        self.fields.push(HeaderField::new(name, value)?);
        Ok(())
    }

    /// Insert a header value.
    ///
    /// If the name is already present, the first field keeps its position and takes the new
    /// value, any other field with the same name is removed, and the previous value is returned.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError`] if the name or value is invalid.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, HeaderError> {
        let name = name.into();
        let value = value.into();
        validate_name(&name)?;
        validate_value(&value)?;

        let Some(index) = self.fields.iter().position(|field| field.is(&name)) else {
            self.fields.push(HeaderField::new_unchecked(name, value));
            return Ok(None);
        };

        let previous = self.fields[index].set_value(value);

        let mut i = 0;
        self.fields.retain(|field| {
            let keep = i <= index || !field.is(&name);
            i += 1;
            keep
        });

        Ok(Some(previous))
    }

    /// Remove every field with given header name, returning the first value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.fields.iter().position(|field| field.is(name))?;
        let first = self.fields.remove(index);
        self.fields.retain(|field| !field.is(name));
        Some(first.into_value())
    }

    /// Remove all headers.
    #[inline]
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Push a field which was already validated by the parser.
    pub(crate) fn push_field(&mut self, field: HeaderField) {
        self.fields.push(field);
    }
}

impl std::fmt::Debug for HeaderMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
