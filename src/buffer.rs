//! Owned byte region.
use bytes::{Bytes, BytesMut};
use std::fmt;

#[cfg(test)]
mod test;

/// Fixed length byte region.
///
/// The length of a [`NetworkBuffer`] never changes in place. Operations that change the content
/// size, like [`get_sub_buffer`] with removal, replace the underlying bytes instead.
///
/// [`get_sub_buffer`]: NetworkBuffer::get_sub_buffer
#[derive(Clone, Default, PartialEq, Eq)]
pub struct NetworkBuffer {
    bytes: Bytes,
}

impl NetworkBuffer {
    /// Create new [`NetworkBuffer`].
    #[inline]
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Create an empty [`NetworkBuffer`].
    #[inline]
    pub const fn empty() -> Self {
        Self { bytes: Bytes::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Returns a new buffer holding `length` bytes starting at `offset`.
    ///
    /// If `remove_from_original` is `true`, the slice is excised from this buffer, the remaining
    /// bytes keep their order.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError`] if the range is out of bounds.
    pub fn get_sub_buffer(
        &mut self,
        offset: usize,
        length: usize,
        remove_from_original: bool,
    ) -> Result<NetworkBuffer, BufferError> {
        let end = self.check_range(offset, length)?;
        let sub = self.bytes.slice(offset..end);

        if remove_from_original {
            self.bytes = if offset == 0 {
                // front removal is the common case when serving a prepend, no copy needed
                self.bytes.slice(end..)
            } else if end == self.bytes.len() {
                self.bytes.slice(..offset)
            } else {
                let mut rest = BytesMut::with_capacity(self.bytes.len() - length);
                rest.extend_from_slice(&self.bytes[..offset]);
                rest.extend_from_slice(&self.bytes[end..]);
                rest.freeze()
            };
        }

        Ok(NetworkBuffer { bytes: sub })
    }

    /// Copy `length` bytes starting at `offset` into the front of `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError`] if the range is out of bounds, or `dest` is shorter than `length`.
    pub fn copy_to(&self, dest: &mut [u8], offset: usize, length: usize) -> Result<(), BufferError> {
        let end = self.check_range(offset, length)?;
        let Some(dest) = dest.get_mut(..length) else {
            return Err(BufferError::DestinationTooSmall {
                needed: length,
                available: dest.len(),
            });
        };
        dest.copy_from_slice(&self.bytes[offset..end]);
        Ok(())
    }

    fn check_range(&self, offset: usize, length: usize) -> Result<usize, BufferError> {
        match offset.checked_add(length) {
            Some(end) if end <= self.bytes.len() => Ok(end),
            _ => Err(BufferError::OutOfBounds {
                offset,
                length,
                len: self.bytes.len(),
            }),
        }
    }
}

impl From<Bytes> for NetworkBuffer {
    #[inline]
    fn from(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl From<BytesMut> for NetworkBuffer {
    #[inline]
    fn from(bytes: BytesMut) -> Self {
        Self {
            bytes: bytes.freeze(),
        }
    }
}

impl fmt::Debug for NetworkBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkBuffer")
            .field("len", &self.bytes.len())
            .finish()
    }
}

// ===== Error =====

/// An error when accessing a [`NetworkBuffer`] range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// Requested range lies outside the buffer.
    OutOfBounds {
        offset: usize,
        length: usize,
        len: usize,
    },
    /// Destination cannot hold the requested bytes.
    DestinationTooSmall { needed: usize, available: usize },
}

impl std::error::Error for BufferError { }

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { offset, length, len } => write!(
                f,
                "range {offset}..{} out of bounds for buffer of length {len}",
                offset.saturating_add(*length)
            ),
            Self::DestinationTooSmall { needed, available } => write!(
                f,
                "destination too small, needed {needed} bytes, available {available}"
            ),
        }
    }
}
