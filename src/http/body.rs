use bytes::Bytes;
use std::io::{self, Cursor, SeekFrom};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncSeek, AsyncSeekExt, ReadBuf};

/// Readable and seekable source.
pub trait SeekRead: AsyncRead + AsyncSeek + Send + Unpin { }

impl<T> SeekRead for T where T: AsyncRead + AsyncSeek + Send + Unpin { }

/// Request body source.
///
/// A seekable source determines the `Content-Length` itself and is rewound before sending. A
/// forward-only source requires the request to declare its length up front.
pub struct RequestBody {
    repr: Repr,
}

enum Repr {
    Seekable(Box<dyn SeekRead>),
    Stream(Box<dyn AsyncRead + Send + Unpin>),
}

impl RequestBody {
    /// Create body from a seekable source.
    pub fn seekable<R>(source: R) -> Self
    where
        R: AsyncRead + AsyncSeek + Send + Unpin + 'static,
    {
        Self {
            repr: Repr::Seekable(Box::new(source)),
        }
    }

    /// Create body from a forward-only source.
    pub fn stream<R>(source: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            repr: Repr::Stream(Box::new(source)),
        }
    }

    /// Returns `true` if the source can seek.
    #[inline]
    pub fn is_seekable(&self) -> bool {
        matches!(self.repr, Repr::Seekable(_))
    }

    /// Measure a seekable source and rewind it to the start.
    ///
    /// Returns `None` for a forward-only source.
    pub(crate) async fn measure(&mut self) -> io::Result<Option<u64>> {
        match &mut self.repr {
            Repr::Seekable(source) => {
                let len = source.seek(SeekFrom::End(0)).await?;
                source.seek(SeekFrom::Start(0)).await?;
                Ok(Some(len))
            }
            Repr::Stream(_) => Ok(None),
        }
    }
}

impl AsyncRead for RequestBody {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut self.get_mut().repr {
            Repr::Seekable(source) => Pin::new(source).poll_read(cx, buf),
            Repr::Stream(source) => Pin::new(source).poll_read(cx, buf),
        }
    }
}

impl From<Bytes> for RequestBody {
    #[inline]
    fn from(bytes: Bytes) -> Self {
        Self::seekable(Cursor::new(bytes))
    }
}

impl From<Vec<u8>> for RequestBody {
    #[inline]
    fn from(bytes: Vec<u8>) -> Self {
        Self::from(Bytes::from(bytes))
    }
}

impl From<String> for RequestBody {
    #[inline]
    fn from(value: String) -> Self {
        Self::from(Bytes::from(value))
    }
}

impl From<&'static [u8]> for RequestBody {
    #[inline]
    fn from(bytes: &'static [u8]) -> Self {
        Self::from(Bytes::from_static(bytes))
    }
}

impl From<&'static str> for RequestBody {
    #[inline]
    fn from(value: &'static str) -> Self {
        Self::from(Bytes::from_static(value.as_bytes()))
    }
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_seekable() { "seekable" } else { "stream" };
        f.debug_tuple("RequestBody").field(&kind).finish()
    }
}
