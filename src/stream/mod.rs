//! Content-Length framed body stream.
//!
//! [`NetworkStream`] transfers exactly one body over a socket and never moves more bytes than the
//! declared content length. Bytes that were read off the socket together with the response head
//! are served first, before the socket is touched again.
//!
//! Every operation comes in two flavors:
//!
//! - asynchronous, `*_async`, failures are reported to the subscriber, if any, and returned
//! - blocking, driven on the runtime the stream was created in, failures are only returned
//!
//! Blocking operations must be called outside of an async context, e.g: in
//! [`tokio::task::spawn_blocking`], on a multi-threaded runtime.
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::runtime::Handle;

use crate::buffer::NetworkBuffer;
use crate::conn::Tally;
use crate::event::{Emitter, Events, channel};
use crate::log::{debug, trace, warning};
use crate::rt;
use crate::socket::{Settled, Socket};

mod error;
mod event;


pub use error::StreamError;
pub use event::{Direction, StreamEvent};

/// Default size of a single socket read in [`read_to_end`] and [`copy_to`].
///
/// [`read_to_end`]: NetworkStream::read_to_end
/// [`copy_to`]: NetworkStream::copy_to
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Upper bound of the up front allocation in `read_to_end`.
const MAX_PREALLOC: u64 = 64 * 1024;

/// Content-Length framed stream over a socket.
pub struct NetworkStream {
    socket: Arc<Socket>,
    content_length: u64,
    transferred: u64,
    prepend: NetworkBuffer,
    timeout: Duration,
    chunk_size: usize,
    handle: Handle,
    observer: Option<Emitter<StreamEvent>>,
    tally: Option<Tally>,
    closed: bool,
}

impl NetworkStream {
    /// Create new [`NetworkStream`] over `tcp`.
    ///
    /// `prepend` holds bytes that were already read from `tcp` and are served first. Every socket
    /// operation is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::ContentLengthExceeded`] if `prepend` is longer than
    /// `content_length`, and [`StreamError::Runtime`] if called outside of a runtime.
    pub fn new(
        tcp: TcpStream,
        content_length: u64,
        prepend: Option<NetworkBuffer>,
        timeout: Duration,
    ) -> Result<Self, StreamError> {
        Self::with_socket(
            Arc::new(Socket::new(Some(tcp))),
            content_length,
            prepend.unwrap_or_default(),
            timeout,
        )
    }

    pub(crate) fn with_socket(
        socket: Arc<Socket>,
        content_length: u64,
        prepend: NetworkBuffer,
        timeout: Duration,
    ) -> Result<Self, StreamError> {
        let handle = rt::handle()?;
        let prepend_len = prepend.len() as u64;
        if prepend_len > content_length {
            return Err(StreamError::exceeded(content_length, prepend_len));
        }
        Ok(Self {
            socket,
            content_length,
            transferred: 0,
            prepend,
            timeout,
            chunk_size: DEFAULT_BUFFER_SIZE,
            handle,
            observer: None,
            tally: None,
            closed: false,
        })
    }

    /// Set the size of a single socket read in [`read_to_end`] and [`copy_to`].
    ///
    /// [`read_to_end`]: NetworkStream::read_to_end
    /// [`copy_to`]: NetworkStream::copy_to
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub(crate) fn with_tally(mut self, tally: Tally) -> Self {
        self.tally = Some(tally);
        self
    }

    /// Subscribe to transfer events.
    ///
    /// Only the latest subscriber receives events.
    pub fn subscribe(&mut self) -> Events<StreamEvent> {
        let (tx, rx) = channel();
        self.observer = Some(tx);
        rx
    }
}

// ===== Ref =====

impl NetworkStream {
    /// Returns the declared content length.
    #[inline]
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Returns the number of bytes transferred so far.
    #[inline]
    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Returns the number of bytes left before the declared content length.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.content_length - self.transferred
    }

    /// Returns `true` if the declared content length was transferred.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.transferred == self.content_length
    }

    /// Returns the number of prepended bytes not yet served.
    #[inline]
    pub fn prepended(&self) -> usize {
        self.prepend.len()
    }

    /// Returns `true` if the stream was closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Close the stream.
    ///
    /// The socket is only closed if `close_socket` is `true`, otherwise it stays with its owner.
    pub fn close(&mut self, close_socket: bool) {
        self.closed = true;
        self.prepend = NetworkBuffer::empty();
        if close_socket {
            self.socket.abort();
        }
    }
}

// ===== Blocking =====

impl NetworkStream {
    /// Read into `buf`, blocking the current thread.
    ///
    /// Returns `0` when the declared content length was transferred.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::ContentLengthExceeded`] if `buf` is longer than the remaining
    /// content.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        let handle = self.handle.clone();
        handle.block_on(self.read_inner(buf))
    }

    /// Read the remaining body as a string, blocking the current thread.
    pub fn read_to_end(&mut self) -> Result<String, StreamError> {
        let handle = self.handle.clone();
        handle.block_on(self.read_to_end_inner())
    }

    /// Copy the remaining body into `dest`, blocking the current thread.
    pub fn copy_to<W: Write>(&mut self, mut dest: W) -> Result<W, StreamError> {
        let handle = self.handle.clone();
        handle.block_on(self.copy_to_blocking(&mut dest))?;
        Ok(dest)
    }

    /// Write `buf`, blocking the current thread.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::ContentLengthExceeded`] if `buf` is longer than the remaining
    /// content.
    pub fn write(&mut self, buf: &[u8]) -> Result<(), StreamError> {
        let handle = self.handle.clone();
        handle.block_on(self.write_inner(buf))
    }
}

// ===== Async =====

impl NetworkStream {
    /// Read into `buf`.
    ///
    /// Returns `0` when the declared content length was transferred.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::ContentLengthExceeded`] if `buf` is longer than the remaining
    /// content.
    pub async fn read_async(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        let result = self.read_inner(buf).await;
        self.report(result)
    }

    /// Read the remaining body as a string.
    pub async fn read_to_end_async(&mut self) -> Result<String, StreamError> {
        let result = self.read_to_end_inner().await;
        self.report(result)
    }

    /// Copy the remaining body into `dest`.
    pub async fn copy_to_async<W>(&mut self, dest: W) -> Result<W, StreamError>
    where
        W: AsyncWrite + Unpin,
    {
        let result = self.copy_to_inner(dest).await;
        self.report(result)
    }

    /// Write `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::ContentLengthExceeded`] if `buf` is longer than the remaining
    /// content.
    pub async fn write_async(&mut self, buf: &[u8]) -> Result<(), StreamError> {
        let result = self.write_inner(buf).await;
        self.report(result)
    }

    /// Write everything `source` yields, in chunks of at most `chunk_size`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::ContentLengthExceeded`] if `source` yields more than the declared
    /// content length, and [`StreamError::UnexpectedEof`] if it yields less.
    pub(crate) async fn write_from<R>(&mut self, source: &mut R) -> Result<u64, StreamError>
    where
        R: tokio::io::AsyncRead + Unpin,
    {
        let mut chunk = vec![0; self.chunk_size];
        let mut written = 0u64;
        loop {
            let read = source.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            self.write_inner(&chunk[..read]).await?;
            written += read as u64;
        }
        if !self.is_complete() {
            return Err(StreamError::UnexpectedEof);
        }
        Ok(written)
    }
}

// ===== Operations =====

impl NetworkStream {
    async fn read_inner(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }

        let remaining = self.remaining();
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let len = buf.len() as u64;
        if len > remaining {
            return Err(StreamError::exceeded(self.content_length, self.transferred + len));
        }

        if !self.prepend.is_empty() {
            let n = buf.len().min(self.prepend.len());
            let head = self.prepend.get_sub_buffer(0, n, true)?;
            head.copy_to(buf, 0, n)?;
            trace!("served {n} prepended bytes");
            self.advance(Direction::Download, n);
            return Ok(n);
        }

        let socket = Arc::clone(&self.socket);
        let mut io = socket.lock().await;
        let Some(tcp) = io.as_mut() else {
            return Err(StreamError::Closed);
        };

        match socket.settle(self.timeout, tcp.read(buf)).await? {
            Settled::Done(Ok(0)) => {
                debug!(
                    "peer closed after {} of {} body bytes",
                    self.transferred, self.content_length
                );
                Err(StreamError::UnexpectedEof)
            }
            Settled::Done(Ok(n)) => {
                if let Some(tally) = &self.tally {
                    tally.record(n);
                }
                self.advance(Direction::Download, n);
                Ok(n)
            }
            Settled::Done(Err(err)) => Err(err.into()),
            Settled::TimedOut => {
                warning!("body read timed out after {:?}", self.timeout);
                socket.kill(&mut io);
                if let Some(tally) = &self.tally {
                    tally.timed_out();
                }
                Err(StreamError::TimedOut)
            }
            Settled::Closed => {
                io.take();
                Err(StreamError::Closed)
            }
        }
    }

    /// Read at most `chunk.len()` bytes, never past the declared content length.
    async fn read_chunk(&mut self, chunk: &mut [u8]) -> Result<usize, StreamError> {
        let n = usize::try_from(self.remaining())
            .unwrap_or(usize::MAX)
            .min(chunk.len());
        self.read_inner(&mut chunk[..n]).await
    }

    async fn read_to_end_inner(&mut self) -> Result<String, StreamError> {
        let mut body = Vec::with_capacity(self.remaining().min(MAX_PREALLOC) as usize);
        let mut chunk = vec![0; self.chunk_size];
        loop {
            let read = self.read_chunk(&mut chunk).await?;
            if read == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..read]);
        }
        let text = String::from_utf8(body).map_err(|_| StreamError::InvalidText)?;
        self.emit(StreamEvent::ReadToEnd(text.clone()));
        Ok(text)
    }

    async fn copy_to_inner<W>(&mut self, mut dest: W) -> Result<W, StreamError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut chunk = vec![0; self.chunk_size];
        let mut copied = 0u64;
        loop {
            let read = self.read_chunk(&mut chunk).await?;
            if read == 0 {
                break;
            }
            dest.write_all(&chunk[..read]).await?;
            copied += read as u64;
        }
        dest.flush().await?;
        self.emit(StreamEvent::CopiedTo { bytes: copied });
        Ok(dest)
    }

    async fn copy_to_blocking<W: Write>(&mut self, dest: &mut W) -> Result<(), StreamError> {
        let mut chunk = vec![0; self.chunk_size];
        let mut copied = 0u64;
        loop {
            let read = self.read_chunk(&mut chunk).await?;
            if read == 0 {
                break;
            }
            dest.write_all(&chunk[..read])?;
            copied += read as u64;
        }
        dest.flush()?;
        self.emit(StreamEvent::CopiedTo { bytes: copied });
        Ok(())
    }

    async fn write_inner(&mut self, buf: &[u8]) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        if buf.is_empty() {
            return Ok(());
        }

        let len = buf.len() as u64;
        if len > self.remaining() {
            return Err(StreamError::exceeded(self.content_length, self.transferred + len));
        }

        let socket = Arc::clone(&self.socket);
        let mut io = socket.lock().await;
        let Some(tcp) = io.as_mut() else {
            return Err(StreamError::Closed);
        };

        match socket.settle(self.timeout, tcp.write_all(buf)).await? {
            Settled::Done(Ok(())) => {
                if let Some(tally) = &self.tally {
                    tally.record(buf.len());
                }
                self.advance(Direction::Upload, buf.len());
                if self.is_complete() {
                    self.emit(StreamEvent::Written {
                        bytes: self.content_length,
                    });
                }
                Ok(())
            }
            Settled::Done(Err(err)) => Err(err.into()),
            Settled::TimedOut => {
                warning!("body write timed out after {:?}", self.timeout);
                socket.kill(&mut io);
                Err(StreamError::TimedOut)
            }
            Settled::Closed => {
                io.take();
                Err(StreamError::Closed)
            }
        }
    }

    fn advance(&mut self, direction: Direction, bytes: usize) {
        self.transferred += bytes as u64;
        debug_assert!(self.transferred <= self.content_length);
        self.emit(StreamEvent::Progress { direction, bytes });
    }

    fn emit(&self, event: StreamEvent) {
        if let Some(observer) = &self.observer {
            let _ = observer.send(event);
        }
    }

    fn report<T>(&self, result: Result<T, StreamError>) -> Result<T, StreamError> {
        match &result {
            Ok(_) => {}
            Err(StreamError::TimedOut) => self.emit(StreamEvent::Timeout),
            Err(err) => self.emit(StreamEvent::Error(err.to_string())),
        }
        result
    }
}

impl std::fmt::Debug for NetworkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkStream")
            .field("content_length", &self.content_length)
            .field("transferred", &self.transferred)
            .field("prepended", &self.prepend.len())
            .field("closed", &self.closed)
            .finish()
    }
}
