//! Per-phase operation contexts.
//!
//! Each asynchronous phase owns exactly one context, carrying the in-flight payload and the
//! duration of the timer that guards every socket call of the phase.
use bytes::Bytes;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpSocket, TcpStream};

use crate::common::ParseResult;
use crate::error::{Error, ErrorKind};
use crate::h1::parser::Head;
use crate::h1::{HeadBuffer, ProtoError};
use crate::http::RequestBody;
use crate::log::{debug, trace};
use crate::stream::NetworkStream;

// ===== Connect =====

pub(crate) struct ConnectContext {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) send_buffer_size: usize,
    pub(crate) receive_buffer_size: usize,
    pub(crate) timeout: Duration,
}

impl ConnectContext {
    /// Resolve the host and connect to the first address that accepts.
    pub(crate) async fn open(&self) -> Result<TcpStream, Error> {
        let addrs = self.resolve().await?;

        let mut last_err = None;
        for addr in addrs {
            trace!("connecting to {addr}");
            match self.connect(addr).await {
                Ok(tcp) => return Ok(tcp),
                Err(err) => {
                    debug!("connect to {addr} failed: {err}");
                    last_err = Some(err);
                }
            }
        }

        match last_err {
            Some(err) => Err(err.into()),
            None => Err(ErrorKind::Resolve.into()),
        }
    }

    async fn resolve(&self) -> Result<Vec<SocketAddr>, Error> {
        // literal address needs no lookup
        if let Ok(ip) = self.host.parse::<IpAddr>() {
            return Ok(vec![SocketAddr::new(ip, self.port)]);
        }
        let addrs = tokio::net::lookup_host((self.host.as_str(), self.port)).await?;
        Ok(addrs.collect())
    }

    async fn connect(&self, addr: SocketAddr) -> io::Result<TcpStream> {
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_send_buffer_size(buffer_size(self.send_buffer_size))?;
        socket.set_recv_buffer_size(buffer_size(self.receive_buffer_size))?;
        socket.connect(addr).await
    }
}

fn buffer_size(size: usize) -> u32 {
    u32::try_from(size).unwrap_or(u32::MAX)
}

// ===== Send Headers =====

pub(crate) struct SendHeaderContext {
    head: Bytes,
    chunk_size: usize,
    pub(crate) timeout: Duration,
}

impl SendHeaderContext {
    pub(crate) fn new(head: Bytes, chunk_size: usize, timeout: Duration) -> Self {
        Self {
            head,
            chunk_size: chunk_size.max(1),
            timeout,
        }
    }

    /// Split the next packet off the unsent header block.
    pub(crate) fn next_chunk(&mut self) -> Option<Bytes> {
        if self.head.is_empty() {
            return None;
        }
        let at = self.chunk_size.min(self.head.len());
        Some(self.head.split_to(at))
    }
}

// ===== Send Body =====

pub(crate) struct SendBodyContext {
    pub(crate) body: RequestBody,
    /// Write side over the connection socket, bounded by the declared content length.
    pub(crate) stream: NetworkStream,
}

// ===== Receive Headers =====

pub(crate) struct ReceiveHeaderContext {
    buffer: HeadBuffer,
    pub(crate) scratch: Vec<u8>,
    pub(crate) timeout: Duration,
}

impl ReceiveHeaderContext {
    pub(crate) fn new(chunk_size: usize, timeout: Duration) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            buffer: HeadBuffer::with_capacity(chunk_size),
            scratch: vec![0; chunk_size],
            timeout,
        }
    }

    /// Append `read` bytes of scratch to the header buffer and look for the terminator.
    pub(crate) fn feed(&mut self, read: usize) -> ParseResult<Head, ProtoError> {
        self.buffer
            .bytes_mut()
            .extend_from_slice(&self.scratch[..read]);
        self.buffer.split_head()
    }
}

// ===== Close =====

pub(crate) struct CloseContext {
    pub(crate) timeout: Duration,
}
