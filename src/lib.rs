//! Asynchronous HTTP/1.1 Client Transport
//!
//! One [`Connection`] carries one request and its response over a plain TCP socket:
//!
//! - [`Client`] executes a request and reports the outcome to a [`Handler`]
//! - [`ConnectionManager`] creates connections and starts connecting them
//! - [`Connection`] drives connect, send, receive and close, reporting [`ConnectionEvent`]s
//! - [`NetworkStream`] reads the response body, bounded by its `Content-Length`
//!
//! Every socket call is guarded by its own [`Timeout`]. Only `Content-Length` framed bodies are
//! supported, chunked responses and `Set-Cookie` headers are rejected.
#![warn(missing_debug_implementations)]

mod log;
mod common;
mod socket;
mod h1;

pub mod rt;
pub mod error;
pub mod timeout;
pub mod buffer;
pub mod headers;
pub mod http;
pub mod event;
pub mod stream;
pub mod conn;
pub mod manager;
pub mod client;

pub use error::{Error, ErrorKind};
pub use rt::RuntimeError;
pub use timeout::{Timeout, TimeoutError};
pub use buffer::{BufferError, NetworkBuffer};
pub use headers::{HeaderError, HeaderMap};
pub use http::{Method, Request, RequestBody, Response, Uri, UriError, Version};
pub use event::Events;
pub use stream::{Direction, NetworkStream, StreamError, StreamEvent};
pub use conn::{Connection, ConnectionEvent, Failure, Options, Phase, Progress, TransferStats};
pub use manager::{ConnectOutcome, Connected, Connecting, ConnectionManager};
pub use client::{Client, ClientEvent, Handler};
pub use h1::{MAX_HEAD_SIZE, ProtoError};
