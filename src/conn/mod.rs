//! Connection state machine.
//!
//! A [`Connection`] drives one HTTP/1.1 exchange over one socket:
//!
//! ```not_rust
//! Disconnected -> Connecting -> Connected -> SendingHeaders -> [SendingBody] -> ReceivingHeaders
//!     -> ReceivingBody -> Closing -> Closed
//! ```
//!
//! Every operation checks the phase synchronously, then runs on a spawned task and reports its
//! outcome as a [`ConnectionEvent`]. Each socket call within a phase is guarded by its own timer.
//! A timeout or a failure in any phase closes the socket and moves the connection to
//! [`Phase::Closed`], after which every operation fails with [`ErrorKind::InvalidState`].
use bytes::BytesMut;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::buffer::NetworkBuffer;
use crate::common::ParseResult;
use crate::error::{Error, ErrorKind};
use crate::event::{Emitter, Events, channel};
use crate::h1::ResponseHead;
use crate::h1::encode::write_request_head;
use crate::http::{Request, RequestBody, Response, Uri};
use crate::log::{debug, error, info, trace, warning};
use crate::rt;
use crate::socket::{Settled, Socket};
use crate::stream::{Direction, NetworkStream, StreamError};
use crate::timeout::{Timeout, TimeoutError};

mod context;
mod event;
mod options;
mod stats;

#[cfg(test)]
mod test;

pub use event::{ConnectionEvent, Failure, Phase, Progress};
pub use options::Options;
pub use stats::{DirectionStats, TransferStats};
pub(crate) use stats::Tally;

use context::{
    CloseContext, ConnectContext, ReceiveHeaderContext, SendBodyContext, SendHeaderContext,
};

/// Handle to a single HTTP/1.1 connection.
///
/// Clones refer to the same connection.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

struct Inner {
    uri: Uri,
    options: Options,
    socket: Arc<Socket>,
    shared: Arc<Shared>,
    busy: AtomicBool,
    events: Mutex<Option<Events<ConnectionEvent>>>,
}

/// State shared with body streams.
pub(crate) struct Shared {
    phase: Mutex<Phase>,
    stats: Mutex<TransferStats>,
    events: Emitter<ConnectionEvent>,
}

/// Why a phase stopped early.
enum Abort {
    TimedOut(Phase),
    Failed(Failure),
    /// The socket was closed by [`Connection::close_async`], which reports the outcome.
    Closed,
}

impl Abort {
    fn failed(message: &'static str) -> impl FnOnce(Error) -> Abort {
        move |err| Abort::Failed(Failure::new(message, err))
    }

    fn timer(err: TimeoutError) -> Abort {
        Abort::Failed(Failure::new("cannot start operation timer", err))
    }
}

impl Connection {
    /// Create new disconnected [`Connection`] to `uri`.
    pub fn new(uri: Uri, options: Options) -> Connection {
        let (tx, rx) = channel();
        Connection {
            inner: Arc::new(Inner {
                uri,
                options,
                socket: Arc::new(Socket::new(None)),
                shared: Arc::new(Shared {
                    phase: Mutex::new(Phase::Disconnected),
                    stats: Mutex::new(TransferStats::default()),
                    events: tx,
                }),
                busy: AtomicBool::new(false),
                events: Mutex::new(Some(rx)),
            }),
        }
    }

    /// Take the event stream.
    ///
    /// There is a single consumer, only the first call returns `Some`.
    pub fn events(&self) -> Option<Events<ConnectionEvent>> {
        lock(&self.inner.events).take()
    }

    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.inner.uri
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.inner.options
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.inner.shared.phase()
    }

    /// Returns `true` if the socket is open.
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.phase().is_connected()
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set_busy(&self, busy: bool) {
        self.inner.busy.store(busy, Ordering::Release);
    }

    /// Returns a snapshot of the byte counters.
    pub fn stats(&self) -> TransferStats {
        *lock(&self.inner.shared.stats)
    }
}

// ===== Operations =====

impl Connection {
    /// Start connecting.
    ///
    /// Reports [`ConnectionEvent::Connected`], [`ConnectionEvent::Error`] or
    /// [`ConnectionEvent::Timeout`].
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidState`] unless the connection is disconnected.
    pub fn connect_async(&self) -> Result<(), Error> {
        let handle = rt::handle()?;
        self.inner.shared.transition(Phase::Disconnected, Phase::Connecting)?;

        let options = &self.inner.options;
        let ctx = ConnectContext {
            host: self.inner.uri.host().to_owned(),
            port: self.inner.uri.port(),
            send_buffer_size: options.send_buffer_size(),
            receive_buffer_size: options.receive_buffer_size(),
            timeout: options.send_timeout(),
        };

        let inner = Arc::clone(&self.inner);
        handle.spawn(async move {
            let result = inner.connect(ctx).await;
            inner.finish(result);
        });
        Ok(())
    }

    /// Send `request` with an optional body, then receive the response head.
    ///
    /// A seekable body is measured and rewound, and its length is sent as `Content-Length`. A
    /// forward-only body requires the request to declare its length.
    ///
    /// Reports [`ConnectionEvent::Progress`] per packet, then [`ConnectionEvent::Complete`],
    /// [`ConnectionEvent::Error`] or [`ConnectionEvent::Timeout`].
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidTarget`] for an invalid request target,
    /// [`ErrorKind::MissingContentLength`] for a forward-only body without length, and
    /// [`ErrorKind::InvalidState`] unless the connection is connected and idle.
    pub fn send_request(&self, request: Request, body: Option<RequestBody>) -> Result<(), Error> {
        validate(&request, body.as_ref())?;
        let handle = rt::handle()?;
        self.inner.shared.transition(Phase::Connected, Phase::SendingHeaders)?;

        let inner = Arc::clone(&self.inner);
        handle.spawn(async move {
            let result = inner.exchange(request, body).await;
            inner.finish(result);
        });
        Ok(())
    }

    /// Start closing the socket.
    ///
    /// An operation in flight is abandoned. Reports [`ConnectionEvent::Disconnected`], or
    /// [`ConnectionEvent::Timeout`] if the graceful shutdown timed out.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidState`] if the connection is already closing or closed.
    pub fn close_async(&self) -> Result<(), Error> {
        let handle = rt::handle()?;
        self.inner.shared.begin_close()?;

        let ctx = CloseContext {
            timeout: self.inner.options.send_timeout(),
        };

        let inner = Arc::clone(&self.inner);
        handle.spawn(async move {
            inner.close(ctx).await;
        });
        Ok(())
    }
}

/// Checks that need no IO.
pub(crate) fn validate(request: &Request, body: Option<&RequestBody>) -> Result<(), Error> {
    let target = request.target();
    if target.is_empty() || !target.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(ErrorKind::InvalidTarget.into());
    }
    if let Some(body) = body {
        if !body.is_seekable() && request.content_length().is_none() {
            return Err(ErrorKind::MissingContentLength.into());
        }
    }
    Ok(())
}

// ===== Phases =====

impl Inner {
    async fn connect(&self, ctx: ConnectContext) -> Result<(), Abort> {
        info!("connecting to {}", self.uri);

        let mut io = self.socket.lock().await;
        if self.socket.is_closed() {
            return Err(Abort::Closed);
        }

        match self.socket.settle(ctx.timeout, ctx.open()).await.map_err(Abort::timer)? {
            Settled::Done(Ok(tcp)) => {
                *io = Some(tcp);
                drop(io);
                if !self.shared.advance(Phase::Connecting, Phase::Connected) {
                    return Err(Abort::Closed);
                }
                info!("connected to {}", self.uri);
                self.shared.emit(ConnectionEvent::Connected);
                Ok(())
            }
            Settled::Done(Err(err)) => Err(Abort::Failed(Failure::new(
                format!("connecting to {} failed", self.uri),
                err,
            ))),
            Settled::TimedOut => {
                self.socket.kill(&mut io);
                Err(Abort::TimedOut(Phase::Connecting))
            }
            Settled::Closed => Err(Abort::Closed),
        }
    }

    async fn exchange(&self, request: Request, body: Option<RequestBody>) -> Result<(), Abort> {
        let options = &self.options;

        let (body, content_len) = match body {
            Some(mut body) => {
                let len = match body.measure().await {
                    Ok(Some(len)) => len,
                    Ok(None) => request.content_length().unwrap_or(0),
                    Err(err) => {
                        return Err(Abort::Failed(Failure::new("cannot measure request body", err)));
                    }
                };
                (Some(body), Some(len))
            }
            None => (None, None),
        };

        let mut head = BytesMut::new();
        write_request_head(&request, &self.uri.host_header(), content_len, &mut head);
        debug!("{} {} ({} header bytes)", request.method(), request.target(), head.len());

        let head_len = head.len() as u64;
        self.shared.update(|stats| {
            stats.send.expect(head_len, content_len.unwrap_or(0));
        });

        let ctx = SendHeaderContext::new(
            head.freeze(),
            options.send_buffer_size(),
            options.send_timeout(),
        );
        self.send_headers(ctx).await?;

        let next = match body {
            Some(body) => {
                if !self.shared.advance(Phase::SendingHeaders, Phase::SendingBody) {
                    return Err(Abort::Closed);
                }
                let stream = NetworkStream::with_socket(
                    Arc::clone(&self.socket),
                    content_len.unwrap_or(0),
                    NetworkBuffer::empty(),
                    options.send_timeout(),
                )
                .map_err(|err| Abort::Failed(Failure::new("cannot create body stream", err)))?
                .with_chunk_size(options.send_buffer_size())
                .with_tally(Tally::new(Arc::clone(&self.shared), Direction::Upload));

                self.send_body(SendBodyContext { body, stream }).await?;
                Phase::SendingBody
            }
            None => Phase::SendingHeaders,
        };

        if !self.shared.advance(next, Phase::ReceivingHeaders) {
            return Err(Abort::Closed);
        }

        let ctx = ReceiveHeaderContext::new(options.receive_buffer_size(), options.receive_timeout());
        self.receive_head(ctx).await
    }

    async fn send_headers(&self, mut ctx: SendHeaderContext) -> Result<(), Abort> {
        let mut io = self.socket.lock().await;

        while let Some(chunk) = ctx.next_chunk() {
            let Some(tcp) = io.as_mut() else {
                return Err(Abort::Closed);
            };

            match self.socket.settle(ctx.timeout, tcp.write_all(&chunk)).await.map_err(Abort::timer)? {
                Settled::Done(Ok(())) => {
                    trace!("sent {} header bytes", chunk.len());
                    self.shared.record(Direction::Upload, chunk.len(), |stats| {
                        stats.add_headers(chunk.len())
                    });
                }
                Settled::Done(Err(err)) => {
                    return Err(Abort::failed("sending request headers failed")(err.into()));
                }
                Settled::TimedOut => {
                    self.socket.kill(&mut io);
                    return Err(Abort::TimedOut(Phase::SendingHeaders));
                }
                Settled::Closed => {
                    io.take();
                    return Err(Abort::Closed);
                }
            }
        }

        Ok(())
    }

    async fn send_body(&self, ctx: SendBodyContext) -> Result<(), Abort> {
        let SendBodyContext {
            mut body,
            mut stream,
        } = ctx;

        match stream.write_from(&mut body).await {
            Ok(_written) => {
                debug!("sent {_written} body bytes");
                Ok(())
            }
            Err(StreamError::TimedOut) => Err(Abort::TimedOut(Phase::SendingBody)),
            Err(StreamError::Closed) => Err(Abort::Closed),
            Err(err) => Err(Abort::failed("sending request body failed")(err.into())),
        }
    }

    async fn receive_head(&self, mut ctx: ReceiveHeaderContext) -> Result<(), Abort> {
        let head = loop {
            let mut io = self.socket.lock().await;
            let Some(tcp) = io.as_mut() else {
                return Err(Abort::Closed);
            };

            let read = match self
                .socket
                .settle(ctx.timeout, tcp.read(&mut ctx.scratch))
                .await
                .map_err(Abort::timer)?
            {
                Settled::Done(Ok(0)) => {
                    return Err(Abort::Failed(Failure::new(
                        "receiving response head failed",
                        ErrorKind::ConnectionClosed,
                    )));
                }
                Settled::Done(Ok(read)) => read,
                Settled::Done(Err(err)) => {
                    return Err(Abort::failed("receiving response head failed")(err.into()));
                }
                Settled::TimedOut => {
                    self.socket.kill(&mut io);
                    return Err(Abort::TimedOut(Phase::ReceivingHeaders));
                }
                Settled::Closed => {
                    io.take();
                    return Err(Abort::Closed);
                }
            };

            trace!("received {read} bytes");
            self.shared.record(Direction::Download, read, |stats| stats.add_headers(read));

            match ctx.feed(read) {
                ParseResult::Pending => continue,
                ParseResult::Ok(head) => break head,
                ParseResult::Err(err) => {
                    return Err(Abort::failed("invalid response head")(err.into()));
                }
            }
        };

        let parsed = ResponseHead::parse(&head.head)
            .map_err(|err| Abort::failed("invalid response head")(err.into()))?;
        let body_len = parsed
            .body_len()
            .map_err(|err| Abort::failed("unsupported response")(err.into()))?;

        let wire_len = head.wire_len as u64;
        let prepended = if body_len.is_some() { head.rest.len() as u64 } else { 0 };
        self.shared.update(|stats| {
            stats.receive.settle_headers(wire_len, prepended);
            stats.receive.expect(wire_len, body_len.unwrap_or(0));
        });

        let body = match body_len {
            Some(len) => {
                let stream = NetworkStream::with_socket(
                    Arc::clone(&self.socket),
                    len,
                    NetworkBuffer::from(head.rest),
                    self.options.receive_timeout(),
                )
                .map_err(|err| Abort::failed("invalid response body")(err.into()))?
                .with_chunk_size(self.options.receive_buffer_size())
                .with_tally(Tally::new(Arc::clone(&self.shared), Direction::Download));
                Some(stream)
            }
            None => {
                if !head.rest.is_empty() {
                    debug!("discarding {} bytes after a response without body", head.rest.len());
                }
                None
            }
        };

        if !self.shared.advance(Phase::ReceivingHeaders, Phase::ReceivingBody) {
            return Err(Abort::Closed);
        }

        info!("received {} {}", parsed.status, parsed.reason);
        let ResponseHead {
            version,
            status,
            reason,
            headers,
        } = parsed;
        self.shared.emit(ConnectionEvent::Complete(Response::new(
            version, status, reason, headers, body,
        )));
        Ok(())
    }

    async fn close(&self, ctx: CloseContext) {
        // wakes the operation in flight, if any, which drops the socket itself
        let Some(mut tcp) = self.socket.detach().await else {
            self.shared.set_phase(Phase::Closed);
            info!("disconnected from {}", self.uri);
            self.shared.emit(ConnectionEvent::Disconnected);
            return;
        };

        let (timer, expired) = match Timeout::expiring(ctx.timeout) {
            Ok(ok) => ok,
            Err(err) => {
                drop(tcp);
                self.shared.set_phase(Phase::Closed);
                self.shared.emit(ConnectionEvent::Error(Failure::new(
                    "cannot start operation timer",
                    err,
                )));
                return;
            }
        };

        let shutdown = tokio::select! {
            biased;
            result = tcp.shutdown() => Some(result),
            _ = expired => None,
        };
        drop(tcp);
        self.shared.set_phase(Phase::Closed);

        match shutdown {
            Some(result) if timer.stop() => match result {
                Ok(()) => {
                    info!("disconnected from {}", self.uri);
                    self.shared.emit(ConnectionEvent::Disconnected);
                }
                // peer already gone
                Err(err) if err.kind() == std::io::ErrorKind::NotConnected => {
                    self.shared.emit(ConnectionEvent::Disconnected);
                }
                Err(err) => {
                    error!("closing {} failed: {err}", self.uri);
                    self.shared.emit(ConnectionEvent::Error(Failure::new(
                        "closing connection failed",
                        err,
                    )));
                }
            },
            _ => {
                warning!("closing {} timed out", self.uri);
                self.shared.emit(ConnectionEvent::Timeout(Phase::Closing));
            }
        }
    }

    /// Report the outcome of a phase.
    fn finish(&self, result: Result<(), Abort>) {
        let abort = match result {
            Ok(()) => return,
            Err(Abort::Closed) => {
                trace!("operation abandoned, connection closed");
                return;
            }
            Err(abort) => abort,
        };

        self.socket.abort();
        if !self.shared.fail() {
            trace!("connection closing, dropping outcome");
            return;
        }

        match abort {
            Abort::TimedOut(phase) => {
                warning!("{} timed out while {phase}", self.uri);
                self.shared.emit(ConnectionEvent::Timeout(phase));
            }
            Abort::Failed(failure) => {
                error!("{}: {failure}", self.uri);
                self.shared.emit(ConnectionEvent::Error(failure));
            }
            Abort::Closed => {}
        }
    }
}

// ===== Shared =====

impl Shared {
    pub(crate) fn phase(&self) -> Phase {
        *lock(&self.phase)
    }

    fn set_phase(&self, phase: Phase) {
        *lock(&self.phase) = phase;
    }

    /// Move from `from` to `to`, or fail with the current phase.
    fn transition(&self, from: Phase, to: Phase) -> Result<(), Error> {
        let mut phase = lock(&self.phase);
        if *phase != from {
            return Err(ErrorKind::InvalidState(*phase).into());
        }
        *phase = to;
        Ok(())
    }

    /// Move from `from` to `to`, returns `false` if the phase changed meanwhile.
    pub(crate) fn advance(&self, from: Phase, to: Phase) -> bool {
        self.transition(from, to).is_ok()
    }

    fn begin_close(&self) -> Result<(), Error> {
        let mut phase = lock(&self.phase);
        match *phase {
            Phase::Closing | Phase::Closed => Err(ErrorKind::InvalidState(*phase).into()),
            _ => {
                *phase = Phase::Closing;
                Ok(())
            }
        }
    }

    /// Move to [`Phase::Closed`] after a timeout or failure.
    ///
    /// Returns `false` if a close is already in progress, which then reports the outcome.
    fn fail(&self) -> bool {
        let mut phase = lock(&self.phase);
        match *phase {
            Phase::Closing | Phase::Closed => false,
            _ => {
                *phase = Phase::Closed;
                true
            }
        }
    }

    pub(crate) fn emit(&self, event: ConnectionEvent) {
        // receiver dropped means unsubscribed
        let _ = self.events.send(event);
    }

    fn update<R>(&self, f: impl FnOnce(&mut TransferStats) -> R) -> R {
        f(&mut lock(&self.stats))
    }

    /// Count a packet and report progress.
    pub(crate) fn record(
        &self,
        direction: Direction,
        packet_size: usize,
        f: impl FnOnce(&mut DirectionStats),
    ) {
        let snapshot = self.update(|stats| {
            f(stats.direction_mut(direction));
            *stats
        });
        self.emit(ConnectionEvent::Progress(Progress::new(
            direction,
            packet_size,
            &snapshot,
        )));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("uri", &self.inner.uri)
            .field("phase", &self.phase())
            .field("busy", &self.is_busy())
            .finish()
    }
}
