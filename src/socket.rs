//! Per-socket lock.
//!
//! Every socket operation, from any phase or body stream, locks [`Socket`] first and holds the
//! guard until it completes, so no two operations are in flight on one socket.
//!
//! A socket is closed at most once. Closing wakes the operation currently holding the guard, which
//! then drops the stream itself.
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, MutexGuard, watch};

use crate::log::{debug, trace};
use crate::timeout::{Expired, Timeout, TimeoutError};

pub(crate) type SocketGuard<'a> = MutexGuard<'a, Option<TcpStream>>;

pub(crate) struct Socket {
    io: Mutex<Option<TcpStream>>,
    closed: watch::Sender<bool>,
}

/// Outcome of a socket operation raced against its timer.
pub(crate) enum Settled<T> {
    Done(T),
    /// The timer won, the operation result, if any, was discarded.
    TimedOut,
    /// The socket was closed while the operation was in flight.
    Closed,
}

impl Socket {
    pub(crate) fn new(tcp: Option<TcpStream>) -> Self {
        Self {
            io: Mutex::new(tcp),
            closed: watch::Sender::new(false),
        }
    }

    #[inline]
    pub(crate) async fn lock(&self) -> SocketGuard<'_> {
        self.io.lock().await
    }

    #[inline]
    pub(crate) fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once the socket is closed.
    pub(crate) async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        // the sender lives as long as `self`
        let _ = rx.wait_for(|closed| *closed).await;
    }

    /// Close the socket held by `io`.
    pub(crate) fn kill(&self, io: &mut SocketGuard<'_>) {
        self.closed.send_replace(true);
        if io.take().is_some() {
            debug!("socket closed");
        }
    }

    /// Close the socket without waiting for the lock.
    ///
    /// If an operation holds the lock, it observes the close and drops the stream.
    pub(crate) fn abort(&self) {
        self.closed.send_replace(true);
        if let Ok(mut io) = self.io.try_lock() {
            if io.take().is_some() {
                debug!("socket aborted");
            }
        }
    }

    /// Mark the socket closed and take the stream out of it, waiting for the in-flight operation.
    pub(crate) async fn detach(&self) -> Option<TcpStream> {
        self.closed.send_replace(true);
        self.io.lock().await.take()
    }

    /// Race `io` against a fresh timer of `duration` and against closing of the socket.
    ///
    /// The timer is stopped before this returns, and exactly one of completion or expiry wins.
    pub(crate) async fn settle<F>(
        &self,
        duration: Duration,
        io: F,
    ) -> Result<Settled<F::Output>, TimeoutError>
    where
        F: Future,
    {
        let (timer, expired) = Timeout::expiring(duration)?;
        Ok(self.race(&timer, expired, io).await)
    }

    async fn race<F>(&self, timer: &Timeout, expired: Expired, io: F) -> Settled<F::Output>
    where
        F: Future,
    {
        let settled = tokio::select! {
            biased;
            output = io => Settled::Done(output),
            _ = expired => Settled::TimedOut,
            _ = self.closed() => Settled::Closed,
        };

        match settled {
            Settled::Done(output) => {
                if timer.stop() {
                    Settled::Done(output)
                } else {
                    trace!("completion lost the race against its timer");
                    Settled::TimedOut
                }
            }
            Settled::TimedOut => Settled::TimedOut,
            Settled::Closed => {
                timer.stop();
                Settled::Closed
            }
        }
    }
}

impl std::fmt::Debug for Socket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Socket")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
