//! Connection factory.
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

use crate::conn::{Connection, ConnectionEvent, Failure, Options};
use crate::error::{Error, ErrorKind};
use crate::event::Events;
use crate::http::Uri;
use crate::log::debug;
use crate::rt;

/// Creates connections and starts connecting them.
#[derive(Clone, Debug, Default)]
pub struct ConnectionManager {
    _priv: (),
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self { _priv: () }
    }

    /// Create a busy [`Connection`] to `uri` and start connecting it.
    ///
    /// The returned [`Connecting`] gives access to the connection immediately, and resolves once
    /// the connect attempt finished.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Runtime`] when called outside of a runtime.
    pub fn get_connection(&self, uri: Uri, options: Options) -> Result<Connecting, Error> {
        let connection = Connection::new(uri, options);
        connection.set_busy(true);

        let Some(events) = connection.events() else {
            return Err(ErrorKind::InvalidState(connection.phase()).into());
        };

        // a rejected connect leaves no watcher behind
        connection.connect_async()?;

        let (tx, rx) = oneshot::channel();
        rt::spawn(watch(connection.clone(), events, tx))?;

        Ok(Connecting { connection, rx })
    }
}

/// Wait for the first connect outcome, then hand the event stream over.
async fn watch(
    connection: Connection,
    mut events: Events<ConnectionEvent>,
    tx: oneshot::Sender<ConnectOutcome>,
) {
    enum First {
        Connected,
        Failed(Failure),
        TimedOut,
        Closed,
    }

    let first = loop {
        match events.next().await {
            Some(ConnectionEvent::Connected) => break First::Connected,
            Some(ConnectionEvent::Error(failure)) => break First::Failed(failure),
            Some(ConnectionEvent::Timeout(_)) => break First::TimedOut,
            // closed before the connect settled
            Some(ConnectionEvent::Disconnected) => break First::Closed,
            Some(_) => continue,
            None => return,
        }
    };

    let outcome = match first {
        First::Connected => ConnectOutcome::Connected(Connected { connection, events }),
        First::Failed(failure) => ConnectOutcome::Failed {
            connection,
            failure,
        },
        First::TimedOut => ConnectOutcome::TimedOut { connection },
        First::Closed => ConnectOutcome::Closed { connection },
    };

    if tx.send(outcome).is_err() {
        debug!("connect outcome dropped, nobody is waiting");
    }
}

/// Connect attempt in progress.
#[derive(Debug)]
pub struct Connecting {
    connection: Connection,
    rx: oneshot::Receiver<ConnectOutcome>,
}

impl Connecting {
    /// Returns the connection being connected.
    #[inline]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

impl Future for Connecting {
    type Output = ConnectOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let me = self.get_mut();
        match Pin::new(&mut me.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // watcher is gone with the runtime
            Poll::Ready(Err(_)) => Poll::Ready(ConnectOutcome::Failed {
                connection: me.connection.clone(),
                failure: Failure::new(
                    "connect watcher stopped",
                    ErrorKind::InvalidState(me.connection.phase()),
                ),
            }),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Outcome of a connect attempt.
#[derive(Debug)]
pub enum ConnectOutcome {
    Connected(Connected),
    Failed {
        connection: Connection,
        failure: Failure,
    },
    TimedOut {
        connection: Connection,
    },
    /// The connection was closed before connecting finished.
    Closed {
        connection: Connection,
    },
}

impl ConnectOutcome {
    /// Returns the connection, whatever the outcome.
    pub fn connection(&self) -> &Connection {
        match self {
            Self::Connected(connected) => &connected.connection,
            Self::Failed { connection, .. }
            | Self::TimedOut { connection }
            | Self::Closed { connection } => connection,
        }
    }
}

/// Connected connection with the rest of its event stream.
#[derive(Debug)]
pub struct Connected {
    pub connection: Connection,
    pub events: Events<ConnectionEvent>,
}
