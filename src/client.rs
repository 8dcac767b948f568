//! Request execution facade.
//!
//! [`Client::execute`] connects through a [`ConnectionManager`], sends the request once connected,
//! and relays every connection event to a [`Handler`].
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

use crate::conn::{self, Connection, ConnectionEvent, Failure, Options, Phase, Progress};
use crate::error::{Error, ErrorKind};
use crate::http::{Request, RequestBody, Response, Uri};
use crate::log::{debug, trace};
use crate::manager::{ConnectOutcome, Connected, Connecting, ConnectionManager};
use crate::rt;

/// Receives the outcome of [`Client::execute`].
///
/// Completion, timeout and error must be handled, otherwise the outcome of an exchange would be
/// lost.
pub trait Handler: Send + 'static {
    /// A packet was sent or received.
    fn on_progress(&mut self, progress: Progress) {
        let _ = progress;
    }

    /// Response head received, the body is read through the response.
    fn on_complete(&mut self, response: Response);

    /// A phase timed out, the connection is closed.
    fn on_timeout(&mut self, phase: Phase);

    /// A phase failed, the connection is closed.
    fn on_error(&mut self, failure: Failure);

    /// Connection closed by [`Client::close`].
    fn on_close(&mut self) { }
}

/// Event delivered by the channel [`Handler`].
#[derive(Debug)]
pub enum ClientEvent {
    Progress(Progress),
    Complete(Response),
    Timeout(Phase),
    Error(Failure),
    Close,
}

/// Forwards events into a channel.
///
/// # Panics
///
/// Panics if the receiver is dropped when a completion, timeout or error is delivered.
impl Handler for mpsc::UnboundedSender<ClientEvent> {
    fn on_progress(&mut self, progress: Progress) {
        let _ = self.send(ClientEvent::Progress(progress));
    }

    fn on_complete(&mut self, response: Response) {
        required(self.send(ClientEvent::Complete(response)), "on_complete");
    }

    fn on_timeout(&mut self, phase: Phase) {
        required(self.send(ClientEvent::Timeout(phase)), "on_timeout");
    }

    fn on_error(&mut self, failure: Failure) {
        required(self.send(ClientEvent::Error(failure)), "on_error");
    }

    fn on_close(&mut self) {
        let _ = self.send(ClientEvent::Close);
    }
}

fn required<T>(result: Result<(), mpsc::error::SendError<T>>, event: &str) {
    if result.is_err() {
        panic!("no subscriber for `{event}`");
    }
}

/// HTTP/1.1 client for a single endpoint.
///
/// Every [`execute`] opens a new connection, there is no reuse.
///
/// [`execute`]: Client::execute
#[derive(Debug)]
pub struct Client {
    uri: Uri,
    manager: ConnectionManager,
    current: Mutex<Option<Connection>>,
}

impl Client {
    /// Create new [`Client`] for `uri`.
    pub fn new(uri: Uri) -> Self {
        Self {
            uri,
            manager: ConnectionManager::new(),
            current: Mutex::new(None),
        }
    }

    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Execute `request`, reporting its outcome to `handler`.
    ///
    /// Returns once connecting started.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::MissingContentLength`] for a forward-only body without length,
    /// [`ErrorKind::InvalidTarget`] for an invalid request target, and [`ErrorKind::Runtime`] when
    /// called outside of a runtime.
    pub fn execute<H: Handler>(
        &self,
        request: Request,
        body: Option<RequestBody>,
        options: Options,
        handler: H,
    ) -> Result<(), Error> {
        conn::validate(&request, body.as_ref())?;

        let handle = rt::handle()?;
        let connecting = self.manager.get_connection(self.uri.clone(), options)?;
        self.set_current(connecting.connection().clone());

        handle.spawn(relay(connecting, request, body, handler));
        Ok(())
    }

    /// Close the current connection, if connected.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Runtime`] when called outside of a runtime.
    pub fn close(&self) -> Result<(), Error> {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner).clone();
        match current {
            Some(connection) if connection.is_connected() => match connection.close_async() {
                // lost the race against a timeout or failure, which already closed it
                Err(err) if matches!(err.kind(), ErrorKind::InvalidState(_)) => Ok(()),
                result => result,
            },
            _ => Ok(()),
        }
    }

    /// Returns `true` if the current connection is connected.
    pub fn is_connected(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(Connection::is_connected)
    }

    fn set_current(&self, connection: Connection) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(connection);
    }
}

async fn relay<H: Handler>(
    connecting: Connecting,
    request: Request,
    body: Option<RequestBody>,
    mut handler: H,
) {
    let Connected {
        connection,
        mut events,
    } = match connecting.await {
        ConnectOutcome::Connected(connected) => connected,
        ConnectOutcome::Failed { failure, .. } => return handler.on_error(failure),
        ConnectOutcome::TimedOut { .. } => return handler.on_timeout(Phase::Connecting),
        ConnectOutcome::Closed { .. } => return handler.on_close(),
    };

    if let Err(err) = connection.send_request(request, body) {
        return handler.on_error(Failure::new("cannot send request", err));
    }
    // the events stream ends once every handle and the response body are gone
    drop(connection);

    while let Some(event) = events.next().await {
        match event {
            ConnectionEvent::Progress(progress) => handler.on_progress(progress),
            ConnectionEvent::Complete(response) => {
                debug!("exchange complete, status {}", response.status());
                handler.on_complete(response);
            }
            ConnectionEvent::Timeout(phase) => {
                handler.on_timeout(phase);
                break;
            }
            ConnectionEvent::Error(failure) => {
                handler.on_error(failure);
                break;
            }
            ConnectionEvent::Disconnected => {
                handler.on_close();
                break;
            }
            ConnectionEvent::Connected => {}
        }
    }

    trace!("relay finished");
}
