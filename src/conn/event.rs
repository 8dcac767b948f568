use std::fmt;

use crate::error::Error;
use crate::http::Response;
use crate::stream::Direction;

use super::TransferStats;

/// Connection lifecycle notification.
#[derive(Debug)]
pub enum ConnectionEvent {
    /// Socket connected.
    Connected,
    /// A packet was sent or received.
    Progress(Progress),
    /// Response head received.
    Complete(Response),
    /// A phase timed out, the socket is closed.
    Timeout(Phase),
    /// A phase failed, the socket is closed.
    Error(Failure),
    /// Socket closed by [`Connection::close_async`].
    ///
    /// [`Connection::close_async`]: super::Connection::close_async
    Disconnected,
}

/// Connection phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Disconnected,
    Connecting,
    Connected,
    SendingHeaders,
    SendingBody,
    ReceivingHeaders,
    /// Response delivered, its body, if any, is read through the response.
    ReceivingBody,
    Closing,
    Closed,
}

impl Phase {
    /// Returns `true` if the socket is open.
    pub fn is_connected(&self) -> bool {
        matches!(
            self,
            Self::Connected
                | Self::SendingHeaders
                | Self::SendingBody
                | Self::ReceivingHeaders
                | Self::ReceivingBody
        )
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::SendingHeaders => "sending headers",
            Self::SendingBody => "sending body",
            Self::ReceivingHeaders => "receiving headers",
            Self::ReceivingBody => "receiving body",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transfer progress of a single packet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    pub direction: Direction,
    pub packet_size: usize,
    pub send_percent: f64,
    pub receive_percent: f64,
}

impl Progress {
    pub(crate) fn new(direction: Direction, packet_size: usize, stats: &TransferStats) -> Self {
        Self {
            direction,
            packet_size,
            send_percent: stats.send.percent(),
            receive_percent: stats.receive.percent(),
        }
    }
}

/// A failed phase, with a human readable message and its cause.
#[derive(Debug)]
pub struct Failure {
    message: String,
    error: Error,
}

impl Failure {
    pub(crate) fn new(message: impl Into<String>, error: impl Into<Error>) -> Self {
        Self {
            message: message.into(),
            error: error.into(),
        }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn error(&self) -> &Error {
        &self.error
    }

    #[inline]
    pub fn into_error(self) -> Error {
        self.error
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.error)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
