use std::time::Duration;

use crate::stream::DEFAULT_BUFFER_SIZE;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per connection transport options.
///
/// Buffer sizes are at least one byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    send_timeout: Duration,
    receive_timeout: Duration,
    send_buffer_size: usize,
    receive_buffer_size: usize,
}

impl Options {
    /// Create new [`Options`] with timeouts in milliseconds and buffer sizes in bytes.
    pub fn new(
        send_timeout_ms: u64,
        receive_timeout_ms: u64,
        send_buffer_size: usize,
        receive_buffer_size: usize,
    ) -> Self {
        Self {
            send_timeout: Duration::from_millis(send_timeout_ms),
            receive_timeout: Duration::from_millis(receive_timeout_ms),
            send_buffer_size: send_buffer_size.max(1),
            receive_buffer_size: receive_buffer_size.max(1),
        }
    }

    /// Timeout of connect, every send and close operation.
    #[inline]
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Timeout of every receive operation.
    #[inline]
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    #[inline]
    pub fn with_send_buffer_size(mut self, size: usize) -> Self {
        self.send_buffer_size = size.max(1);
        self
    }

    #[inline]
    pub fn with_receive_buffer_size(mut self, size: usize) -> Self {
        self.receive_buffer_size = size.max(1);
        self
    }

    #[inline]
    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    #[inline]
    pub fn receive_timeout(&self) -> Duration {
        self.receive_timeout
    }

    #[inline]
    pub fn send_buffer_size(&self) -> usize {
        self.send_buffer_size
    }

    #[inline]
    pub fn receive_buffer_size(&self) -> usize {
        self.receive_buffer_size
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            send_timeout: DEFAULT_TIMEOUT,
            receive_timeout: DEFAULT_TIMEOUT,
            send_buffer_size: DEFAULT_BUFFER_SIZE,
            receive_buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}
