use std::sync::Arc;

use crate::stream::Direction;

use super::{ConnectionEvent, Phase, Shared};

/// Byte counters of one direction.
///
/// Percent complete is known once both the header block length and the content length of the
/// direction are known, and is `0` before that.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirectionStats {
    headers: u64,
    content: u64,
    headers_total: Option<u64>,
    content_total: Option<u64>,
}

impl DirectionStats {
    /// Returns the header bytes transferred.
    #[inline]
    pub fn headers(&self) -> u64 {
        self.headers
    }

    /// Returns the content bytes transferred.
    #[inline]
    pub fn content(&self) -> u64 {
        self.content
    }

    /// Returns all bytes transferred.
    #[inline]
    pub fn total(&self) -> u64 {
        self.headers + self.content
    }

    /// Returns the expected total, once known.
    pub fn expected(&self) -> Option<u64> {
        Some(self.headers_total? + self.content_total?)
    }

    /// Returns the percentage of the expected total transferred.
    pub fn percent(&self) -> f64 {
        match self.expected() {
            Some(expected) if expected > 0 => {
                self.total().min(expected) as f64 * 100.0 / expected as f64
            }
            _ => 0.0,
        }
    }

    pub(crate) fn expect(&mut self, headers: u64, content: u64) {
        self.headers_total = Some(headers);
        self.content_total = Some(content);
    }

    pub(crate) fn add_headers(&mut self, bytes: usize) {
        self.headers += bytes as u64;
    }

    pub(crate) fn add_content(&mut self, bytes: usize) {
        self.content += bytes as u64;
    }

    /// Split the header bytes counted so far into header and content bytes.
    pub(crate) fn settle_headers(&mut self, headers: u64, content: u64) {
        self.headers = headers;
        self.content = content;
    }
}

/// Snapshot of a connection byte counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub send: DirectionStats,
    pub receive: DirectionStats,
}

impl TransferStats {
    pub(crate) fn direction_mut(&mut self, direction: Direction) -> &mut DirectionStats {
        match direction {
            Direction::Upload => &mut self.send,
            Direction::Download => &mut self.receive,
        }
    }
}

// ===== Tally =====

/// Link from a body stream back to the connection counters.
///
/// Body reads are driven by the response holder, so their timeouts are reported here.
pub(crate) struct Tally {
    shared: Arc<Shared>,
    direction: Direction,
}

impl Tally {
    pub(crate) fn new(shared: Arc<Shared>, direction: Direction) -> Self {
        Self { shared, direction }
    }

    pub(crate) fn record(&self, bytes: usize) {
        self.shared.record(self.direction, bytes, |stats| stats.add_content(bytes));
    }

    pub(crate) fn timed_out(&self) {
        if self.direction == Direction::Download
            && self.shared.advance(Phase::ReceivingBody, Phase::Closed)
        {
            self.shared.emit(ConnectionEvent::Timeout(Phase::ReceivingBody));
        }
    }
}
