/// Transfer direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Request bytes, sent to the peer.
    Upload,
    /// Response bytes, received from the peer.
    Download,
}

/// Body transfer notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A read or write transferred `bytes`.
    Progress { direction: Direction, bytes: usize },
    /// Read to end finished with the whole body.
    ReadToEnd(String),
    /// Copy finished after writing `bytes` into the destination.
    CopiedTo { bytes: u64 },
    /// The write reached the declared content length.
    Written { bytes: u64 },
    /// An asynchronous operation timed out, the socket is closed.
    Timeout,
    /// An asynchronous operation failed.
    Error(String),
}
