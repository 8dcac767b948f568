//! Event delivery.
//!
//! Each producer owns the sending half of an unbounded channel, the consumer holds [`Events`].
//! Dropping [`Events`] unsubscribes, events sent afterwards are discarded.
use futures_core::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

pub(crate) type Emitter<E> = mpsc::UnboundedSender<E>;

pub(crate) fn channel<E>() -> (Emitter<E>, Events<E>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, Events { rx })
}

/// Stream of events from a single producer.
pub struct Events<E> {
    rx: mpsc::UnboundedReceiver<E>,
}

impl<E> Events<E> {
    /// Wait for the next event.
    ///
    /// Returns `None` once the producer is gone and every event was received.
    #[inline]
    pub async fn next(&mut self) -> Option<E> {
        self.rx.recv().await
    }

    /// Returns the next event if one is ready.
    #[inline]
    pub fn try_next(&mut self) -> Option<E> {
        self.rx.try_recv().ok()
    }
}

impl<E> Stream for Events<E> {
    type Item = E;

    #[inline]
    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl<E> std::fmt::Debug for Events<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Events").finish_non_exhaustive()
    }
}
