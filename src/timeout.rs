//! One-shot cancellable timer.
//!
//! A [`Timeout`] guards exactly one asynchronous phase. The phase races its own completion against
//! the timer: whoever settles the shared state first wins, and the loser becomes a no-op.
//!
//! - [`Timeout::stop`] returns `true` only when it stopped a timer that had not fired yet, so the
//!   completion path knows it owns the outcome.
//! - the `on_timeout` callback runs only when the timer settles first, and at most once.
use std::fmt;
use std::pin::Pin;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering::{AcqRel, Acquire};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

use crate::rt;

#[cfg(test)]
mod test;

const PENDING: u8 = 0;
const STOPPED: u8 = 1;
const FIRED: u8 = 2;

/// Cancellable timer which invokes a callback once if not stopped first.
#[derive(Clone)]
pub struct Timeout {
    shared: Arc<Shared>,
}

struct Shared {
    state: AtomicU8,
    duration: Duration,
    task: Mutex<Option<AbortHandle>>,
}

impl Timeout {
    /// Start a countdown of `duration`, calling `on_timeout` on expiry.
    ///
    /// The callback runs on a timer task of the current runtime.
    ///
    /// # Errors
    ///
    /// Returns [`TimeoutError::ZeroDuration`] for an empty duration, and
    /// [`TimeoutError::NoRuntime`] when called outside of a tokio runtime.
    pub fn start<F>(duration: Duration, on_timeout: F) -> Result<Timeout, TimeoutError>
    where
        F: FnOnce() + Send + 'static,
    {
        if duration.is_zero() {
            return Err(TimeoutError::ZeroDuration);
        }
        let handle = rt::handle().map_err(|_| TimeoutError::NoRuntime)?;

        let shared = Arc::new(Shared {
            state: AtomicU8::new(PENDING),
            duration,
            task: Mutex::new(None),
        });

        let timer = Arc::clone(&shared);
        let task = handle.spawn(async move {
            tokio::time::sleep(timer.duration).await;
            if timer.settle(FIRED) {
                on_timeout();
            }
        });

        *shared.lock_task() = Some(task.abort_handle());

        Ok(Self { shared })
    }

    /// Start a countdown whose expiry resolves the returned [`Expired`] future.
    ///
    /// # Errors
    ///
    /// See [`Timeout::start`].
    pub fn expiring(duration: Duration) -> Result<(Timeout, Expired), TimeoutError> {
        let (tx, rx) = oneshot::channel();
        let timeout = Self::start(duration, move || {
            let _ = tx.send(());
        })?;
        Ok((timeout, Expired { rx, done: false }))
    }

    /// Stop the timer.
    ///
    /// Returns `true` if the timer was stopped before it fired. Returns `false` if it already
    /// fired or was already stopped, in which case this call does nothing.
    pub fn stop(&self) -> bool {
        if !self.shared.settle(STOPPED) {
            return false;
        }
        if let Some(task) = self.shared.lock_task().take() {
            task.abort();
        }
        true
    }

    /// Returns `true` if the timer fired.
    pub fn has_fired(&self) -> bool {
        self.shared.state.load(Acquire) == FIRED
    }

    /// Returns `true` if the timer was stopped before firing.
    pub fn is_stopped(&self) -> bool {
        self.shared.state.load(Acquire) == STOPPED
    }

    /// Returns the configured duration.
    pub fn duration(&self) -> Duration {
        self.shared.duration
    }
}

impl Shared {
    fn settle(&self, to: u8) -> bool {
        self.state.compare_exchange(PENDING, to, AcqRel, Acquire).is_ok()
    }

    fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<AbortHandle>> {
        self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.shared.state.load(Acquire) {
            PENDING => "pending",
            STOPPED => "stopped",
            _ => "fired",
        };
        f.debug_struct("Timeout")
            .field("duration", &self.shared.duration)
            .field("state", &state)
            .finish()
    }
}

// ===== Expired =====

/// Future that resolves when its [`Timeout`] fires.
///
/// If the timer is stopped instead, this future never resolves.
#[derive(Debug)]
pub struct Expired {
    rx: oneshot::Receiver<()>,
    done: bool,
}

impl Future for Expired {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let me = self.get_mut();
        if me.done {
            return Poll::Pending;
        }
        match Pin::new(&mut me.rx).poll(cx) {
            Poll::Ready(Ok(())) => {
                me.done = true;
                Poll::Ready(())
            }
            // timer stopped, the callback was dropped unsent
            Poll::Ready(Err(_)) => {
                me.done = true;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

// ===== Error =====

/// An error when starting a [`Timeout`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimeoutError {
    /// No tokio runtime is running on the calling thread.
    NoRuntime,
    /// Timeout duration is zero.
    ZeroDuration,
}

impl std::error::Error for TimeoutError { }

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRuntime => f.write_str("cannot start timer outside of a runtime"),
            Self::ZeroDuration => f.write_str("timeout duration cannot be zero"),
        }
    }
}
