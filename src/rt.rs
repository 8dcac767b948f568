//! Runtime integration.
//!
//! Every asynchronous operation in this crate is issued by spawning a task on the tokio runtime
//! the caller is running in. Reaching a runtime is fallible: calling an operation from a plain
//! thread returns [`RuntimeError`] instead of panicking inside `tokio::spawn`.
use std::fmt;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Returns the handle of the runtime the caller is running in.
pub(crate) fn handle() -> Result<Handle, RuntimeError> {
    Handle::try_current().map_err(|_| RuntimeError { _priv: () })
}

/// Spawn `future` on the current runtime.
pub(crate) fn spawn<F>(future: F) -> Result<JoinHandle<F::Output>, RuntimeError>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    Ok(handle()?.spawn(future))
}

// ===== Error =====

/// No tokio runtime is reachable from the calling thread.
#[derive(Clone, PartialEq, Eq)]
pub struct RuntimeError {
    _priv: (),
}

impl std::error::Error for RuntimeError { }

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no tokio runtime is running")
    }
}

impl fmt::Debug for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RuntimeError")
    }
}
