//! Abort-on-drop ownership of spawned upstream tasks.

use std::fmt::{Debug, Formatter};
use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// Owns one spawned task. Dropping the guard aborts the task if it is still running.
pub(crate) struct TaskGuard {
    abort: AbortHandle,
}

impl TaskGuard {
    /// Spawns `future` on `runtime` and returns the guard owning it.
    pub(crate) fn spawn<F>(runtime: &Handle, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let join = runtime.spawn(future);
        Self {
            abort: join.abort_handle(),
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

impl Debug for TaskGuard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGuard")
            .field("finished", &self.abort.is_finished())
            .finish()
    }
}
