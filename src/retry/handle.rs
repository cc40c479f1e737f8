//! Handle to a retry session running on its own tokio task.

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use super::state::SessionReport;

/// Returned by [`RetryDriver::spawn`](crate::RetryDriver::spawn).
///
/// Dropping the handle detaches the session; it keeps running until it ends on
/// its own. Call [`cancel`](Self::cancel) first to tear it down.
#[derive(Debug)]
pub struct SessionHandle {
    token: CancellationToken,
    join: JoinHandle<SessionReport>,
}

impl SessionHandle {
    pub(crate) fn new(token: CancellationToken, join: JoinHandle<SessionReport>) -> Self {
        Self { token, join }
    }

    /// Requests cancellation. The operation is not invoked again and any pending
    /// backoff wait is abandoned; the session then ends with `Outcome::Cancelled`
    /// (unless it already reached another terminal state).
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns a clone of the session's cancellation token.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Returns `true` once the session task has finished.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the session to end.
    ///
    /// # Errors
    /// Returns the [`JoinError`] if the session task panicked (for example, because
    /// the operation's `run` panicked).
    pub async fn join(self) -> Result<SessionReport, JoinError> {
        self.join.await
    }
}
