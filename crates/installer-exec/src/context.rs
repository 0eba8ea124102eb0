use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::ExecError;

/// Cancellation and deadline scope for one lifecycle operation.
///
/// Contexts form a tree: [`Context::with_timeout`] derives a child that is
/// cancelled together with its parent and never outlives the parent's
/// deadline.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Tie a context to a token owned by the caller.
    #[must_use]
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancel: token,
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current <= deadline => current,
            _ => deadline,
        };
        Self {
            cancel: self.cancel.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drive `work` to completion unless the context is cancelled or its
    /// deadline passes first. The losing future is dropped, which kills a
    /// local child process spawned with `kill_on_drop`.
    ///
    /// # Errors
    /// Returns [`ExecError::Cancelled`] or [`ExecError::TimedOut`] naming
    /// `command`, or whatever error `work` produced.
    pub async fn run<T, F>(&self, command: &str, work: F) -> Result<T, ExecError>
    where
        F: Future<Output = Result<T, ExecError>>,
    {
        if self.is_cancelled() {
            return Err(ExecError::Cancelled {
                command: command.to_string(),
            });
        }

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                debug!("Cancelled while running: {command}");
                Err(ExecError::Cancelled { command: command.to_string() })
            }
            () = expired => {
                debug!("Deadline passed while running: {command}");
                Err(ExecError::TimedOut { command: command.to_string() })
            }
            result = work => result,
        }
    }
}
