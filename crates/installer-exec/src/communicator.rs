use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommunicatorError {
    #[error("communicator is not connected")]
    NotConnected,

    #[error("remote command exited with status {0}")]
    ExitStatus(i32),

    #[error("{0}")]
    Transport(String),
}

/// Shared byte buffer a remote command writes its stdout or stderr into.
/// Clones refer to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct OutputSink(Arc<Mutex<Vec<u8>>>);

impl OutputSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, decoded lossily.
    #[must_use]
    pub fn contents(&self) -> String {
        let buffer = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl io::Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A command line handed to a remote session, with the sinks its output
/// streams are copied into.
#[derive(Debug, Clone)]
pub struct RemoteCommand {
    pub command: String,
    pub stdout: OutputSink,
    pub stderr: OutputSink,
}

impl RemoteCommand {
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            stdout: OutputSink::new(),
            stderr: OutputSink::new(),
        }
    }
}

/// A remote session (SSH, `WinRM`, ...). Transport and authentication live
/// behind this trait; the controller only connects, starts commands and
/// disconnects.
#[async_trait]
pub trait Communicator: Send + Sync {
    async fn connect(&self) -> Result<(), CommunicatorError>;

    async fn disconnect(&self) -> Result<(), CommunicatorError>;

    /// Start `command` without waiting for it. Output is written to the
    /// command's sinks as it arrives.
    async fn start(&self, command: RemoteCommand)
    -> Result<Box<dyn RemoteProcess>, CommunicatorError>;
}

/// A started remote command.
#[async_trait]
pub trait RemoteProcess: Send {
    /// Wait for the command to exit. A non-zero exit is reported as
    /// [`CommunicatorError::ExitStatus`].
    async fn wait(self: Box<Self>) -> Result<(), CommunicatorError>;
}
