//! An in-memory [`Communicator`] for tests of code that runs commands
//! remotely. Enabled by the `test-support` feature.

use std::collections::VecDeque;
use std::io::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::{Communicator, CommunicatorError, RemoteCommand, RemoteProcess, Target};

/// What the fake host prints and how it exits for one command.
#[derive(Debug, Clone, Copy)]
pub struct Reply {
    pub exit: i32,
    pub stdout: &'static str,
    pub stderr: &'static str,
}

impl Reply {
    #[must_use]
    pub fn ok(stdout: &'static str) -> Self {
        Self {
            exit: 0,
            stdout,
            stderr: "",
        }
    }

    #[must_use]
    pub fn fail(exit: i32, stderr: &'static str) -> Self {
        Self {
            exit,
            stdout: "",
            stderr,
        }
    }
}

struct Exited(i32);

#[async_trait]
impl RemoteProcess for Exited {
    async fn wait(self: Box<Self>) -> Result<(), CommunicatorError> {
        match self.0 {
            0 => Ok(()),
            code => Err(CommunicatorError::ExitStatus(code)),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum ConnectBehaviour {
    #[default]
    Accept,
    Refuse,
    Stall,
}

/// A remote host answering commands by prefix and remembering what it was
/// asked to run. Replies queued for the same prefix are used in order; the
/// last one keeps answering. Unmatched commands succeed silently.
#[derive(Default)]
pub struct FakeHost {
    replies: Mutex<Vec<(&'static str, VecDeque<Reply>)>>,
    commands: Mutex<Vec<String>>,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
    connect: ConnectBehaviour,
    fail_disconnect: bool,
}

impl FakeHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn reply(self, prefix: &'static str, reply: Reply) -> Self {
        {
            let mut replies = self.replies.lock().unwrap_or_else(PoisonError::into_inner);
            match replies.iter_mut().find(|(known, _)| *known == prefix) {
                Some((_, queue)) => queue.push_back(reply),
                None => replies.push((prefix, VecDeque::from([reply]))),
            }
        }
        self
    }

    #[must_use]
    pub fn refusing_connections(mut self) -> Self {
        self.connect = ConnectBehaviour::Refuse;
        self
    }

    /// Connects never complete.
    #[must_use]
    pub fn stalling_connections(mut self) -> Self {
        self.connect = ConnectBehaviour::Stall;
        self
    }

    #[must_use]
    pub fn failing_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    fn next_reply(&self, command: &str) -> Reply {
        let mut replies = self.replies.lock().unwrap_or_else(PoisonError::into_inner);
        let Some((_, queue)) = replies
            .iter_mut()
            .find(|(prefix, _)| command.starts_with(prefix))
        else {
            return Reply::ok("");
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap_or(Reply::ok(""))
        } else {
            queue.front().copied().unwrap_or(Reply::ok(""))
        }
    }
}

#[async_trait]
impl Communicator for FakeHost {
    async fn connect(&self) -> Result<(), CommunicatorError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match self.connect {
            ConnectBehaviour::Accept => Ok(()),
            ConnectBehaviour::Refuse => Err(CommunicatorError::Transport(
                "dial tcp 10.0.0.5:22: connection refused".to_string(),
            )),
            ConnectBehaviour::Stall => std::future::pending().await,
        }
    }

    async fn disconnect(&self) -> Result<(), CommunicatorError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.fail_disconnect {
            return Err(CommunicatorError::Transport("broken pipe".to_string()));
        }
        Ok(())
    }

    async fn start(
        &self,
        mut command: RemoteCommand,
    ) -> Result<Box<dyn RemoteProcess>, CommunicatorError> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command.command.clone());

        let reply = self.next_reply(&command.command);
        let written = command
            .stdout
            .write_all(reply.stdout.as_bytes())
            .and_then(|()| command.stderr.write_all(reply.stderr.as_bytes()));
        written.map_err(|err| CommunicatorError::Transport(err.to_string()))?;
        Ok(Box::new(Exited(reply.exit)))
    }
}

/// A target that runs everything on `host`.
#[must_use]
pub fn remote(host: &Arc<FakeHost>) -> Target {
    Target::Remote(host.clone())
}
