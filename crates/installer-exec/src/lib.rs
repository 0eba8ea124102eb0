//! Command execution against the local machine or a remote session.
//!
//! Every package-manager invocation goes through [`Cli::execute`], which
//! renders a [`CommandLine`] for the selected [`Target`] and runs it under a
//! [`Context`] so callers can cancel it or bound it with a deadline.

mod cli;
mod command_line;
mod communicator;
mod context;
mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use cli::{Cli, Target};
pub use command_line::{
    CommandLine, LocalInvocation, PARAM_SEPARATOR, env_assignment, shell_quote, shell_word,
};
pub use communicator::{Communicator, CommunicatorError, OutputSink, RemoteCommand, RemoteProcess};
pub use context::Context;
pub use error::ExecError;
