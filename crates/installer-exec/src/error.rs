use thiserror::Error;

use crate::CommunicatorError;

fn exit_text(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("with status {code}"),
        None => "without an exit code".to_string(),
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("`{command}` exited {}", exit_text(*.status))]
    CommandFailed {
        command: String,
        status: Option<i32>,
        output: String,
        detail: String,
    },

    #[error("failed to start `{command}`: {message}")]
    Spawn {
        command: String,
        kind: std::io::ErrorKind,
        message: String,
    },

    #[error("remote session {stage} failed: {details}")]
    Session { stage: &'static str, details: String },

    #[error("`{command}` was cancelled")]
    Cancelled { command: String },

    #[error("`{command}` did not finish before the deadline")]
    TimedOut { command: String },
}

impl ExecError {
    pub(crate) fn spawn(command: &str, error: &std::io::Error) -> Self {
        Self::Spawn {
            command: command.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    #[must_use]
    pub fn session(stage: &'static str, error: &CommunicatorError) -> Self {
        Self::Session {
            stage,
            details: error.to_string(),
        }
    }

    /// The captured output and stderr of a failed command, joined for display.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::CommandFailed { output, detail, .. } => {
                let output = output.trim_end();
                let detail = detail.trim_end();
                match (output.is_empty(), detail.is_empty()) {
                    (_, true) => output.to_string(),
                    (true, false) => detail.to_string(),
                    (false, false) if output.contains(detail) => output.to_string(),
                    (false, false) => format!("{output}\n{detail}"),
                }
            }
            Self::Spawn { message, .. } => message.clone(),
            Self::Session { details, .. } => details.clone(),
            Self::Cancelled { .. } | Self::TimedOut { .. } => String::new(),
        }
    }

    /// Whether the captured output or stderr of a failed command contains
    /// `needle`. Used to recognise package-manager messages such as
    /// "is not installed".
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        match self {
            Self::CommandFailed { output, detail, .. } => {
                output.contains(needle) || detail.contains(needle)
            }
            _ => false,
        }
    }
}
