use std::fmt;
use std::sync::Arc;

use log::{debug, error, info, trace};

use crate::command_line::{shell_quote, shell_word};
use crate::{CommandLine, Communicator, CommunicatorError, Context, ExecError, RemoteCommand};

/// Where commands run.
#[derive(Clone, Default)]
pub enum Target {
    #[default]
    Local,
    /// A session the caller has already connected.
    Remote(Arc<dyn Communicator>),
}

impl Target {
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("Local"),
            Self::Remote(_) => f.write_str("Remote"),
        }
    }
}

/// A program bound to a target.
#[derive(Debug, Clone)]
pub struct Cli {
    target: Target,
    line: CommandLine,
}

impl Cli {
    #[must_use]
    pub fn new(target: Target, line: CommandLine) -> Self {
        Self { target, line }
    }

    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    #[must_use]
    pub fn line(&self) -> &CommandLine {
        &self.line
    }

    /// Prepare a script body to be passed as a single argument. A remote
    /// session re-parses the joined command line, so the body is quoted
    /// there; a local argv element already is one word.
    #[must_use]
    pub fn escape_script(&self, script: &str) -> String {
        match self.target {
            Target::Local => script.to_string(),
            Target::Remote(_) => shell_quote(script),
        }
    }

    /// Prepare a user-supplied argument. Remotely it is quoted unless it is
    /// a plain word; locally it is passed untouched.
    #[must_use]
    pub fn escape_arg(&self, arg: &str) -> String {
        match self.target {
            Target::Local => arg.to_string(),
            Target::Remote(_) => shell_word(arg),
        }
    }

    /// Run the program with `args` and return its output.
    ///
    /// Locally the output is stdout followed by stderr. Remotely it is the
    /// session's stdout; stderr is only kept for the error.
    ///
    /// # Errors
    /// Returns [`ExecError::CommandFailed`] on a non-zero exit, carrying the
    /// command line and what it printed, or a spawn, session, cancellation or
    /// deadline error.
    pub async fn execute(&self, ctx: &Context, args: &[String]) -> Result<String, ExecError> {
        let described = self.line.describe(args);
        info!("Executing: {described}");

        let result = match &self.target {
            Target::Local => self.execute_local(ctx, &described, args).await,
            Target::Remote(communicator) => {
                self.execute_remote(ctx, communicator.as_ref(), &described, args)
                    .await
            }
        };

        if let Err(err) = &result {
            error!("Command failed: {err}: {}", err.detail());
        }
        result
    }

    async fn execute_local(
        &self,
        ctx: &Context,
        described: &str,
        args: &[String],
    ) -> Result<String, ExecError> {
        let invocation = self.line.local_invocation(args);
        let mut cmd = installer_platform::captured_command(&invocation.program);
        cmd.args(&invocation.args).envs(invocation.env);

        let output = ctx
            .run(described, async {
                cmd.output()
                    .await
                    .map_err(|e| ExecError::spawn(described, &e))
            })
            .await?;

        debug!("Exit status: {:?}", output.status);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        trace!("stdout: {stdout}");
        if !stderr.is_empty() {
            trace!("stderr: {stderr}");
        }

        let combined = format!("{stdout}{stderr}");
        if output.status.success() {
            Ok(combined)
        } else {
            Err(ExecError::CommandFailed {
                command: described.to_string(),
                status: output.status.code(),
                output: combined,
                detail: stderr.into_owned(),
            })
        }
    }

    async fn execute_remote(
        &self,
        ctx: &Context,
        communicator: &dyn Communicator,
        described: &str,
        args: &[String],
    ) -> Result<String, ExecError> {
        let command = RemoteCommand::new(self.line.remote_command(args));
        let stdout = command.stdout.clone();
        let stderr = command.stderr.clone();

        let waited = ctx
            .run(described, async {
                let process = communicator
                    .start(command)
                    .await
                    .map_err(|e| ExecError::session("start", &e))?;
                Ok(process.wait().await)
            })
            .await?;

        let output = stdout.contents();
        trace!("stdout: {output}");
        if !stderr.is_empty() {
            trace!("stderr: {}", stderr.contents());
        }

        match waited {
            Ok(()) => Ok(output),
            Err(err) => {
                let (status, mut detail) = match err {
                    CommunicatorError::ExitStatus(code) => (Some(code), String::new()),
                    other => (None, other.to_string()),
                };
                let remote_stderr = stderr.contents();
                if !remote_stderr.is_empty() {
                    if !detail.is_empty() {
                        detail.push('\n');
                    }
                    detail.push_str(&remote_stderr);
                }
                Err(ExecError::CommandFailed {
                    command: described.to_string(),
                    status,
                    output,
                    detail,
                })
            }
        }
    }
}
