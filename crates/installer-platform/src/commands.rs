use std::process::Stdio;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Suppresses the console window a child process would otherwise open on
/// Windows. A no-op elsewhere.
pub trait HideWindow {
    fn hide_window(&mut self) -> &mut Self;
}

impl HideWindow for tokio::process::Command {
    #[cfg(windows)]
    fn hide_window(&mut self) -> &mut Self {
        self.creation_flags(CREATE_NO_WINDOW)
    }

    #[cfg(not(windows))]
    fn hide_window(&mut self) -> &mut Self {
        self
    }
}

/// Prepares a child process for captured, non-interactive execution.
///
/// Stdin is closed so package managers never block on a prompt, both output
/// streams are piped, and the child is killed when the handle is dropped so
/// an abandoned wait does not leave it running.
#[must_use]
pub fn captured_command(program: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(program);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .hide_window();
    cmd
}
