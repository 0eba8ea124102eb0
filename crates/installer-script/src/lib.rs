//! Programs managed by user-supplied shell scripts.

mod action;
mod installer;
mod report;

pub use action::Action;
pub use installer::ScriptInstaller;

pub const SEPARATOR: &str = "=";
pub const DEFAULT_SHELL: &str = "sh";
pub const DEFAULT_ARGS: [&str; 1] = ["-c"];
pub const DEFAULT_SUDO: bool = false;
