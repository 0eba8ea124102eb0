//! Homebrew formulae and casks.

mod finder;
mod info;
mod installer;

pub use finder::BrewVersionFinder;
pub use installer::BrewInstaller;

/// Between formula name and version, as in `python@3.11`.
pub const SEPARATOR: &str = "@";
pub const PROGRAM: &str = "brew";
pub const DEFAULT_SUDO: bool = false;

const CASK_FLAG: &str = "--cask";
