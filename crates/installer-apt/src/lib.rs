//! Debian packages: `apt-get` for changes, `dpkg` for discovery.

mod dpkg;
mod installer;

pub use dpkg::DpkgVersionFinder;
pub use installer::AptInstaller;

/// Between package name and version, as in `nginx=1.18.0-6ubuntu14.3`.
pub const SEPARATOR: &str = "=";
pub const PROGRAM: &str = "apt-get";
pub const DEFAULT_SUDO: bool = true;
