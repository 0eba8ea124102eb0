use std::collections::BTreeMap;

use async_trait::async_trait;
use installer_exec::{Context, Target};

use crate::error::InstallerError;
use crate::types::{InstalledProgramInfo, InstallerKind, TypedInstalledProgramInfo, VersionFinderKind};

/// Settings every installer reads from a declared record.
pub trait InstallerOptions: Send + Sync {
    /// `None` leaves the choice to the installer's default.
    fn sudo(&self) -> Option<bool>;

    fn environment(&self) -> BTreeMap<String, String>;
}

/// A record naming a package, with or without a version.
pub trait PackageOptions: InstallerOptions {
    /// May embed a version after the installer's separator.
    fn name(&self) -> &str;

    fn version(&self) -> Option<&str>;
}

pub trait BrewOptions: PackageOptions {
    fn cask(&self) -> bool;
}

pub trait ScriptOptions: InstallerOptions {
    /// Identifier reported as the name of what the scripts manage.
    fn id(&self) -> &str;

    /// Executable whose presence means the program is installed.
    fn path(&self) -> Option<&str>;

    fn shell(&self) -> Option<&str>;

    /// Arguments between the shell and the script. `None` keeps the default.
    fn default_args(&self) -> Option<&[String]>;

    fn install_script(&self) -> Option<&str>;

    fn find_installed_script(&self) -> Option<&str>;

    fn uninstall_script(&self) -> Option<&str>;

    /// Shared fallback for actions without a dedicated script. It receives
    /// the action name as the first word after the script, which `sh -c`
    /// binds to `$0`.
    fn default_script(&self) -> Option<&str>;

    fn additional_args(&self) -> &[String];
}

/// One package manager's install/probe/remove operations for records
/// exposing `O`.
///
/// Absence is not a failure: `find_installed` reports it as `Ok(None)` or as
/// one of the sentinel errors (see [`InstallerError::is_absent`]), and
/// `uninstall` of an absent program returns `Ok(false)`.
#[async_trait]
pub trait Installer<O: ?Sized + Sync>: Send + Sync {
    fn kind(&self) -> InstallerKind;

    async fn install(&self, ctx: &Context, options: &O) -> Result<(), InstallerError>;

    async fn find_installed(
        &self,
        ctx: &Context,
        options: &O,
    ) -> Result<Option<TypedInstalledProgramInfo>, InstallerError>;

    /// Returns whether something was removed.
    async fn uninstall(&self, ctx: &Context, options: &O) -> Result<bool, InstallerError>;
}

/// Installers and finders run their commands on the target they are built
/// for.
pub trait FromTarget {
    fn from_target(target: Target) -> Self;
}

/// Package-metadata probe used by the package-manager installers.
#[async_trait]
pub trait VersionFinder<O: ?Sized + Sync>: Send + Sync {
    fn kind(&self) -> VersionFinderKind;

    /// # Errors
    /// [`InstallerError::NotInstalled`] when the package is missing and
    /// [`InstallerError::VersionMismatch`] when a different version than the
    /// requested one is installed.
    async fn find_installed(
        &self,
        ctx: &Context,
        options: &O,
    ) -> Result<InstalledProgramInfo, InstallerError>;
}
