use std::collections::BTreeMap;

use async_trait::async_trait;
use installer_core::{
    FromTarget, Installer, InstallerError, InstallerKind, NamedVersion, PackageOptions,
    TypedInstalledProgramInfo, VersionFinder, absent_as_none, merge_environment,
};
use installer_exec::{Cli, CommandLine, Context, Target};
use log::{debug, info};

use crate::{DEFAULT_SUDO, DpkgVersionFinder, PROGRAM, SEPARATOR};

/// Never prompt, and wait for other dpkg frontends to release the lock
/// instead of failing.
const NON_INTERACTIVE_ARGS: [&str; 3] = ["-y", "-o", "DPkg::Lock::Timeout=-1"];

fn default_environment() -> BTreeMap<String, String> {
    BTreeMap::from([("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string())])
}

#[derive(Debug, Clone)]
pub struct AptInstaller {
    target: Target,
    finder: DpkgVersionFinder,
}

impl FromTarget for AptInstaller {
    fn from_target(target: Target) -> Self {
        Self {
            finder: DpkgVersionFinder::from_target(target.clone()),
            target,
        }
    }
}

impl AptInstaller {
    fn cli<O: PackageOptions + ?Sized>(&self, options: &O) -> Cli {
        let line = CommandLine::new(PROGRAM)
            .with_sudo(options.sudo().unwrap_or(DEFAULT_SUDO))
            .with_environment(merge_environment(
                &default_environment(),
                &options.environment(),
            ));
        Cli::new(self.target.clone(), line)
    }

    async fn apt_get<O: PackageOptions + ?Sized>(
        &self,
        ctx: &Context,
        options: &O,
        action: &str,
    ) -> Result<(), InstallerError> {
        let package = NamedVersion::from_strings(SEPARATOR, options.name(), options.version())?;

        let mut args: Vec<String> = NON_INTERACTIVE_ARGS.iter().map(ToString::to_string).collect();
        args.push(action.to_string());
        args.push(package.to_string());

        self.cli(options).execute(ctx, &args).await?;
        info!("apt-get {action} {package} finished");
        Ok(())
    }
}

#[async_trait]
impl<O> Installer<O> for AptInstaller
where
    O: PackageOptions + ?Sized,
{
    fn kind(&self) -> InstallerKind {
        InstallerKind::Apt
    }

    async fn install(&self, ctx: &Context, options: &O) -> Result<(), InstallerError> {
        self.apt_get(ctx, options, "install").await
    }

    async fn find_installed(
        &self,
        ctx: &Context,
        options: &O,
    ) -> Result<Option<TypedInstalledProgramInfo>, InstallerError> {
        let info = self.finder.find_installed(ctx, options).await?;
        Ok(Some(info.typed(InstallerKind::Apt)))
    }

    async fn uninstall(&self, ctx: &Context, options: &O) -> Result<bool, InstallerError> {
        let found = absent_as_none(<Self as Installer<O>>::find_installed(self, ctx, options).await)?;
        if found.is_none() {
            debug!("{} is not installed, nothing to remove", options.name());
            return Ok(false);
        }

        self.apt_get(ctx, options, "remove").await?;
        Ok(true)
    }
}
