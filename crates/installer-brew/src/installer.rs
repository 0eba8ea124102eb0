use async_trait::async_trait;
use installer_core::{
    BrewOptions, FromTarget, Installer, InstallerError, InstallerKind, NamedVersion,
    TypedInstalledProgramInfo, VersionFinder, absent_as_none,
};
use installer_exec::{Cli, CommandLine, Context, Target};
use log::{debug, info};

use crate::{BrewVersionFinder, CASK_FLAG, DEFAULT_SUDO, PROGRAM, SEPARATOR};

#[derive(Debug, Clone)]
pub struct BrewInstaller {
    target: Target,
    finder: BrewVersionFinder,
}

impl FromTarget for BrewInstaller {
    fn from_target(target: Target) -> Self {
        Self {
            finder: BrewVersionFinder::from_target(target.clone()),
            target,
        }
    }
}

impl BrewInstaller {
    async fn brew<O: BrewOptions + ?Sized>(
        &self,
        ctx: &Context,
        options: &O,
        action: &str,
    ) -> Result<(), InstallerError> {
        let formula = NamedVersion::from_strings(SEPARATOR, options.name(), options.version())?;

        let mut args = vec![action.to_string()];
        if options.cask() {
            args.push(CASK_FLAG.to_string());
        }
        args.push(formula.to_string());

        let line = CommandLine::new(PROGRAM)
            .with_sudo(options.sudo().unwrap_or(DEFAULT_SUDO))
            .with_environment(options.environment());
        Cli::new(self.target.clone(), line)
            .execute(ctx, &args)
            .await?;
        info!("brew {action} {formula} finished");
        Ok(())
    }
}

#[async_trait]
impl<O> Installer<O> for BrewInstaller
where
    O: BrewOptions + ?Sized,
{
    fn kind(&self) -> InstallerKind {
        InstallerKind::Brew
    }

    async fn install(&self, ctx: &Context, options: &O) -> Result<(), InstallerError> {
        self.brew(ctx, options, "install").await
    }

    async fn find_installed(
        &self,
        ctx: &Context,
        options: &O,
    ) -> Result<Option<TypedInstalledProgramInfo>, InstallerError> {
        let info = self.finder.find_installed(ctx, options).await?;
        Ok(Some(info.typed(InstallerKind::Brew)))
    }

    async fn uninstall(&self, ctx: &Context, options: &O) -> Result<bool, InstallerError> {
        let found =
            absent_as_none(<Self as Installer<O>>::find_installed(self, ctx, options).await)?;
        if found.is_none() {
            debug!("{} is not installed, nothing to remove", options.name());
            return Ok(false);
        }

        self.brew(ctx, options, "uninstall").await?;
        Ok(true)
    }
}
