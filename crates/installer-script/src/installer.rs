use async_trait::async_trait;
use installer_core::{
    FromTarget, InstalledProgramInfo, Installer, InstallerError, InstallerKind, NamedVersion,
    ScriptOptions, TypedInstalledProgramInfo, absent_as_none,
};
use installer_exec::{Cli, CommandLine, Context, ExecError, Target, shell_quote};
use log::{debug, info};

use crate::action::{Action, Selected, select};
use crate::report::parse_report;
use crate::{DEFAULT_ARGS, DEFAULT_SHELL, DEFAULT_SUDO, SEPARATOR};

/// Runs the record's scripts through a shell: `sh -c '<script>' [action]
/// additional_args...`. The action name is only passed to the shared
/// default script; with `sh -c` it arrives as `$0`.
#[derive(Debug, Clone)]
pub struct ScriptInstaller {
    target: Target,
}

impl FromTarget for ScriptInstaller {
    fn from_target(target: Target) -> Self {
        Self { target }
    }
}

impl ScriptInstaller {
    fn cli<O: ScriptOptions + ?Sized>(&self, options: &O) -> Cli {
        let shell = options
            .shell()
            .filter(|shell| !shell.is_empty())
            .unwrap_or(DEFAULT_SHELL);
        let line = CommandLine::new(shell)
            .with_sudo(options.sudo().unwrap_or(DEFAULT_SUDO))
            .with_environment(options.environment());
        Cli::new(self.target.clone(), line)
    }

    fn arguments<O: ScriptOptions + ?Sized>(
        cli: &Cli,
        options: &O,
        selected: Selected<'_>,
        action: Action,
    ) -> Vec<String> {
        let mut args: Vec<String> = match options.default_args() {
            Some(custom) if !custom.is_empty() => {
                custom.iter().map(|arg| cli.escape_arg(arg)).collect()
            }
            _ => DEFAULT_ARGS.iter().map(ToString::to_string).collect(),
        };
        args.push(cli.escape_script(selected.body));
        if selected.shared {
            args.push(action.as_str().to_string());
        }
        args.extend(options.additional_args().iter().map(|arg| cli.escape_arg(arg)));
        args
    }

    async fn run<'o, O: ScriptOptions + ?Sized>(
        &self,
        ctx: &Context,
        options: &'o O,
        action: Action,
    ) -> Result<Option<(String, Selected<'o>)>, InstallerError> {
        let Some(selected) = select(options, action) else {
            return Ok(None);
        };
        let cli = self.cli(options);
        let args = Self::arguments(&cli, options, selected, action);
        let output = cli.execute(ctx, &args).await?;
        Ok(Some((output, selected)))
    }

    async fn run_required<O: ScriptOptions + ?Sized>(
        &self,
        ctx: &Context,
        options: &O,
        action: Action,
    ) -> Result<(), InstallerError> {
        let Some(selected) = select(options, action) else {
            return Err(InstallerError::MissingScript {
                action: action.as_str(),
            });
        };
        let cli = self.cli(options);
        cli.execute(ctx, &Self::arguments(&cli, options, selected, action))
            .await?;
        info!("{action} script for {} finished", options.id());
        Ok(())
    }

    /// Whether `path` resolves to an executable on the target.
    async fn is_on_target<O: ScriptOptions + ?Sized>(
        &self,
        ctx: &Context,
        options: &O,
        path: &str,
    ) -> Result<bool, InstallerError> {
        match &self.target {
            Target::Local => match which::which(path) {
                Ok(found) => {
                    debug!("{path} resolves to {}", found.display());
                    Ok(true)
                }
                Err(which::Error::CannotFindBinaryPath) => Ok(false),
                Err(err) => {
                    let message = format!("check if {path} is installed: {err}");
                    Err(std::io::Error::other(message).into())
                }
            },
            Target::Remote(_) => {
                let cli = self.cli(options);
                let probe = format!("command -v {}", shell_quote(path));
                let args = vec!["-c".to_string(), cli.escape_script(&probe)];
                match cli.execute(ctx, &args).await {
                    Ok(_) => Ok(true),
                    Err(ExecError::CommandFailed { .. }) => Ok(false),
                    Err(err) => Err(err.into()),
                }
            }
        }
    }
}

#[async_trait]
impl<O> Installer<O> for ScriptInstaller
where
    O: ScriptOptions + ?Sized,
{
    fn kind(&self) -> InstallerKind {
        InstallerKind::Script
    }

    async fn install(&self, ctx: &Context, options: &O) -> Result<(), InstallerError> {
        self.run_required(ctx, options, Action::Install).await
    }

    async fn find_installed(
        &self,
        ctx: &Context,
        options: &O,
    ) -> Result<Option<TypedInstalledProgramInfo>, InstallerError> {
        if let Some(path) = options.path().filter(|path| !path.is_empty())
            && self.is_on_target(ctx, options, path).await?
        {
            let info = InstalledProgramInfo::new(
                NamedVersion::new(SEPARATOR, options.id(), None),
                Some(path.to_string()),
            );
            return Ok(Some(info.typed(InstallerKind::Script)));
        }

        let Some((output, selected)) = self.run(ctx, options, Action::Find).await? else {
            debug!("No find script for {}, treating it as absent", options.id());
            return Ok(None);
        };
        let found = parse_report(&output, selected.body, options.id())?;
        Ok(found.map(|info| info.typed(InstallerKind::Script)))
    }

    async fn uninstall(&self, ctx: &Context, options: &O) -> Result<bool, InstallerError> {
        let found =
            absent_as_none(<Self as Installer<O>>::find_installed(self, ctx, options).await)?;
        if found.is_none() {
            debug!("{} is not installed, nothing to remove", options.id());
            return Ok(false);
        }

        self.run_required(ctx, options, Action::Uninstall).await?;
        Ok(true)
    }
}
