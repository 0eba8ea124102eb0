use async_trait::async_trait;
use installer_core::{
    BrewOptions, FromTarget, InstalledProgramInfo, InstallerError, NamedVersion, Version,
    VersionFinder, VersionFinderKind, find_executable_path,
};
use installer_exec::{Cli, CommandLine, Context, Target};
use log::{debug, warn};

use crate::info::BrewInfo;
use crate::{CASK_FLAG, DEFAULT_SUDO, PROGRAM, SEPARATOR};

/// Messages brew prints when asked about something it does not have.
const ABSENT_MARKERS: [&str; 4] = [
    "No such keg",
    "is not installed",
    "No available formula",
    "No cask with this name",
];

/// Asks Homebrew directly: `brew list` for presence and files, `brew info
/// --json=v2` for the installed version.
///
/// A versioned request such as `python@3.11` names a versioned formula, so
/// it is satisfied by any installed `3.11.x`.
#[derive(Debug, Clone)]
pub struct BrewVersionFinder {
    target: Target,
}

impl FromTarget for BrewVersionFinder {
    fn from_target(target: Target) -> Self {
        Self { target }
    }
}

impl BrewVersionFinder {
    fn cli<O: BrewOptions + ?Sized>(&self, options: &O) -> Cli {
        let line = CommandLine::new(PROGRAM)
            .with_sudo(options.sudo().unwrap_or(DEFAULT_SUDO))
            .with_environment(options.environment());
        Cli::new(self.target.clone(), line)
    }

    async fn brew<O: BrewOptions + ?Sized>(
        &self,
        ctx: &Context,
        options: &O,
        name: &str,
        args: Vec<String>,
    ) -> Result<String, InstallerError> {
        match self.cli(options).execute(ctx, &args).await {
            Ok(output) => Ok(output),
            Err(err) if ABSENT_MARKERS.iter().any(|marker| err.mentions(marker)) => {
                Err(InstallerError::not_installed(name))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn with_kind_flag(action: &[&str], cask: bool, formula_flag: Option<&str>, name: &str) -> Vec<String> {
    let mut args: Vec<String> = action.iter().map(ToString::to_string).collect();
    if cask {
        args.push(CASK_FLAG.to_string());
    } else if let Some(flag) = formula_flag {
        args.push(flag.to_string());
    }
    args.push(name.to_string());
    args
}

#[async_trait]
impl<O> VersionFinder<O> for BrewVersionFinder
where
    O: BrewOptions + ?Sized,
{
    fn kind(&self) -> VersionFinderKind {
        VersionFinderKind::Brew
    }

    async fn find_installed(
        &self,
        ctx: &Context,
        options: &O,
    ) -> Result<InstalledProgramInfo, InstallerError> {
        let requested = NamedVersion::from_strings(SEPARATOR, options.name(), options.version())?;
        let formula = requested.to_string();
        if requested.name.is_empty() {
            return Err(InstallerError::not_installed(formula));
        }
        let cask = options.cask();

        let listing = self
            .brew(ctx, options, &formula, with_kind_flag(&["list"], cask, None, &formula))
            .await?;
        let info_output = self
            .brew(
                ctx,
                options,
                &formula,
                with_kind_flag(&["info", "--json=v2"], cask, Some("--formula"), &formula),
            )
            .await?;

        let info = BrewInfo::parse(&info_output)?;
        let Some(reported) = info.installed_version(cask) else {
            debug!("brew knows {formula} but reports no installed version");
            return Err(InstallerError::not_installed(formula));
        };

        let installed = match (reported.parse::<Version>(), &requested.version) {
            (Ok(found), Some(wanted)) if !wanted.is_satisfied_by(&found) => {
                return Err(InstallerError::VersionMismatch {
                    name: requested.name.clone(),
                    requested: wanted.to_string(),
                    installed: found.to_string(),
                });
            }
            (Ok(found), _) => Some(found),
            (Err(err), Some(_)) => return Err(err.into()),
            (Err(err), None) => {
                warn!("Unrecognised version {reported:?} for {formula}: {err}");
                None
            }
        };

        let path = find_executable_path(&listing, &requested.name);
        debug!("brew found {formula} {installed:?} at {path:?}");

        Ok(InstalledProgramInfo::new(
            NamedVersion::new(SEPARATOR, requested.name, installed),
            path,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::with_kind_flag;

    #[test]
    fn formula_flag_only_when_requested() {
        assert_eq!(with_kind_flag(&["list"], false, None, "jq"), vec!["list", "jq"]);
        assert_eq!(
            with_kind_flag(&["info", "--json=v2"], false, Some("--formula"), "jq"),
            vec!["info", "--json=v2", "--formula", "jq"]
        );
    }

    #[test]
    fn cask_flag_replaces_formula_flag() {
        assert_eq!(
            with_kind_flag(&["info", "--json=v2"], true, Some("--formula"), "firefox"),
            vec!["info", "--json=v2", "--cask", "firefox"]
        );
    }
}
