use async_trait::async_trait;
use installer_core::{
    FromTarget, InstalledProgramInfo, InstallerError, NamedVersion, PackageOptions,
    VersionFinder, VersionFinderKind, extract_version, find_executable_path,
};
use installer_exec::{Cli, CommandLine, Context, Target};
use log::{debug, warn};

use crate::SEPARATOR;

const NOT_INSTALLED: &str = "is not installed";

/// Reads the dpkg database: `dpkg -L` for presence and files, `dpkg -s` for
/// the installed version.
#[derive(Debug, Clone)]
pub struct DpkgVersionFinder {
    target: Target,
}

impl FromTarget for DpkgVersionFinder {
    fn from_target(target: Target) -> Self {
        Self { target }
    }
}

impl DpkgVersionFinder {
    fn cli(&self) -> Cli {
        Cli::new(self.target.clone(), CommandLine::new("dpkg"))
    }

    async fn query(&self, ctx: &Context, flag: &str, name: &str) -> Result<String, InstallerError> {
        match self.cli().execute(ctx, &[flag.to_string(), name.to_string()]).await {
            Ok(output) => Ok(output),
            Err(err) if err.mentions(NOT_INSTALLED) => Err(InstallerError::not_installed(name)),
            Err(err) => Err(err.into()),
        }
    }
}

/// `Status: install ok installed`. Packages removed with their config files
/// kept are still known to dpkg but report another state.
fn is_installed_status(status: &str) -> bool {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Status: "))
        .is_none_or(|state| state.trim_end().ends_with(" installed"))
}

#[async_trait]
impl<O> VersionFinder<O> for DpkgVersionFinder
where
    O: PackageOptions + ?Sized,
{
    fn kind(&self) -> VersionFinderKind {
        VersionFinderKind::Dpkg
    }

    async fn find_installed(
        &self,
        ctx: &Context,
        options: &O,
    ) -> Result<InstalledProgramInfo, InstallerError> {
        let requested = NamedVersion::from_strings(SEPARATOR, options.name(), options.version())?;
        let name = requested.name.as_str();
        if name.is_empty() {
            return Err(InstallerError::not_installed(name));
        }

        let listing = self.query(ctx, "-L", name).await?;
        let status = self.query(ctx, "-s", name).await?;
        if !is_installed_status(&status) {
            debug!("{name} is known to dpkg but not installed");
            return Err(InstallerError::not_installed(name));
        }

        let installed = match (extract_version(&status), &requested.version) {
            (Ok(found), Some(wanted)) if found != *wanted => {
                return Err(InstallerError::VersionMismatch {
                    name: name.to_string(),
                    requested: wanted.to_string(),
                    installed: found.to_string(),
                });
            }
            (Ok(found), _) => Some(found),
            (Err(err), Some(_)) => return Err(err),
            (Err(err), None) => {
                warn!("Could not read the installed version of {name}: {err}");
                None
            }
        };

        let path = find_executable_path(&listing, name);
        debug!("dpkg found {name} {installed:?} at {path:?}");

        Ok(InstalledProgramInfo::new(
            NamedVersion::new(SEPARATOR, name, installed),
            path,
        ))
    }
}
