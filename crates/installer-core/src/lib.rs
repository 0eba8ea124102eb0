mod error;
mod identity;
mod probe;
mod traits;
mod types;
mod version;

pub use error::InstallerError;
pub use identity::{
    ID_SEPARATOR, NamedVersion, id_from_name_and_version, name_and_version, versioned_name,
};
pub use probe::{absent_as_none, extract_version, find_executable_path, merge_environment};
pub use traits::{
    BrewOptions, FromTarget, Installer, InstallerOptions, PackageOptions, ScriptOptions,
    VersionFinder,
};
pub use types::{InstalledProgramInfo, InstallerKind, TypedInstalledProgramInfo, VersionFinderKind};
pub use version::{Version, VersionParseError};
