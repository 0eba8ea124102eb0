use serde::{Deserialize, Serialize};

use crate::{NamedVersion, Version};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallerKind {
    Apt,
    Brew,
    Script,
}

impl InstallerKind {
    pub const ALL: [Self; 3] = [Self::Apt, Self::Brew, Self::Script];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apt => "apt",
            Self::Brew => "brew",
            Self::Script => "script",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "apt" => Some(Self::Apt),
            "brew" => Some(Self::Brew),
            "script" => Some(Self::Script),
            _ => None,
        }
    }
}

impl std::fmt::Display for InstallerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionFinderKind {
    Dpkg,
    Brew,
}

impl VersionFinderKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dpkg => "dpkg",
            Self::Brew => "brew",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dpkg" => Some(Self::Dpkg),
            "brew" => Some(Self::Brew),
            _ => None,
        }
    }
}

impl std::fmt::Display for VersionFinderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a probe found on the target. `path` is the resolved executable, or
/// `None` for packages that ship no binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledProgramInfo {
    pub named_version: NamedVersion,
    pub path: Option<String>,
}

impl InstalledProgramInfo {
    #[must_use]
    pub fn new(named_version: NamedVersion, path: Option<String>) -> Self {
        Self {
            named_version,
            path,
        }
    }

    #[must_use]
    pub fn typed(self, kind: InstallerKind) -> TypedInstalledProgramInfo {
        TypedInstalledProgramInfo { kind, info: self }
    }
}

/// [`InstalledProgramInfo`] tagged with the installer that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedInstalledProgramInfo {
    pub kind: InstallerKind,
    pub info: InstalledProgramInfo,
}

impl TypedInstalledProgramInfo {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.info.named_version.name
    }

    #[must_use]
    pub fn version(&self) -> Option<&Version> {
        self.info.named_version.version.as_ref()
    }

    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.info.path.as_deref()
    }

    /// Identifier of the discovered package, see
    /// [`crate::id_from_name_and_version`].
    #[must_use]
    pub fn id(&self) -> String {
        self.info.named_version.id(self.kind)
    }
}
