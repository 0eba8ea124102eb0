use std::fmt;

use crate::{InstallerError, InstallerKind, Version};

/// Joins the installer kind and the versioned name in an identifier.
pub const ID_SEPARATOR: &str = ":";

/// `name` alone, or `name`, `separator` and `version` concatenated.
#[must_use]
pub fn versioned_name(separator: &str, name: &str, version: Option<&Version>) -> String {
    match version {
        Some(version) => format!("{name}{separator}{version}"),
        None => name.to_string(),
    }
}

/// Split a possibly versioned name at the first `separator`.
///
/// # Errors
/// Returns [`InstallerError::InvalidVersion`] when the part after the
/// separator is not a version. A malformed suffix is never dropped silently.
pub fn name_and_version(
    separator: &str,
    versioned: &str,
) -> Result<(String, Option<Version>), InstallerError> {
    match versioned.split_once(separator) {
        Some((name, version)) => Ok((name.to_string(), Some(version.parse()?))),
        None => Ok((versioned.to_string(), None)),
    }
}

/// `kind:versioned_name`. Two declared units are the same resource exactly
/// when these identifiers are equal.
#[must_use]
pub fn id_from_name_and_version(
    kind: InstallerKind,
    separator: &str,
    name: &str,
    version: Option<&Version>,
) -> String {
    format!(
        "{kind}{ID_SEPARATOR}{}",
        versioned_name(separator, name, version)
    )
}

/// A package name, its optional version, and the separator its package
/// manager writes between the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedVersion {
    pub name: String,
    pub version: Option<Version>,
    pub separator: &'static str,
}

impl NamedVersion {
    #[must_use]
    pub fn new(separator: &'static str, name: impl Into<String>, version: Option<Version>) -> Self {
        Self {
            name: name.into(),
            version,
            separator,
        }
    }

    /// Combine a declared name, which may embed a version, with an
    /// optionally declared version. An empty version string counts as none.
    ///
    /// # Errors
    /// Returns [`InstallerError::DoubleVersion`] when both carry a version,
    /// or [`InstallerError::InvalidVersion`] when either fails to parse.
    pub fn from_strings(
        separator: &'static str,
        name: &str,
        version: Option<&str>,
    ) -> Result<Self, InstallerError> {
        let (bare_name, embedded) = name_and_version(separator, name)?;
        let explicit = version
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::parse::<Version>)
            .transpose()?;

        let version = match (embedded, explicit) {
            (Some(_), Some(_)) => {
                return Err(InstallerError::DoubleVersion {
                    name: name.to_string(),
                });
            }
            (embedded, explicit) => embedded.or(explicit),
        };

        Ok(Self::new(separator, bare_name, version))
    }

    #[must_use]
    pub fn id(&self, kind: InstallerKind) -> String {
        id_from_name_and_version(kind, self.separator, &self.name, self.version.as_ref())
    }
}

impl fmt::Display for NamedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&versioned_name(
            self.separator,
            &self.name,
            self.version.as_ref(),
        ))
    }
}
