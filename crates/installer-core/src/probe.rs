use std::collections::BTreeMap;

use crate::{InstallerError, Version};

const VERSION_PREFIX: &str = "Version: ";

/// Read the `Version: ` field of a package status block (`dpkg -s`).
///
/// # Errors
/// Returns [`InstallerError::VersionNotFound`] when no line carries the
/// field, or [`InstallerError::InvalidVersion`] when its value does not
/// parse.
pub fn extract_version(status: &str) -> Result<Version, InstallerError> {
    let value = status
        .lines()
        .find_map(|line| line.strip_prefix(VERSION_PREFIX))
        .ok_or(InstallerError::VersionNotFound)?;
    Ok(value.trim().parse()?)
}

/// First listed path that is `name` inside a `bin` or `sbin` directory.
#[must_use]
pub fn find_executable_path(listing: &str, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let suffixes = [format!("bin/{name}"), format!("sbin/{name}")];

    listing
        .lines()
        .map(str::trim)
        .find(|line| {
            suffixes.iter().any(|suffix| {
                line.strip_suffix(suffix.as_str())
                    .is_some_and(|dir| dir.is_empty() || dir.ends_with('/'))
            })
        })
        .map(str::to_string)
}

/// `defaults` overlaid with `overrides`; on a shared key the override wins.
#[must_use]
pub fn merge_environment(
    defaults: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = defaults.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Fold the absence sentinels into `Ok(None)`, leaving real failures alone.
///
/// # Errors
/// Returns every error for which [`InstallerError::is_absent`] is false.
pub fn absent_as_none<T>(
    result: Result<Option<T>, InstallerError>,
) -> Result<Option<T>, InstallerError> {
    match result {
        Err(err) if err.is_absent() => Ok(None),
        other => other,
    }
}
