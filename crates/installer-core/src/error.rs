use installer_exec::ExecError;
use thiserror::Error;

use crate::VersionParseError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstallerError {
    #[error("{name} is not installed")]
    NotInstalled { name: String },

    #[error("{name} is installed at version {installed}, not {requested}")]
    VersionMismatch {
        name: String,
        requested: String,
        installed: String,
    },

    #[error("Version not found in package status")]
    VersionNotFound,

    #[error("Version cannot be specified both in the name and explicitly: {name}")]
    DoubleVersion { name: String },

    #[error("Invalid version: {0}")]
    InvalidVersion(#[from] VersionParseError),

    #[error("No {action} script configured")]
    MissingScript { action: &'static str },

    #[error("Failed to parse JSON output of find_installed_script: {details}")]
    ScriptOutput { script: String, details: String },

    #[error("Failed to parse {context}: {details}")]
    Parse {
        context: &'static str,
        details: String,
    },

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("IO error ({kind}): {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl InstallerError {
    pub fn not_installed(name: impl Into<String>) -> Self {
        Self::NotInstalled { name: name.into() }
    }

    pub fn parse<E>(context: &'static str, error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::Parse {
            context,
            details: error.to_string(),
        }
    }

    /// Sentinel errors that describe a state ("not there", "not that
    /// version") rather than a failure.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::NotInstalled { .. } | Self::VersionMismatch { .. })
    }

    /// Supporting detail for diagnostics: captured command output, or the
    /// script whose output could not be parsed.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Exec(err) => err.detail(),
            Self::ScriptOutput { script, .. } => script.clone(),
            _ => String::new(),
        }
    }
}

impl From<std::io::Error> for InstallerError {
    fn from(err: std::io::Error) -> Self {
        InstallerError::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use installer_exec::ExecError;

    use super::InstallerError;
    use crate::VersionParseError;

    #[test]
    fn sentinels_are_absent() {
        assert!(InstallerError::not_installed("nginx").is_absent());
        assert!(
            InstallerError::VersionMismatch {
                name: "nginx".to_string(),
                requested: "1.0".to_string(),
                installed: "1.1".to_string(),
            }
            .is_absent()
        );
        assert!(!InstallerError::VersionNotFound.is_absent());
        assert!(!InstallerError::MissingScript { action: "install" }.is_absent());
    }

    #[test]
    fn exec_errors_pass_through_display_and_detail() {
        let exec = ExecError::CommandFailed {
            command: "apt-get -y install nope".to_string(),
            status: Some(100),
            output: "E: Unable to locate package nope\n".to_string(),
            detail: String::new(),
        };
        let err = InstallerError::from(exec.clone());

        assert_eq!(err.to_string(), exec.to_string());
        assert_eq!(err.detail(), "E: Unable to locate package nope");
    }

    #[test]
    fn script_output_error_names_script() {
        let err = InstallerError::ScriptOutput {
            script: "echo nope".to_string(),
            details: "expected value at line 1 column 1".to_string(),
        };
        assert!(err.to_string().contains("find_installed_script"));
        assert_eq!(err.detail(), "echo nope");
    }

    #[test]
    fn version_parse_errors_convert() {
        let err: InstallerError = VersionParseError::Empty.into();
        assert!(matches!(err, InstallerError::InvalidVersion(VersionParseError::Empty)));
    }

    #[test]
    fn io_error_conversion_maps_to_io_variant() {
        let mapped = InstallerError::from(std::io::Error::other("disk full"));
        assert!(matches!(
            mapped,
            InstallerError::Io { kind, ref message }
                if kind == std::io::ErrorKind::Other && message.contains("disk full")
        ));
    }
}
