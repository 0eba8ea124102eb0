use std::sync::Arc;
use std::time::Duration;

use installer_core::InstallerError;
use installer_exec::{Communicator, CommunicatorError};
use serde::{Deserialize, Serialize};

const USER_SEPARATOR: &str = "@";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    #[default]
    Ssh,
    Winrm,
}

impl ConnectionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::Winrm => "winrm",
        }
    }

    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Ssh => 22,
            Self::Winrm => 5985,
        }
    }

    #[must_use]
    pub const fn default_timeout(self) -> Duration {
        match self {
            Self::Ssh => Duration::from_secs(5 * 60),
            Self::Winrm => Duration::from_secs(30 * 60),
        }
    }
}

impl std::fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to reach a remote target. A record without one, or with an empty
/// host, is managed on the local machine.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    #[serde(rename = "type", default)]
    pub kind: ConnectionKind,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub private_key: Option<String>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Connect timeout such as `"30s"`, `"5m"` or `"1h30m"`.
    #[serde(default)]
    pub timeout: Option<String>,
}

impl ConnectionInfo {
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.host.as_deref().is_some_and(|host| !host.is_empty())
    }

    /// `user@host`, or just the host when no user is set.
    #[must_use]
    pub fn connection_name(&self) -> String {
        match (self.user.as_deref(), self.host.as_deref()) {
            (Some(user), Some(host)) if !user.is_empty() => {
                format!("{user}{USER_SEPARATOR}{host}")
            }
            (_, host) => host.unwrap_or_default().to_string(),
        }
    }

    /// Declared port and connect timeout, falling back to the defaults of
    /// the connection type.
    ///
    /// # Errors
    /// Returns [`InstallerError::Parse`] when the timeout is malformed.
    pub fn port_and_timeout(&self) -> Result<(u16, Duration), InstallerError> {
        let port = self.port.unwrap_or(self.kind.default_port());
        let timeout = match self.timeout.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => parse_timeout(text)?,
            _ => self.kind.default_timeout(),
        };
        Ok((port, timeout))
    }
}

impl std::fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let masked = |value: &Option<String>| value.as_ref().map(|_| "***");
        f.debug_struct("ConnectionInfo")
            .field("kind", &self.kind)
            .field("user", &self.user)
            .field("password", &masked(&self.password))
            .field("private_key", &masked(&self.private_key))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Parse a duration written as number and unit pairs: `h`, `m`, `s`, `ms`.
///
/// # Errors
/// Returns [`InstallerError::Parse`] for empty input, a missing or unknown
/// unit, or an overflowing value.
pub fn parse_timeout(text: &str) -> Result<Duration, InstallerError> {
    let invalid = || InstallerError::parse("connection timeout", format!("invalid duration {text:?}"));

    let mut rest = text.trim();
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total = Duration::ZERO;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(invalid());
        }
        let amount: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let (unit_secs, unit_millis, unit_len) = if rest.starts_with("ms") {
            (0, 1, 2)
        } else if rest.starts_with('h') {
            (3600, 0, 1)
        } else if rest.starts_with('m') {
            (60, 0, 1)
        } else if rest.starts_with('s') {
            (1, 0, 1)
        } else {
            return Err(invalid());
        };
        rest = &rest[unit_len..];

        let part = if unit_millis > 0 {
            Duration::from_millis(amount)
        } else {
            Duration::from_secs(amount.checked_mul(unit_secs).ok_or_else(invalid)?)
        };
        total = total.checked_add(part).ok_or_else(invalid)?;
    }
    Ok(total)
}

/// Opens communicators for remote records. Transport and authentication
/// live behind this seam.
pub trait Connector: Send + Sync {
    /// # Errors
    /// Returns a [`CommunicatorError`] when no communicator can be built
    /// for `info`.
    fn communicator(&self, info: &ConnectionInfo)
    -> Result<Arc<dyn Communicator>, CommunicatorError>;
}

/// Connector for callers that only manage the local machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOnly;

impl Connector for LocalOnly {
    fn communicator(
        &self,
        info: &ConnectionInfo,
    ) -> Result<Arc<dyn Communicator>, CommunicatorError> {
        Err(CommunicatorError::Transport(format!(
            "no {} transport available for {}",
            info.kind,
            info.connection_name()
        )))
    }
}
