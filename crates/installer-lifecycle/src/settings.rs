use std::path::PathBuf;
use std::time::Duration;

use installer_platform::AppPaths;
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSettings {
    #[serde(default = "default_install_timeout")]
    pub install_timeout_secs: u64,

    #[serde(default = "default_uninstall_timeout")]
    pub uninstall_timeout_secs: u64,

    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_install_timeout() -> u64 {
    600
}

fn default_uninstall_timeout() -> u64 {
    300
}

fn default_read_timeout() -> u64 {
    60
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            install_timeout_secs: default_install_timeout(),
            uninstall_timeout_secs: default_uninstall_timeout(),
            read_timeout_secs: default_read_timeout(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl ControllerSettings {
    /// Settings from the user's config directory, or defaults when there
    /// are none or they cannot be read.
    pub fn load() -> Self {
        match AppPaths::new() {
            Ok(paths) => Self::load_from(&paths),
            Err(err) => {
                warn!("Using default settings: {err}");
                Self::default()
            }
        }
    }

    pub fn load_from(paths: &AppPaths) -> Self {
        let settings_path = paths.settings_file();
        if !settings_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&settings_path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                warn!("Ignoring malformed {}: {err}", settings_path.display());
                Self::default()
            }),
            Err(err) => {
                warn!("Could not read {}: {err}", settings_path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        let paths = AppPaths::new().map_err(std::io::Error::other)?;
        self.save_to(&paths)
    }

    pub fn save_to(&self, paths: &AppPaths) -> Result<(), std::io::Error> {
        paths.ensure_dirs()?;

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.settings_file(), content)?;
        Ok(())
    }

    /// Start file logging with this configuration. Returns the log file in
    /// use, if any.
    pub fn init_logging(&self, paths: &AppPaths) -> Option<PathBuf> {
        installer_platform::init_logging(paths, self.debug_logging, self.max_log_size_bytes)
    }

    #[must_use]
    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }

    #[must_use]
    pub fn uninstall_timeout(&self) -> Duration {
        Duration::from_secs(self.uninstall_timeout_secs)
    }

    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}
