use std::path::PathBuf;
use thiserror::Error;

const APP_DIR: &str = "pkg-installer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
    #[error("Could not determine config directory")]
    ConfigDirUnavailable,
    #[error("Could not determine data directory")]
    DataDirUnavailable,
}

/// Where the controller keeps its settings and its log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Resolve the per-user directories for the current platform.
    ///
    /// # Errors
    /// Returns an error when the home, config or data directory cannot be
    /// determined.
    pub fn new() -> Result<Self, AppPathsError> {
        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().ok_or(AppPathsError::HomeDirUnavailable)?;
            let base = home.join("Library/Application Support").join(APP_DIR);
            Ok(Self {
                config_dir: base.clone(),
                data_dir: base,
            })
        }

        #[cfg(not(target_os = "macos"))]
        {
            Ok(Self {
                config_dir: dirs::config_dir()
                    .ok_or(AppPathsError::ConfigDirUnavailable)?
                    .join(APP_DIR),
                data_dir: dirs::data_local_dir()
                    .or_else(dirs::data_dir)
                    .ok_or(AppPathsError::DataDirUnavailable)?
                    .join(APP_DIR),
            })
        }
    }

    /// Keep everything under a single directory. Used by embedders that
    /// manage their own state location.
    #[must_use]
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("installer.log")
    }

    /// # Errors
    /// Returns an error if either directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}
