use installer_core::{InstallerError, TypedInstalledProgramInfo};

use crate::ConnectionInfo;

/// A declared unit handed over by the front-end for one lifecycle call.
pub trait Record: Send + Sync {
    /// Derive the record's identity from its declared fields.
    ///
    /// Returns `Ok(false)` when a mandatory field is missing.
    ///
    /// # Errors
    /// Returns the identity error when the declared fields contradict each
    /// other or carry an unparsable version.
    fn initialize(&mut self) -> Result<bool, InstallerError>;

    /// Store what a probe discovered. Declared fields stay as written.
    fn copy_from_installed(&mut self, info: &TypedInstalledProgramInfo);

    fn remote_connection_info(&self) -> Option<&ConnectionInfo>;
}
