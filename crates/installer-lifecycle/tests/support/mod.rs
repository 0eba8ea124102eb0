use std::sync::Arc;

use installer_exec::{Communicator, CommunicatorError};
use installer_lifecycle::{ConnectionInfo, Connector};

pub use installer_exec::fake::{FakeHost, Reply};

/// Hands out the same fake host for every connection.
pub struct FakeConnector {
    pub host: Arc<FakeHost>,
}

impl Connector for FakeConnector {
    fn communicator(
        &self,
        _info: &ConnectionInfo,
    ) -> Result<Arc<dyn Communicator>, CommunicatorError> {
        let host: Arc<dyn Communicator> = self.host.clone();
        Ok(host)
    }
}

pub fn ssh_to(host: &str) -> ConnectionInfo {
    ConnectionInfo {
        user: Some("deploy".to_string()),
        host: Some(host.to_string()),
        ..ConnectionInfo::default()
    }
}
