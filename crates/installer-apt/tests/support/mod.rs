use std::collections::BTreeMap;

use installer_core::{InstallerOptions, PackageOptions};

pub use installer_exec::fake::{FakeHost, Reply, remote};

#[derive(Default)]
pub struct Package {
    pub name: &'static str,
    pub version: Option<&'static str>,
    pub sudo: Option<bool>,
    pub environment: BTreeMap<String, String>,
}

impl InstallerOptions for Package {
    fn sudo(&self) -> Option<bool> {
        self.sudo
    }

    fn environment(&self) -> BTreeMap<String, String> {
        self.environment.clone()
    }
}

impl PackageOptions for Package {
    fn name(&self) -> &str {
        self.name
    }

    fn version(&self) -> Option<&str> {
        self.version
    }
}
