use std::collections::BTreeMap;

use installer_core::{BrewOptions, InstallerOptions, PackageOptions};

pub use installer_exec::fake::{FakeHost, Reply, remote};

#[derive(Default)]
pub struct Formula {
    pub name: &'static str,
    pub version: Option<&'static str>,
    pub cask: bool,
    pub sudo: Option<bool>,
    pub environment: BTreeMap<String, String>,
}

impl InstallerOptions for Formula {
    fn sudo(&self) -> Option<bool> {
        self.sudo
    }

    fn environment(&self) -> BTreeMap<String, String> {
        self.environment.clone()
    }
}

impl PackageOptions for Formula {
    fn name(&self) -> &str {
        self.name
    }

    fn version(&self) -> Option<&str> {
        self.version
    }
}

impl BrewOptions for Formula {
    fn cask(&self) -> bool {
        self.cask
    }
}
