use std::collections::BTreeMap;

use installer_core::{InstallerOptions, ScriptOptions};

pub use installer_exec::fake::{FakeHost, Reply, remote};

#[derive(Default)]
pub struct Scripts {
    pub id: &'static str,
    pub path: Option<&'static str>,
    pub shell: Option<&'static str>,
    pub default_args: Option<Vec<String>>,
    pub install: Option<&'static str>,
    pub find: Option<&'static str>,
    pub uninstall: Option<&'static str>,
    pub shared: Option<&'static str>,
    pub additional_args: Vec<String>,
    pub sudo: Option<bool>,
    pub environment: BTreeMap<String, String>,
}

impl InstallerOptions for Scripts {
    fn sudo(&self) -> Option<bool> {
        self.sudo
    }

    fn environment(&self) -> BTreeMap<String, String> {
        self.environment.clone()
    }
}

impl ScriptOptions for Scripts {
    fn id(&self) -> &str {
        self.id
    }

    fn path(&self) -> Option<&str> {
        self.path
    }

    fn shell(&self) -> Option<&str> {
        self.shell
    }

    fn default_args(&self) -> Option<&[String]> {
        self.default_args.as_deref()
    }

    fn install_script(&self) -> Option<&str> {
        self.install
    }

    fn find_installed_script(&self) -> Option<&str> {
        self.find
    }

    fn uninstall_script(&self) -> Option<&str> {
        self.uninstall
    }

    fn default_script(&self) -> Option<&str> {
        self.shared
    }

    fn additional_args(&self) -> &[String] {
        &self.additional_args
    }
}
