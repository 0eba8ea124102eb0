//! Declared units for the three installers, in the shape a front-end
//! stores them. Computed fields are filled by [`Record::initialize`] and
//! [`Record::copy_from_installed`]; declared fields are never rewritten.

use std::collections::BTreeMap;

use installer_core::{
    BrewOptions, ID_SEPARATOR, InstallerError, InstallerKind, InstallerOptions, NamedVersion,
    PackageOptions, ScriptOptions, TypedInstalledProgramInfo, merge_environment,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{ConnectionInfo, Record};

fn package_id(
    kind: InstallerKind,
    separator: &'static str,
    name: &str,
    version: Option<&str>,
) -> Result<Option<String>, InstallerError> {
    if name.trim().is_empty() {
        return Ok(None);
    }
    let named = NamedVersion::from_strings(separator, name, version)?;
    Ok(Some(named.id(kind)))
}

fn discovered_version(info: &TypedInstalledProgramInfo) -> Option<String> {
    info.version().map(ToString::to_string)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AptRecord {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub sudo: Option<bool>,

    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    #[serde(default)]
    pub remote_connection: Option<ConnectionInfo>,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub installed_version: Option<String>,

    #[serde(default)]
    pub path: Option<String>,
}

impl AptRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl InstallerOptions for AptRecord {
    fn sudo(&self) -> Option<bool> {
        self.sudo
    }

    fn environment(&self) -> BTreeMap<String, String> {
        self.environment.clone()
    }
}

impl PackageOptions for AptRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl Record for AptRecord {
    fn initialize(&mut self) -> Result<bool, InstallerError> {
        self.id = package_id(
            InstallerKind::Apt,
            installer_apt::SEPARATOR,
            &self.name,
            self.version.as_deref(),
        )?;
        Ok(self.id.is_some())
    }

    fn copy_from_installed(&mut self, info: &TypedInstalledProgramInfo) {
        self.installed_version = discovered_version(info);
        self.path = info.path().map(str::to_string);
    }

    fn remote_connection_info(&self) -> Option<&ConnectionInfo> {
        self.remote_connection.as_ref()
    }
}

/// Environment values that must not show up in logs or debug output.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secrets(pub BTreeMap<String, String>);

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.0.keys().map(|key| (key, "***")))
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrewRecord {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub cask: bool,

    #[serde(default)]
    pub sudo: Option<bool>,

    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    /// Passed to brew like `environment`; a secret wins over an environment
    /// entry with the same key.
    #[serde(default)]
    pub secrets: Secrets,

    #[serde(default)]
    pub remote_connection: Option<ConnectionInfo>,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub installed_version: Option<String>,

    #[serde(default)]
    pub path: Option<String>,
}

impl BrewRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl InstallerOptions for BrewRecord {
    fn sudo(&self) -> Option<bool> {
        self.sudo
    }

    fn environment(&self) -> BTreeMap<String, String> {
        merge_environment(&self.environment, &self.secrets.0)
    }
}

impl PackageOptions for BrewRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl BrewOptions for BrewRecord {
    fn cask(&self) -> bool {
        self.cask
    }
}

impl Record for BrewRecord {
    fn initialize(&mut self) -> Result<bool, InstallerError> {
        self.id = package_id(
            InstallerKind::Brew,
            installer_brew::SEPARATOR,
            &self.name,
            self.version.as_deref(),
        )?;
        Ok(self.id.is_some())
    }

    fn copy_from_installed(&mut self, info: &TypedInstalledProgramInfo) {
        self.installed_version = discovered_version(info);
        self.path = info.path().map(str::to_string);
    }

    fn remote_connection_info(&self) -> Option<&ConnectionInfo> {
        self.remote_connection.as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRecord {
    /// Executable whose presence means the program is installed.
    #[serde(default)]
    pub path: Option<String>,

    /// Shared script for actions without a dedicated one.
    #[serde(default)]
    pub script: Option<String>,

    #[serde(default)]
    pub install_script: Option<String>,

    #[serde(default)]
    pub find_installed_script: Option<String>,

    #[serde(default)]
    pub uninstall_script: Option<String>,

    #[serde(default)]
    pub default_args: Option<Vec<String>>,

    #[serde(default)]
    pub additional_args: Vec<String>,

    #[serde(default)]
    pub sudo: Option<bool>,

    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    #[serde(default)]
    pub shell: Option<String>,

    #[serde(default)]
    pub remote_connection: Option<ConnectionInfo>,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub installed_version: Option<String>,

    #[serde(default)]
    pub installed_path: Option<String>,
}

impl ScriptRecord {
    /// `script:` followed by the SHA-256 of the path, the shared script and
    /// the dedicated scripts, so editing any of them yields a new identity.
    /// Each field is framed by a presence tag and its length.
    #[must_use]
    pub fn script_id(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [
            &self.path,
            &self.script,
            &self.install_script,
            &self.find_installed_script,
            &self.uninstall_script,
        ] {
            match part {
                Some(value) => {
                    hasher.update([1]);
                    hasher.update((value.len() as u64).to_le_bytes());
                    hasher.update(value.as_bytes());
                }
                None => hasher.update([0]),
            }
        }
        format!(
            "{}{ID_SEPARATOR}{:x}",
            InstallerKind::Script,
            hasher.finalize()
        )
    }

    fn declares_anything(&self) -> bool {
        [
            &self.path,
            &self.script,
            &self.install_script,
            &self.find_installed_script,
            &self.uninstall_script,
        ]
        .into_iter()
        .any(|field| field.as_deref().is_some_and(|value| !value.trim().is_empty()))
    }
}

impl InstallerOptions for ScriptRecord {
    fn sudo(&self) -> Option<bool> {
        self.sudo
    }

    fn environment(&self) -> BTreeMap<String, String> {
        self.environment.clone()
    }
}

impl ScriptOptions for ScriptRecord {
    fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn shell(&self) -> Option<&str> {
        self.shell.as_deref()
    }

    fn default_args(&self) -> Option<&[String]> {
        self.default_args.as_deref()
    }

    fn install_script(&self) -> Option<&str> {
        self.install_script.as_deref()
    }

    fn find_installed_script(&self) -> Option<&str> {
        self.find_installed_script.as_deref()
    }

    fn uninstall_script(&self) -> Option<&str> {
        self.uninstall_script.as_deref()
    }

    fn default_script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    fn additional_args(&self) -> &[String] {
        &self.additional_args
    }
}

impl Record for ScriptRecord {
    fn initialize(&mut self) -> Result<bool, InstallerError> {
        if !self.declares_anything() {
            self.id = None;
            return Ok(false);
        }
        self.id = Some(self.script_id());
        Ok(true)
    }

    fn copy_from_installed(&mut self, info: &TypedInstalledProgramInfo) {
        self.installed_version = discovered_version(info);
        self.installed_path = info.path().map(str::to_string);
    }

    fn remote_connection_info(&self) -> Option<&ConnectionInfo> {
        self.remote_connection.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use installer_core::{
        InstalledProgramInfo, InstallerError, InstallerKind, InstallerOptions, NamedVersion,
        ScriptOptions,
    };

    use super::{AptRecord, BrewRecord, Record, ScriptRecord, Secrets};

    #[test]
    fn apt_identity_includes_version() {
        let mut record = AptRecord {
            version: Some("1.18.0-6ubuntu14.3".to_string()),
            ..AptRecord::new("nginx")
        };

        assert!(record.initialize().expect("identity should derive"));
        assert_eq!(record.id.as_deref(), Some("apt:nginx=1.18.0-6ubuntu14.3"));
    }

    #[test]
    fn empty_name_is_not_initialized() {
        let mut record = AptRecord::new("  ");
        assert!(!record.initialize().expect("missing name is not an error"));
        assert_eq!(record.id, None);
    }

    #[test]
    fn version_in_name_and_field_is_rejected() {
        let mut record = BrewRecord {
            version: Some("3.12".to_string()),
            ..BrewRecord::new("python@3.11")
        };

        assert!(matches!(
            record.initialize(),
            Err(InstallerError::DoubleVersion { .. })
        ));
    }

    #[test]
    fn brew_identity_uses_at_separator() {
        let mut record = BrewRecord::new("python@3.11");
        assert!(record.initialize().expect("identity should derive"));
        assert_eq!(record.id.as_deref(), Some("brew:python@3.11"));
    }

    #[test]
    fn copy_keeps_declared_fields() {
        let mut record = AptRecord::new("nginx");
        let info = InstalledProgramInfo::new(
            NamedVersion::new(
                "=",
                "nginx",
                Some("1.18.0-6ubuntu14.3".parse().expect("version should parse")),
            ),
            Some("/usr/sbin/nginx".to_string()),
        )
        .typed(InstallerKind::Apt);

        record.copy_from_installed(&info);

        assert_eq!(record.name, "nginx");
        assert_eq!(record.version, None);
        assert_eq!(record.installed_version.as_deref(), Some("1.18.0-6ubuntu14.3"));
        assert_eq!(record.path.as_deref(), Some("/usr/sbin/nginx"));
    }

    #[test]
    fn secrets_override_environment_and_stay_out_of_debug() {
        let record = BrewRecord {
            environment: BTreeMap::from([
                ("HOMEBREW_NO_ANALYTICS".to_string(), "1".to_string()),
                ("HOMEBREW_GITHUB_API_TOKEN".to_string(), "placeholder".to_string()),
            ]),
            secrets: Secrets(BTreeMap::from([(
                "HOMEBREW_GITHUB_API_TOKEN".to_string(),
                "ghp_secret".to_string(),
            )])),
            ..BrewRecord::new("jq")
        };

        let env = record.environment();
        assert_eq!(env["HOMEBREW_GITHUB_API_TOKEN"], "ghp_secret");
        assert_eq!(env["HOMEBREW_NO_ANALYTICS"], "1");
        assert!(!format!("{record:?}").contains("ghp_secret"));
    }

    #[test]
    fn script_identity_tracks_script_bodies() {
        let mut first = ScriptRecord {
            install_script: Some("make install".to_string()),
            ..ScriptRecord::default()
        };
        let mut second = ScriptRecord {
            install_script: Some("make install PREFIX=/opt".to_string()),
            ..ScriptRecord::default()
        };

        assert!(first.initialize().expect("identity should derive"));
        assert!(second.initialize().expect("identity should derive"));

        let id = first.id().to_string();
        assert!(id.starts_with("script:"));
        assert_eq!(id.len(), "script:".len() + 64);
        assert_ne!(first.id, second.id);
        assert_eq!(first.script_id(), id);
    }

    #[test]
    fn shared_scripts_get_distinct_identities() {
        let mut terraform = ScriptRecord {
            script: Some("install-terraform.sh".to_string()),
            ..ScriptRecord::default()
        };
        let mut kubectl = ScriptRecord {
            script: Some("install-kubectl.sh".to_string()),
            ..ScriptRecord::default()
        };

        assert!(terraform.initialize().expect("identity should derive"));
        assert!(kubectl.initialize().expect("identity should derive"));
        assert_ne!(terraform.id, kubectl.id);
    }

    #[test]
    fn identity_does_not_depend_on_where_text_is_split() {
        let joined = ScriptRecord {
            path: Some("ab".to_string()),
            ..ScriptRecord::default()
        };
        let split = ScriptRecord {
            path: Some("a".to_string()),
            install_script: Some("b".to_string()),
            ..ScriptRecord::default()
        };
        let moved = ScriptRecord {
            install_script: Some("ab".to_string()),
            ..ScriptRecord::default()
        };
        let empty_path = ScriptRecord {
            path: Some(String::new()),
            install_script: Some("ab".to_string()),
            ..ScriptRecord::default()
        };

        let ids = [&joined, &split, &moved, &empty_path].map(ScriptRecord::script_id);
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn script_without_anything_to_run_is_not_initialized() {
        let mut record = ScriptRecord {
            additional_args: vec!["--verbose".to_string()],
            ..ScriptRecord::default()
        };
        assert!(!record.initialize().expect("missing scripts is not an error"));
    }

    #[test]
    fn apt_record_deserializes_with_defaults() {
        let record: AptRecord = serde_json::from_str(r#"{"name":"curl","sudo":false}"#)
            .expect("record JSON should deserialize");

        assert_eq!(record.name, "curl");
        assert_eq!(record.sudo, Some(false));
        assert!(record.environment.is_empty());
        assert!(record.remote_connection.is_none());
    }
}
