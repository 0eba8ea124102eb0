use installer_core::InstallerError;
use serde::Deserialize;

/// The parts of `brew info --json=v2` we read.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct BrewInfo {
    #[serde(default)]
    formulae: Vec<FormulaInfo>,
    #[serde(default)]
    casks: Vec<CaskInfo>,
}

#[derive(Debug, Deserialize)]
struct FormulaInfo {
    #[serde(default)]
    installed: Vec<InstalledKeg>,
}

#[derive(Debug, Deserialize)]
struct InstalledKeg {
    version: String,
}

#[derive(Debug, Deserialize)]
struct CaskInfo {
    installed: Option<String>,
}

impl BrewInfo {
    /// Parse the JSON document in `output`. Anything before the opening
    /// brace or after the document (warnings brew prints to stderr) is
    /// skipped.
    pub(crate) fn parse(output: &str) -> Result<Self, InstallerError> {
        let start = output
            .find('{')
            .ok_or_else(|| InstallerError::parse("brew info output", "no JSON document"))?;

        serde_json::Deserializer::from_str(&output[start..])
            .into_iter::<Self>()
            .next()
            .unwrap_or_else(|| Ok(Self::default()))
            .map_err(|e| InstallerError::parse("brew info output", e))
    }

    /// Installed version of the first formula or cask, as brew prints it.
    pub(crate) fn installed_version(&self, cask: bool) -> Option<&str> {
        if cask {
            self.casks.first()?.installed.as_deref()
        } else {
            self.formulae
                .first()?
                .installed
                .first()
                .map(|keg| keg.version.as_str())
        }
    }
}
