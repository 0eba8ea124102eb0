use installer_core::{InstalledProgramInfo, InstallerError, NamedVersion, Version};
use serde::Deserialize;

use crate::SEPARATOR;

/// What a find script prints when the program is present:
/// `{"name": "...", "version": "...", "path": "..."}`, every field optional.
#[derive(Debug, Default, Deserialize)]
struct FindReport {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Interpret a find script's stdout. Empty output means the program was not
/// found; a missing name falls back to `default_name`.
pub(crate) fn parse_report(
    output: &str,
    script: &str,
    default_name: &str,
) -> Result<Option<InstalledProgramInfo>, InstallerError> {
    let output = output.trim();
    if output.is_empty() {
        return Ok(None);
    }

    let wrap = |details: String| InstallerError::ScriptOutput {
        script: script.to_string(),
        details,
    };

    let report: FindReport = serde_json::from_str(output).map_err(|e| wrap(e.to_string()))?;
    let version = non_empty(report.version)
        .map(|v| v.parse::<Version>())
        .transpose()
        .map_err(|e| wrap(e.to_string()))?;
    let name = non_empty(report.name).unwrap_or_else(|| default_name.to_string());

    Ok(Some(InstalledProgramInfo::new(
        NamedVersion::new(SEPARATOR, name, version),
        non_empty(report.path),
    )))
}

#[cfg(test)]
mod tests {
    use installer_core::InstallerError;

    use super::parse_report;

    #[test]
    fn full_report_is_parsed() {
        let info = parse_report(
            r#"{"name":"terraform","version":"1.6.4","path":"/usr/local/bin/terraform"}"#,
            "terraform version -json",
            "script:abc",
        )
        .expect("valid report")
        .expect("program is present");

        assert_eq!(info.named_version.to_string(), "terraform=1.6.4");
        assert_eq!(info.path.as_deref(), Some("/usr/local/bin/terraform"));
    }

    #[test]
    fn empty_output_means_absent() {
        assert_eq!(parse_report("", "true", "script:abc"), Ok(None));
        assert_eq!(parse_report(" \n", "true", "script:abc"), Ok(None));
    }

    #[test]
    fn missing_fields_fall_back() {
        let info = parse_report("{}", "echo {}", "script:abc")
            .expect("valid report")
            .expect("program is present");

        assert_eq!(info.named_version.name, "script:abc");
        assert_eq!(info.named_version.version, None);
        assert_eq!(info.path, None);
    }

    #[test]
    fn malformed_json_names_the_script() {
        let err = parse_report("installed!", "echo installed!", "script:abc")
            .expect_err("non-JSON output should fail");

        assert!(matches!(
            &err,
            InstallerError::ScriptOutput { script, .. } if script == "echo installed!"
        ));
        assert!(!err.is_absent());
    }

    #[test]
    fn bad_version_is_reported_as_script_output() {
        let err = parse_report(r#"{"version":"latest"}"#, "probe", "script:abc")
            .expect_err("unparsable version should fail");

        assert!(matches!(err, InstallerError::ScriptOutput { .. }));
    }
}
