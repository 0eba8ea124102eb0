use installer_core::InstallerError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A problem reported back to the front-end instead of aborting the
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn from_error(severity: Severity, error: &InstallerError) -> Self {
        Self {
            severity,
            summary: error.to_string(),
            detail: error.detail(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn push_error(&mut self, error: &InstallerError) {
        self.push(Diagnostic::from_error(Severity::Error, error));
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use installer_core::InstallerError;
    use installer_exec::ExecError;

    use super::{Diagnostic, Diagnostics, Severity};

    #[test]
    fn command_failure_detail_carries_output() {
        let error = InstallerError::Exec(ExecError::CommandFailed {
            command: "apt-get install nope".to_string(),
            status: Some(100),
            output: String::new(),
            detail: "E: Unable to locate package nope\n".to_string(),
        });

        let diagnostic = Diagnostic::from_error(Severity::Error, &error);

        assert_eq!(diagnostic.summary, "`apt-get install nope` exited with status 100");
        assert_eq!(diagnostic.detail, "E: Unable to locate package nope");
    }

    #[test]
    fn warnings_do_not_count_as_errors() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning("Session", "disconnect failed"));
        assert!(!diagnostics.has_error());

        diagnostics.push_error(&InstallerError::VersionNotFound);
        assert!(diagnostics.has_error());
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn serializes_as_plain_list() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning("w", "d"));

        let value = serde_json::to_value(&diagnostics).expect("diagnostics should serialize");

        assert_eq!(
            value,
            serde_json::json!([{ "severity": "warning", "summary": "w", "detail": "d" }])
        );
    }
}
