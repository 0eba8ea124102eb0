use installer_core::ScriptOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Install,
    Find,
    Uninstall,
}

impl Action {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Find => "find",
            Self::Uninstall => "uninstall",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The script that runs for an action. `shared` marks the fallback to the
/// record's default script, which is told the action as an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Selected<'a> {
    pub(crate) body: &'a str,
    pub(crate) shared: bool,
}

fn non_empty(script: Option<&str>) -> Option<&str> {
    script.filter(|body| !body.trim().is_empty())
}

pub(crate) fn select<O: ScriptOptions + ?Sized>(options: &O, action: Action) -> Option<Selected<'_>> {
    let dedicated = match action {
        Action::Install => options.install_script(),
        Action::Find => options.find_installed_script(),
        Action::Uninstall => options.uninstall_script(),
    };

    non_empty(dedicated)
        .map(|body| Selected {
            body,
            shared: false,
        })
        .or_else(|| {
            non_empty(options.default_script()).map(|body| Selected { body, shared: true })
        })
}
