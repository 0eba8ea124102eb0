use std::collections::BTreeMap;

/// Separator used to join an argv into the single command string a remote
/// session executes.
pub const PARAM_SEPARATOR: &str = " ";

const SUDO: &str = "sudo";

/// Render `KEY="value"`, escaping the characters a POSIX shell still
/// interprets inside double quotes.
#[must_use]
pub fn env_assignment(key: &str, value: &str) -> String {
    let mut rendered = String::with_capacity(key.len() + value.len() + 3);
    rendered.push_str(key);
    rendered.push_str("=\"");
    for ch in value.chars() {
        if matches!(ch, '"' | '\\' | '$' | '`') {
            rendered.push('\\');
        }
        rendered.push(ch);
    }
    rendered.push('"');
    rendered
}

/// Wrap `text` in single quotes so a shell reads it back as one literal
/// word. Embedded single quotes become `'\''`.
#[must_use]
pub fn shell_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    quoted.push_str(&text.replace('\'', r"'\''"));
    quoted.push('\'');
    quoted
}

/// [`shell_quote`] for a single argument, leaving words that no shell would
/// split or expand as they are.
#[must_use]
pub fn shell_word(text: &str) -> String {
    let plain = !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"-_./=:,@%+".contains(&b));
    if plain {
        text.to_string()
    } else {
        shell_quote(text)
    }
}

/// What a local spawn needs: the program, its arguments and the variables to
/// add to the inherited process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

/// Describes how one package-manager program is invoked: whether it needs
/// privilege escalation and which variables it runs with. Built per backend,
/// rendered per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    sudo: bool,
    env: BTreeMap<String, String>,
}

impl CommandLine {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            sudo: false,
            env: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_sudo(mut self, sudo: bool) -> Self {
        self.sudo = sudo;
        self
    }

    #[must_use]
    pub fn with_environment(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn sudo(&self) -> bool {
        self.sudo
    }

    #[must_use]
    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Local spawn. Without sudo the variables go into the process
    /// environment. sudo resets the environment, so they are passed to it as
    /// `KEY=value` arguments instead; no shell is involved, so they are not
    /// quoted.
    #[must_use]
    pub fn local_invocation(&self, args: &[String]) -> LocalInvocation {
        if !self.sudo {
            return LocalInvocation {
                program: self.program.clone(),
                args: args.to_vec(),
                env: self
                    .env
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            };
        }

        let mut sudo_args: Vec<String> = self
            .env
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        sudo_args.push(self.program.clone());
        sudo_args.extend_from_slice(args);

        LocalInvocation {
            program: SUDO.to_string(),
            args: sudo_args,
            env: Vec::new(),
        }
    }

    /// Argv for a remote shell: `[sudo] KEY="value"... program args...`.
    #[must_use]
    pub fn remote_argv(&self, args: &[String]) -> Vec<String> {
        self.render(args, |key, value| env_assignment(key, value))
    }

    #[must_use]
    pub fn remote_command(&self, args: &[String]) -> String {
        self.remote_argv(args).join(PARAM_SEPARATOR)
    }

    /// The command as shown in logs and errors. Variable values are masked
    /// since they may carry credentials.
    #[must_use]
    pub fn describe(&self, args: &[String]) -> String {
        self.render(args, |key, _| format!("{key}=***"))
            .join(PARAM_SEPARATOR)
    }

    fn render(&self, args: &[String], assignment: impl Fn(&str, &str) -> String) -> Vec<String> {
        let mut argv = Vec::with_capacity(args.len() + self.env.len() + 2);
        if self.sudo {
            argv.push(SUDO.to_string());
        }
        argv.extend(self.env.iter().map(|(key, value)| assignment(key, value)));
        argv.push(self.program.clone());
        argv.extend_from_slice(args);
        argv
    }
}
