//! `paperstack-cli` — command implementations for the `pstack` binary.

pub mod context;
pub mod exit_codes;
pub mod init;
pub mod render;
pub mod update;
pub mod validate;

/// Error carrying a registry exit code; the binary prints `message` (and
/// `hint`, when present) to stderr and exits with `code`.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
