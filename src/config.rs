//! Runtime configuration shared by the server binary and the app state.

use std::fmt::Display;

use clap::ValueEnum;

/// Whether the server runs on a developer machine or in production.
///
/// Production mode marks cookies as `Secure` and never reveals the cause of
/// internal errors to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RuntimeMode {
    /// Plain HTTP friendly cookies, internal error details in responses.
    Development,
    /// Secure cookies, generic internal error responses.
    #[default]
    Production,
}

impl RuntimeMode {
    /// Whether cookies should only be sent over HTTPS.
    pub fn secure_cookies(self) -> bool {
        self == RuntimeMode::Production
    }
}

impl Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeMode::Development => write!(f, "development"),
            RuntimeMode::Production => write!(f, "production"),
        }
    }
}
