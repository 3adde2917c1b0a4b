//! Local credential helpers
//!
//! A credential helper is an external, already-authenticated program that
//! prints a short-lived access token on stdout.

use crate::error::AuthError;
use tokio::process::Command;
use tracing::debug;

/// Command line used when none is configured
pub const DEFAULT_HELPER_COMMAND: &str = "gcloud auth print-access-token";

/// Source of a raw access token string
#[async_trait::async_trait]
pub trait CredentialHelper: Send + Sync {
    async fn print_access_token(&self) -> Result<String, AuthError>;
}

/// Runs a program and takes its trimmed stdout as the token
#[derive(Debug, Clone)]
pub struct CommandCredentialHelper {
    program: String,
    args: Vec<String>,
}

impl CommandCredentialHelper {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line into program and arguments.
    /// No shell quoting is interpreted.
    pub fn from_command_line(command_line: &str) -> Result<Self, AuthError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| AuthError::SubprocessFailure {
            command: command_line.to_string(),
            reason: "empty command line".to_string(),
        })?;
        Ok(Self::new(program, parts.collect()))
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn failure(&self, reason: impl Into<String>) -> AuthError {
        AuthError::SubprocessFailure {
            command: self.command_line(),
            reason: reason.into(),
        }
    }
}

impl Default for CommandCredentialHelper {
    fn default() -> Self {
        Self::new("gcloud", vec!["auth".to_string(), "print-access-token".to_string()])
    }
}

#[async_trait::async_trait]
impl CredentialHelper for CommandCredentialHelper {
    async fn print_access_token(&self) -> Result<String, AuthError> {
        debug!("Running credential helper: {}", self.command_line());

        let output = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.failure(format!("cannot spawn: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure(format!("{} - {}", output.status, stderr.trim())));
        }

        let token = String::from_utf8(output.stdout)
            .map_err(|e| self.failure(format!("stdout is not UTF-8: {e}")))?
            .trim()
            .to_string();

        if token.is_empty() {
            return Err(self.failure("printed no token"));
        }

        Ok(token)
    }
}
