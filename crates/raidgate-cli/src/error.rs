//! CLI error classes and their exit codes.

use std::fmt::{self, Display, Formatter};

use raidgate_config::ConfigError;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub enum CliError {
    /// Bad flags or configuration.
    Validation(String),
    /// The run itself failed.
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) fn config(error: ConfigError) -> Self {
        Self::Validation(format!("{:#}", anyhow::Error::new(error)))
    }

    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    /// Message printed after `error:` on stderr.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn exit_codes_follow_error_class() {
        assert_eq!(CliError::validation("bad flag").exit_code(), 2);
        assert_eq!(
            CliError::failure(anyhow::anyhow!("sync failed")).exit_code(),
            3
        );
    }

    #[test]
    fn config_errors_include_their_source() {
        let err = CliError::config(ConfigError::Read {
            path: PathBuf::from("/etc/raidgate.yml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        });
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.display_message(),
            "failed to read config file /etc/raidgate.yml: No such file"
        );
    }

    #[test]
    fn display_matches_printed_message() {
        let err = CliError::validation("scrub.plan must be set");
        assert_eq!(err.to_string(), err.display_message());
        let err =
            CliError::failure(anyhow::anyhow!("disk full").context("snapraid sync failed"));
        assert_eq!(err.to_string(), "snapraid sync failed: disk full");
    }

    #[test]
    fn failure_message_uses_alternate_chain() {
        let err = CliError::failure(
            anyhow::anyhow!("disk full").context("snapraid sync failed"),
        );
        assert_eq!(err.display_message(), "snapraid sync failed: disk full");
    }
}
