//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use evernote_core::{ApiError, EvernoteError};

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, note, attachment file)
    NotFound { message: String, hint: String },

    /// Authentication failed (rejected key, expired token)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }
}

/// Exit code for a core error.
pub fn core_exit_code(err: &EvernoteError) -> i32 {
    match err {
        EvernoteError::HandshakeTimeout { .. } => exit_codes::AUTH_TIMEOUT,
        EvernoteError::Handshake(_) => exit_codes::AUTH_FAILED,
        EvernoteError::FileRead { .. } => exit_codes::NOT_FOUND,
        EvernoteError::Api(ApiError::NotFound { .. }) => exit_codes::NOT_FOUND,
        EvernoteError::Api(api) if api.is_auth_error() => exit_codes::AUTH_FAILED,
        _ => 1,
    }
}

/// Walk an error chain and pick the exit code of the first typed error found.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(cli) = cause.downcast_ref::<CliError>() {
            return cli.exit_code();
        }
        if let Some(core) = cause.downcast_ref::<EvernoteError>() {
            return core_exit_code(core);
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use evernote_core::error::ErrorCode;

    #[test]
    fn test_cli_error_exit_codes() {
        assert_eq!(CliError::not_found("x", "y").exit_code(), exit_codes::NOT_FOUND);
        assert_eq!(CliError::invalid_input("x").exit_code(), exit_codes::INVALID_INPUT);
        assert_eq!(
            CliError::auth_failed_with_hint("x", "y").exit_code(),
            exit_codes::AUTH_FAILED
        );
    }

    #[test]
    fn test_exit_code_through_context() {
        let err: anyhow::Result<()> = Err(EvernoteError::HandshakeTimeout { seconds: 300 }.into());
        let err = err.context("Authorization failed").unwrap_err();
        assert_eq!(exit_code_for(&err), exit_codes::AUTH_TIMEOUT);
    }

    #[test]
    fn test_not_found_api_error() {
        let err = anyhow::Error::from(EvernoteError::Api(ApiError::NotFound {
            identifier: Some("Note.guid".into()),
            key: Some("abc".into()),
        }));
        assert_eq!(exit_code_for(&err), exit_codes::NOT_FOUND);
    }

    #[test]
    fn test_expired_token_is_auth_failure() {
        let err = anyhow::Error::from(EvernoteError::Api(ApiError::User {
            code: ErrorCode::AUTH_EXPIRED,
            parameter: None,
        }));
        assert_eq!(exit_code_for(&err), exit_codes::AUTH_FAILED);
    }

    #[test]
    fn test_untyped_error_is_general_failure() {
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), 1);
    }
}
