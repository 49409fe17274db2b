//! Error types for evernote-core operations.
//!
//! Errors are descriptive at the core level; the CLI layer adds the
//! operation name and maps them to exit codes and hints.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, EvernoteError>;

/// Core error type.
#[derive(Debug, Error)]
pub enum EvernoteError {
    /// Requesting, validating or exchanging authorization credentials failed
    #[error("Authorization failed: {0}")]
    Handshake(String),

    /// No redirect arrived before the handshake deadline
    #[error("Authorization timed out after {seconds} seconds waiting for the browser redirect")]
    HandshakeTimeout { seconds: u64 },

    /// Attachment file missing or unreadable
    #[error("Failed to read file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Note content has no closing root tag to splice into
    #[error("Malformed note content: {0}")]
    MalformedDocument(String),

    /// Exception raised by the Evernote service
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Wire format could not be decoded
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// HTTP transport failure or unexpected status
    #[error("Network error: {0}")]
    Network(String),

    /// Local filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for EvernoteError {
    fn from(err: reqwest::Error) -> Self {
        EvernoteError::Network(err.to_string())
    }
}

/// EDAM error codes shared by user and system exceptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const PERMISSION_DENIED: ErrorCode = ErrorCode(3);
    pub const INVALID_AUTH: ErrorCode = ErrorCode(8);
    pub const AUTH_EXPIRED: ErrorCode = ErrorCode(9);
    pub const RATE_LIMIT_REACHED: ErrorCode = ErrorCode(19);

    /// Symbolic name as used in the EDAM definitions.
    pub fn name(&self) -> &'static str {
        match self.0 {
            1 => "UNKNOWN",
            2 => "BAD_DATA_FORMAT",
            3 => "PERMISSION_DENIED",
            4 => "INTERNAL_ERROR",
            5 => "DATA_REQUIRED",
            6 => "LIMIT_REACHED",
            7 => "QUOTA_REACHED",
            8 => "INVALID_AUTH",
            9 => "AUTH_EXPIRED",
            10 => "DATA_CONFLICT",
            11 => "ENML_VALIDATION",
            12 => "SHARD_UNAVAILABLE",
            13 => "LEN_TOO_SHORT",
            14 => "LEN_TOO_LONG",
            15 => "TOO_FEW",
            16 => "TOO_MANY",
            17 => "UNSUPPORTED_OPERATION",
            18 => "TAKEN_DOWN",
            19 => "RATE_LIMIT_REACHED",
            20 => "BUSINESS_SECURITY_LOGIN_REQUIRED",
            21 => "DEVICE_LIMIT_REACHED",
            _ => "UNRECOGNIZED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Exceptions declared by the EDAM services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// EDAMUserException: the request was invalid
    User {
        code: ErrorCode,
        parameter: Option<String>,
    },
    /// EDAMSystemException: the service could not complete the request
    System {
        code: ErrorCode,
        message: Option<String>,
        rate_limit_duration: Option<i32>,
    },
    /// EDAMNotFoundException: a referenced object does not exist
    NotFound {
        identifier: Option<String>,
        key: Option<String>,
    },
}

impl ApiError {
    /// Whether the error means the stored credential is no longer usable.
    pub fn is_auth_error(&self) -> bool {
        match self {
            ApiError::User { code, .. } | ApiError::System { code, .. } => {
                *code == ErrorCode::INVALID_AUTH || *code == ErrorCode::AUTH_EXPIRED
            }
            ApiError::NotFound { .. } => false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::System {
                code,
                message,
                rate_limit_duration,
            } if *code == ErrorCode::RATE_LIMIT_REACHED => {
                let message = message.as_deref().unwrap_or_default();
                if message.contains("RTE room has already been open") {
                    return write!(
                        f,
                        "note is currently open in Evernote, close it there first then retry"
                    );
                }
                match rate_limit_duration {
                    Some(seconds) if *seconds > 0 => write!(
                        f,
                        "rate limited by Evernote, try again in {} seconds",
                        seconds
                    ),
                    _ => write!(f, "rate limited by Evernote: {}", message),
                }
            }
            ApiError::System { code, message, .. } => match message.as_deref() {
                Some(message) if !message.is_empty() => {
                    write!(f, "Evernote system error ({}): {}", code, message)
                }
                _ => write!(f, "Evernote system error: {}", code),
            },
            ApiError::User { code, parameter } => match parameter.as_deref() {
                Some(parameter) if !parameter.is_empty() => {
                    write!(f, "invalid request ({}): {}", code, parameter)
                }
                _ => write!(f, "invalid request: {}", code),
            },
            ApiError::NotFound { identifier, key } => {
                match (identifier.as_deref(), key.as_deref()) {
                    (Some(id), Some(key)) if !id.is_empty() && !key.is_empty() => {
                        write!(f, "not found: {} = {}", id, key)
                    }
                    (Some(id), _) if !id.is_empty() => write!(f, "not found: {}", id),
                    _ => write!(f, "not found"),
                }
            }
        }
    }
}

impl std::error::Error for ApiError {}
