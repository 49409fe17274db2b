//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (clap usage errors)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, note, resource, attachment file).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (rejected consumer key, expired or revoked token).
    pub const AUTH_FAILED: i32 = 5;

    /// The browser redirect never arrived.
    pub const AUTH_TIMEOUT: i32 = 6;
}

/// Default page size for `search`.
pub const DEFAULT_SEARCH_LIMIT: i32 = 100;

/// Largest page `findNotesMetadata` accepts.
pub const MAX_SEARCH_LIMIT: i32 = 250;

/// Overrides the config file location.
pub const ENV_CONFIG: &str = "EVERNOTE_CONFIG";

/// Overrides the stored consumer key for `auth`.
pub const ENV_CLIENT_ID: &str = "EVERNOTE_CLIENT_ID";

/// Overrides the stored consumer secret for `auth`.
pub const ENV_CLIENT_SECRET: &str = "EVERNOTE_CLIENT_SECRET";
