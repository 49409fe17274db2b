//! # Evernote Core
//!
//! Core library for evernote-cli - a command-line client for the Evernote
//! note-storage API.
//!
//! This crate provides the authorization handshake, the ENML content
//! transforms, attachment building and the note-store client, independent of
//! the CLI interface.
//!
//! ## Architecture
//!
//! - **auth**: OAuth 1.0a handshake (temporary credential, local callback
//!   listener, browser handoff, token exchange)
//! - **enml**: Note envelope wrapping, display stripping, media reference splicing
//! - **resource**: Attachment resources built from local files
//! - **store**: `NoteStore` trait and the EDAM Thrift client
//! - **fs**: Atomic file writes

pub mod auth;
pub mod enml;
pub mod error;
pub mod fs;
pub mod resource;
pub mod store;

pub use error::{ApiError, EvernoteError, Result};
pub use store::NoteStore;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
