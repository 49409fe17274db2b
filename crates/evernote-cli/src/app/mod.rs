//! Application-level utilities for the Evernote CLI.
//!
//! This module provides:
//! - Config path resolution and loading
//! - The per-invocation `AppContext`

mod context;
mod resolver;

pub use context::AppContext;
pub use resolver::{load_config, missing_config_message, resolve_config_path};
