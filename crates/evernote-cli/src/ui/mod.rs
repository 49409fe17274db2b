//! UI primitives for the Evernote CLI.
//!
//! - **Context**: Environment detection (TTY, width, color, unicode)
//! - **Mode**: Output mode resolution (json, plain, pretty)
//! - **Theme**: Badge tokens, styles
//! - **Render**: Tables, headers, receipts, hints, key-value lines
//! - **Progress**: Spinner while waiting on the network or the browser
//! - **Format**: String utilities (truncate, wrap, sizes, timestamps)

mod context;
pub mod format;
mod mode;
pub mod progress;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use mode::OutputMode;
pub use theme::Badge;

pub use render::{badge, blank_line, header, hint, kv, print, print_error, receipt, simple_table, Column};

pub use progress::Spinner;

pub use format::{format_bytes, format_timestamp, truncate};
