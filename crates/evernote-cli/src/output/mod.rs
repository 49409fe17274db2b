//! Output formatting helpers for the CLI.
//!
//! JSON output is pretty-printed `serde_json`; text output goes through the
//! `ui` renderers so it follows the resolved output mode.

mod json;
mod text;

pub use json::{note_json, print_json};
pub use text::{print_note, print_note_receipt, print_notebooks, print_search_results, print_tags};
