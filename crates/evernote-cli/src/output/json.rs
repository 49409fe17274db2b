//! JSON output formatting.

use serde::Serialize;

use evernote_core::enml::{strip_to_plain_text, NoteDocument};
use evernote_core::store::Note;

/// Print any serializable value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A note plus its display text, for `get --json`.
pub fn note_json(note: &Note) -> anyhow::Result<serde_json::Value> {
    let mut value = serde_json::to_value(note)?;
    if let (Some(content), Some(map)) = (note.content.as_deref(), value.as_object_mut()) {
        let text = strip_to_plain_text(&NoteDocument::from_enml(content));
        map.insert("text".to_string(), serde_json::Value::String(text));
    }
    Ok(value)
}
