use anyhow::Context;

use evernote_core::enml::{append_plain_text, wrap_plain_text, wrap_rich_text, NoteDocument};
use evernote_core::store::{Note, NoteFetch, NoteStore};

use crate::app::AppContext;
use crate::cli::UpdateArgs;
use crate::errors::CliError;
use crate::output::{print_json, print_note_receipt};

use super::normalize_tags;

/// How the body of a note changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentChange {
    /// Replace the whole document.
    Replace(NoteDocument),
    /// Add plain text after the existing body, keeping markup and attachments.
    Append(String),
}

/// Requested changes to an existing note.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<ContentChange>,
    pub tags: Option<Vec<String>>,
}

impl NoteChanges {
    /// Validate the flags of `update`: at least one change, one content source.
    pub fn from_args(args: &UpdateArgs) -> Result<Self, CliError> {
        let sources = [args.body.is_some(), args.html.is_some(), args.append.is_some()];
        if sources.iter().filter(|given| **given).count() > 1 {
            return Err(CliError::invalid_input(
                "--body, --html and --append cannot be used together",
            ));
        }

        let content = if let Some(text) = &args.body {
            Some(ContentChange::Replace(wrap_plain_text(text)))
        } else if let Some(markup) = &args.html {
            Some(ContentChange::Replace(wrap_rich_text(markup)))
        } else {
            args.append
                .as_ref()
                .filter(|text| !text.is_empty())
                .map(|text| ContentChange::Append(text.clone()))
        };

        let changes = Self {
            title: args.title.clone().filter(|title| !title.trim().is_empty()),
            content,
            tags: args
                .tags
                .as_deref()
                .map(normalize_tags)
                .filter(|tags| !tags.is_empty()),
        };

        if changes == Self::default() {
            return Err(CliError::invalid_input(
                "at least one of --title, --body, --html, --append or --tags is required",
            ));
        }
        Ok(changes)
    }
}

/// Apply `changes` to the note `guid`.
///
/// Resources are left out of the update so the service keeps them as they are.
pub async fn apply_changes(
    store: &dyn NoteStore,
    guid: &str,
    changes: NoteChanges,
) -> anyhow::Result<Note> {
    let existing = store
        .get_note(guid, NoteFetch::content())
        .await
        .context("Failed to get note")?;

    let content = match changes.content {
        Some(ContentChange::Replace(document)) => Some(document),
        Some(ContentChange::Append(text)) => Some(match existing.content {
            Some(content) => append_plain_text(&NoteDocument::from_enml(content), &text)?,
            None => wrap_plain_text(&text),
        }),
        None => None,
    };

    let note = Note {
        guid: Some(guid.to_string()),
        title: changes.title.or(existing.title),
        content: content.map(NoteDocument::into_string),
        tag_names: changes.tags,
        ..Note::default()
    };

    tracing::info!(guid, "updating note");
    store.update_note(&note).await.context("Failed to update note")
}

pub async fn handle_update(ctx: &AppContext<'_>, args: &UpdateArgs) -> anyhow::Result<()> {
    let changes = NoteChanges::from_args(args)?;

    let store = ctx.note_store().await?;
    let note = apply_changes(&store, &args.guid, changes).await?;

    let ui = ctx.ui_context();
    if ui.mode.is_json() {
        print_json(&note)?;
    } else {
        print_note_receipt(&ui, "Note updated", &note);
    }
    Ok(())
}
