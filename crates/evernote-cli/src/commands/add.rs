use std::path::PathBuf;

use anyhow::Context;

use evernote_core::enml::{splice_media_references, wrap_plain_text, wrap_rich_text};
use evernote_core::resource::build_attachment;
use evernote_core::store::{Note, NoteStore, Resource};

use crate::app::AppContext;
use crate::cli::AddArgs;
use crate::output::{print_json, print_note_receipt};

use super::normalize_tags;

/// Body of a new note.
pub enum NoteBody<'a> {
    /// Text that is escaped before wrapping.
    Plain(&'a str),
    /// ENML/XHTML fragment used as-is.
    Rich(&'a str),
}

pub struct NewNote<'a> {
    pub title: &'a str,
    pub body: NoteBody<'a>,
    pub notebook_guid: Option<&'a str>,
    pub tags: Vec<String>,
    pub attachments: &'a [PathBuf],
}

/// Build the note (attachments first, so a bad path fails before any
/// request) and create it.
pub async fn create_note(store: &dyn NoteStore, new: &NewNote<'_>) -> anyhow::Result<Note> {
    let mut resources: Vec<Resource> = Vec::with_capacity(new.attachments.len());
    let mut references = Vec::with_capacity(new.attachments.len());
    for path in new.attachments {
        let (attachment, _hash) = build_attachment(path)?;
        references.push(attachment.media_reference());
        resources.push(attachment.into());
    }

    let mut document = match new.body {
        NoteBody::Plain(text) => wrap_plain_text(text),
        NoteBody::Rich(markup) => wrap_rich_text(markup),
    };
    if !references.is_empty() {
        document = splice_media_references(&document, &references)?;
    }

    let note = Note {
        title: Some(new.title.to_string()),
        content: Some(document.into_string()),
        notebook_guid: new.notebook_guid.map(str::to_string),
        tag_names: (!new.tags.is_empty()).then(|| new.tags.clone()),
        resources: (!resources.is_empty()).then_some(resources),
        ..Note::default()
    };

    tracing::info!(attachments = new.attachments.len(), "creating note");
    store.create_note(&note).await.context("Failed to create note")
}

pub async fn handle_add(ctx: &AppContext<'_>, args: &AddArgs) -> anyhow::Result<()> {
    let body = match (&args.body, &args.html) {
        (_, Some(html)) => NoteBody::Rich(html),
        (Some(text), None) => NoteBody::Plain(text),
        (None, None) => NoteBody::Plain(""),
    };
    let new = NewNote {
        title: &args.title,
        body,
        notebook_guid: args.notebook.as_deref(),
        tags: normalize_tags(&args.tags),
        attachments: &args.attach,
    };

    let store = ctx.note_store().await?;
    let note = create_note(&store, &new).await?;

    let ui = ctx.ui_context();
    if ui.mode.is_json() {
        print_json(&note)?;
    } else {
        print_note_receipt(&ui, "Note created", &note);
    }
    Ok(())
}
