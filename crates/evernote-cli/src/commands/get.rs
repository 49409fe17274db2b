use anyhow::Context;

use evernote_core::store::{Note, NoteFetch, NoteStore};

use crate::app::AppContext;
use crate::cli::GetArgs;
use crate::output::{note_json, print_json, print_note};

/// Fetch a note with its content; attachment bodies are left on the server.
pub async fn fetch_note(store: &dyn NoteStore, guid: &str) -> anyhow::Result<Note> {
    store
        .get_note(guid, NoteFetch::content())
        .await
        .context("Failed to get note")
}

pub async fn handle_get(ctx: &AppContext<'_>, args: &GetArgs) -> anyhow::Result<()> {
    let store = ctx.note_store().await?;
    let note = fetch_note(&store, &args.guid).await?;

    let ui = ctx.ui_context();
    if ui.mode.is_json() {
        print_json(&note_json(&note)?)?;
    } else {
        print_note(&ui, &note, ctx.quiet());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use evernote_core::store::{Data, MemoryNoteStore, Resource};
    use evernote_core::{ApiError, EvernoteError};

    #[tokio::test]
    async fn test_fetch_note_omits_resource_bodies() {
        let store = MemoryNoteStore::new();
        let guid = store.insert_note(Note {
            title: Some("Trip".into()),
            content: Some("<en-note>pack</en-note>".into()),
            resources: Some(vec![Resource {
                data: Some(Data {
                    body: Some(vec![1, 2, 3]),
                    size: Some(3),
                    ..Data::default()
                }),
                ..Resource::default()
            }]),
            ..Note::default()
        });

        let note = fetch_note(&store, &guid).await.unwrap();
        assert_eq!(note.content.as_deref(), Some("<en-note>pack</en-note>"));
        let resources = note.resources.unwrap();
        assert!(resources[0].body().is_none());
        assert_eq!(resources[0].size(), Some(3));
    }

    #[tokio::test]
    async fn test_unknown_guid_keeps_not_found() {
        let store = MemoryNoteStore::new();
        let err = fetch_note(&store, "nope").await.unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "Failed to get note: not found: Note.guid = nope"
        );
        assert!(matches!(
            err.downcast_ref::<EvernoteError>(),
            Some(EvernoteError::Api(ApiError::NotFound { .. }))
        ));
    }
}
