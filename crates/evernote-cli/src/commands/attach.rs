use std::path::PathBuf;

use anyhow::Context;

use evernote_core::enml::{splice_media_references, wrap_plain_text, NoteDocument};
use evernote_core::resource::build_attachment;
use evernote_core::store::{Note, NoteFetch, NoteStore, Resource};

use crate::app::AppContext;
use crate::cli::AttachArgs;
use crate::output::{print_json, print_note_receipt};

/// Add files to an existing note.
///
/// The note is fetched with its resource bodies because the update replaces
/// the whole resource list; existing resources are sent back first, then the
/// new ones.
pub async fn attach_files(
    store: &dyn NoteStore,
    guid: &str,
    files: &[PathBuf],
) -> anyhow::Result<Note> {
    let mut added: Vec<Resource> = Vec::with_capacity(files.len());
    let mut references = Vec::with_capacity(files.len());
    for path in files {
        let (attachment, _hash) = build_attachment(path)?;
        references.push(attachment.media_reference());
        added.push(attachment.into());
    }

    let existing = store
        .get_note(guid, NoteFetch::content_and_resources())
        .await
        .context("Failed to get note")?;

    let document = match existing.content {
        Some(content) => NoteDocument::from_enml(content),
        None => wrap_plain_text(""),
    };
    let document = splice_media_references(&document, &references)?;

    let mut resources = existing.resources.unwrap_or_default();
    resources.extend(added);

    let note = Note {
        guid: Some(guid.to_string()),
        title: existing.title,
        content: Some(document.into_string()),
        resources: Some(resources),
        ..Note::default()
    };

    tracing::info!(guid, files = files.len(), "attaching files");
    store
        .update_note(&note)
        .await
        .context("Failed to attach files")
}

pub async fn handle_attach(ctx: &AppContext<'_>, args: &AttachArgs) -> anyhow::Result<()> {
    let store = ctx.note_store().await?;
    let note = attach_files(&store, &args.guid, &args.files).await?;

    let ui = ctx.ui_context();
    if ui.mode.is_json() {
        print_json(&note)?;
    } else {
        let title = format!("Attached {} file(s)", args.files.len());
        print_note_receipt(&ui, &title, &note);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use evernote_core::resource::ContentHash;
    use evernote_core::store::{Data, MemoryNoteStore, ResourceAttributes};
    use tempfile::TempDir;

    fn existing_resource() -> Resource {
        Resource {
            mime: Some("text/plain".into()),
            data: Some(Data {
                body: Some(b"old".to_vec()),
                body_hash: Some(ContentHash::of(b"old").as_bytes().to_vec()),
                size: Some(3),
            }),
            attributes: Some(ResourceAttributes {
                file_name: Some("old.txt".into()),
                attachment: Some(true),
            }),
            ..Resource::default()
        }
    }

    #[tokio::test]
    async fn test_attach_keeps_existing_resources() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"png-bytes").unwrap();

        let store = MemoryNoteStore::new();
        let guid = store.insert_note(Note {
            title: Some("Album".into()),
            content: Some("<en-note>pics</en-note>".into()),
            resources: Some(vec![existing_resource()]),
            ..Note::default()
        });

        attach_files(&store, &guid, &[path]).await.unwrap();

        let stored = store.note(&guid).unwrap();
        let resources = stored.resources.unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].file_name(), Some("old.txt"));
        assert_eq!(resources[0].body(), Some(&b"old"[..]));
        assert_eq!(resources[1].file_name(), Some("photo.png"));
        assert_eq!(stored.title.as_deref(), Some("Album"));

        let hash = ContentHash::of(b"png-bytes").to_hex();
        assert_eq!(
            stored.content.as_deref(),
            Some(format!("<en-note>pics<en-media type=\"image/png\" hash=\"{}\"/></en-note>", hash).as_str())
        );
    }

    #[tokio::test]
    async fn test_attach_to_malformed_note_fails_without_update() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"a").unwrap();

        let store = MemoryNoteStore::new();
        let guid = store.insert_note(Note {
            title: Some("Broken".into()),
            content: Some("<en-note>no close".into()),
            ..Note::default()
        });

        assert!(attach_files(&store, &guid, &[path]).await.is_err());
        assert_eq!(store.update_calls(), 0);
        assert_eq!(store.note(&guid).unwrap().content.as_deref(), Some("<en-note>no close"));
    }

    #[tokio::test]
    async fn test_attach_missing_file_skips_network() {
        let dir = TempDir::new().unwrap();
        let store = MemoryNoteStore::new();
        let guid = store.insert_note(Note {
            title: Some("x".into()),
            ..Note::default()
        });

        let err = attach_files(&store, &guid, &[dir.path().join("nope.bin")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nope.bin"));
        assert_eq!(store.update_calls(), 0);
    }
}
