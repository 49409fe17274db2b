use anyhow::Context;

use evernote_core::store::{NoteStore, Tag};

use crate::app::AppContext;
use crate::output::{print_json, print_tags};

/// Tags sorted by name, case-insensitively.
pub async fn list_tags(store: &dyn NoteStore) -> anyhow::Result<Vec<Tag>> {
    let mut tags = store.list_tags().await.context("Failed to list tags")?;
    tags.sort_by_cached_key(|tag| tag.name.as_deref().unwrap_or_default().to_lowercase());
    Ok(tags)
}

pub async fn handle_tags(ctx: &AppContext<'_>) -> anyhow::Result<()> {
    let store = ctx.note_store().await?;
    let tags = list_tags(&store).await?;

    let ui = ctx.ui_context();
    if ui.mode.is_json() {
        print_json(&tags)
    } else {
        print_tags(&ui, &tags, ctx.quiet());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evernote_core::error::ErrorCode;
    use evernote_core::store::MemoryNoteStore;
    use evernote_core::ApiError;

    #[tokio::test]
    async fn test_tags_are_sorted() {
        let store = MemoryNoteStore::new();
        store.add_tag("zeta");
        store.add_tag("Alpha");

        let names: Vec<String> = list_tags(&store)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_expired_token_surfaces() {
        let store = MemoryNoteStore::new();
        store.fail_next(ApiError::User {
            code: ErrorCode::AUTH_EXPIRED,
            parameter: None,
        });
        let err = list_tags(&store).await.unwrap_err();
        assert!(format!("{:#}", err).contains("AUTH_EXPIRED"));
    }
}
