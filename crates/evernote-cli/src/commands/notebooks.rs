use anyhow::Context;

use evernote_core::store::{NoteStore, Notebook};

use crate::app::AppContext;
use crate::output::{print_json, print_notebooks};

/// Notebooks sorted by stack, then name, case-insensitively.
pub async fn list_notebooks(store: &dyn NoteStore) -> anyhow::Result<Vec<Notebook>> {
    let mut notebooks = store
        .list_notebooks()
        .await
        .context("Failed to list notebooks")?;
    notebooks.sort_by_cached_key(|nb| {
        (
            nb.stack.as_deref().unwrap_or_default().to_lowercase(),
            nb.name.as_deref().unwrap_or_default().to_lowercase(),
        )
    });
    Ok(notebooks)
}

pub async fn handle_notebooks(ctx: &AppContext<'_>) -> anyhow::Result<()> {
    let store = ctx.note_store().await?;
    let notebooks = list_notebooks(&store).await?;

    let ui = ctx.ui_context();
    if ui.mode.is_json() {
        print_json(&notebooks)
    } else {
        print_notebooks(&ui, &notebooks, ctx.quiet());
        Ok(())
    }
}
