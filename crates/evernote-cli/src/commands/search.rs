use anyhow::Context;

use evernote_core::store::{NoteFilter, NoteStore, NotesMetadataList, NotesMetadataResultSpec};

use crate::app::AppContext;
use crate::cli::SearchArgs;
use crate::constants::MAX_SEARCH_LIMIT;
use crate::errors::CliError;
use crate::output::{print_json, print_search_results};

/// Filter for a search in the service's query grammar.
pub fn build_filter(query: &str) -> NoteFilter {
    NoteFilter {
        words: Some(query.to_string()),
        ..NoteFilter::default()
    }
}

pub async fn search_notes(
    store: &dyn NoteStore,
    query: &str,
    offset: i32,
    limit: i32,
) -> anyhow::Result<NotesMetadataList> {
    if offset < 0 {
        return Err(CliError::invalid_input("--offset must not be negative").into());
    }
    if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
        return Err(CliError::invalid_input(format!(
            "--limit must be between 1 and {}",
            MAX_SEARCH_LIMIT
        ))
        .into());
    }

    tracing::debug!(query, offset, limit, "searching notes");
    store
        .find_notes_metadata(
            &build_filter(query),
            offset,
            limit,
            &NotesMetadataResultSpec::listing(),
        )
        .await
        .context("Failed to search notes")
}

pub async fn handle_search(ctx: &AppContext<'_>, args: &SearchArgs) -> anyhow::Result<()> {
    let query = args.query.join(" ");
    let store = ctx.note_store().await?;
    let results = search_notes(&store, &query, args.offset, args.limit).await?;

    let ui = ctx.ui_context();
    if ui.mode.is_json() {
        print_json(&results)
    } else {
        print_search_results(&ui, &query, &results, ctx.quiet());
        Ok(())
    }
}
