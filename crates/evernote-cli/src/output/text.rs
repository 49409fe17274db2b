//! Text and table output formatting.

use evernote_core::enml::{strip_to_plain_text, NoteDocument};
use evernote_core::store::{Note, Notebook, NotesMetadataList, Tag};

use crate::ui::{
    blank_line, format_bytes, format_timestamp, header, hint, kv, print, receipt, simple_table,
    truncate, Column, UiContext,
};

/// Print a note: metadata, attachments, then the stripped body.
pub fn print_note(ui: &UiContext, note: &Note, quiet: bool) {
    let pretty = ui.mode.is_pretty();

    print(ui, &kv(ui, "Title", note.title.as_deref().unwrap_or("")));
    print(ui, &kv(ui, "GUID", note.guid.as_deref().unwrap_or("")));
    if let Some(notebook) = &note.notebook_guid {
        print(ui, &kv(ui, "Notebook", notebook));
    }
    match (&note.tag_names, &note.tag_guids) {
        (Some(names), _) if !names.is_empty() => print(ui, &kv(ui, "Tags", &names.join(", "))),
        (_, Some(guids)) if !guids.is_empty() => {
            print(ui, &kv(ui, "Tag GUIDs", &guids.join(", ")))
        }
        _ => {}
    }
    if let Some(created) = note.created {
        print(ui, &kv(ui, "Created", &format_timestamp(created, pretty)));
    }
    if let Some(updated) = note.updated {
        print(ui, &kv(ui, "Updated", &format_timestamp(updated, pretty)));
    }

    let resources = note.resources.as_deref().unwrap_or_default();
    if !resources.is_empty() {
        blank_line(ui);
        print(ui, &format!("Attachments ({}):", resources.len()));
        let rows: Vec<Vec<String>> = resources
            .iter()
            .map(|res| {
                vec![
                    res.file_name().unwrap_or("unnamed").to_string(),
                    res.guid.clone().unwrap_or_default(),
                    res.mime.clone().unwrap_or_default(),
                    res.size()
                        .map(|s| format_bytes(s.max(0) as u64))
                        .unwrap_or_default(),
                ]
            })
            .collect();
        let columns = [
            Column::new("FILE"),
            Column::new("GUID"),
            Column::new("MIME"),
            Column::new("SIZE"),
        ];
        print(ui, &simple_table(ui, &columns, &rows));
        if !quiet {
            print(ui, &hint(ui, "evernote-cli download <resource-guid>"));
        }
    }

    if let Some(content) = note.content.as_deref() {
        let text = strip_to_plain_text(&NoteDocument::from_enml(content));
        if !text.is_empty() {
            println!();
            println!("{}", text);
        }
    }
}

/// Print the summary after a note was created or changed.
pub fn print_note_receipt(ui: &UiContext, title: &str, note: &Note) {
    let guid = note.guid.as_deref().unwrap_or("");
    let note_title = note.title.as_deref().unwrap_or("");
    print(ui, &receipt(ui, title, &[("Title", note_title), ("GUID", guid)]));
}

pub fn print_notebooks(ui: &UiContext, notebooks: &[Notebook], quiet: bool) {
    if !quiet {
        print(ui, &header(ui, "notebooks", None));
    }
    if notebooks.is_empty() {
        print(ui, "No notebooks found.");
        return;
    }
    let rows: Vec<Vec<String>> = notebooks
        .iter()
        .map(|nb| {
            let mut name = nb.name.clone().unwrap_or_default();
            if nb.default_notebook == Some(true) {
                name.push_str(" (default)");
            }
            vec![
                nb.guid.clone().unwrap_or_default(),
                name,
                nb.stack.clone().unwrap_or_default(),
            ]
        })
        .collect();
    let columns = [Column::new("GUID"), Column::new("NAME"), Column::new("STACK")];
    print(ui, &simple_table(ui, &columns, &rows));
}

pub fn print_tags(ui: &UiContext, tags: &[Tag], quiet: bool) {
    if !quiet {
        print(ui, &header(ui, "tags", None));
    }
    if tags.is_empty() {
        print(ui, "No tags found.");
        return;
    }
    let rows: Vec<Vec<String>> = tags
        .iter()
        .map(|tag| {
            vec![
                tag.guid.clone().unwrap_or_default(),
                tag.name.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print(ui, &simple_table(ui, &[Column::new("GUID"), Column::new("NAME")], &rows));
}

pub fn print_search_results(ui: &UiContext, query: &str, results: &NotesMetadataList, quiet: bool) {
    if !quiet {
        print(ui, &header(ui, "search", Some(query)));
    }
    if results.notes.is_empty() {
        print(ui, "No notes found.");
        return;
    }

    let pretty = ui.mode.is_pretty();
    let title_width = ui.width.saturating_sub(60).max(20);
    let rows: Vec<Vec<String>> = results
        .notes
        .iter()
        .map(|note| {
            vec![
                note.guid.clone(),
                truncate(note.title.as_deref().unwrap_or(""), title_width),
                note.updated
                    .or(note.created)
                    .map(|ts| format_timestamp(ts, pretty))
                    .unwrap_or_default(),
            ]
        })
        .collect();
    let columns = [Column::new("GUID"), Column::new("TITLE"), Column::new("UPDATED")];
    print(ui, &simple_table(ui, &columns, &rows));

    if !quiet {
        let shown_to = results.start_index + results.notes.len() as i32;
        let summary = format!(
            "Showing {}-{} of {} note(s)",
            results.start_index + 1,
            shown_to,
            results.total_notes
        );
        blank_line(ui);
        print(ui, &kv(ui, "Results", &summary));
        if shown_to < results.total_notes {
            print(ui, &hint(ui, &format!("add --offset {} for more", shown_to)));
        }
    }
}
