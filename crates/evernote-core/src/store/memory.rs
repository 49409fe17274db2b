//! In-memory `NoteStore` for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::types::{
    Note, NoteFilter, NoteMetadata, Notebook, NotesMetadataList, NotesMetadataResultSpec,
    Resource, Tag,
};
use super::{NoteFetch, NoteStore, ResourceFetch};
use crate::error::{ApiError, ErrorCode, EvernoteError, Result};

#[derive(Debug, Default)]
struct State {
    notebooks: Vec<Notebook>,
    tags: Vec<Tag>,
    notes: Vec<Note>,
    usn: i32,
    update_calls: usize,
    fail_next: Option<ApiError>,
}

impl State {
    fn next_usn(&mut self) -> i32 {
        self.usn += 1;
        self.usn
    }

    fn take_failure(&mut self) -> Result<()> {
        match self.fail_next.take() {
            Some(err) => Err(EvernoteError::Api(err)),
            None => Ok(()),
        }
    }

    fn default_notebook_guid(&mut self) -> String {
        if let Some(guid) = self
            .notebooks
            .iter()
            .find(|nb| nb.default_notebook == Some(true))
            .and_then(|nb| nb.guid.clone())
        {
            return guid;
        }
        let guid = Uuid::new_v4().to_string();
        let usn = self.next_usn();
        self.notebooks.push(Notebook {
            guid: Some(guid.clone()),
            name: Some("Notes".to_string()),
            default_notebook: Some(true),
            update_sequence_num: Some(usn),
            ..Notebook::default()
        });
        guid
    }

    /// Resolve tag names to guids, creating tags that do not exist yet.
    fn tag_guids_for(&mut self, names: &[String]) -> Vec<String> {
        let mut guids = Vec::with_capacity(names.len());
        for name in names {
            let existing = self
                .tags
                .iter()
                .find(|tag| tag.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
                .and_then(|tag| tag.guid.clone());
            let guid = match existing {
                Some(guid) => guid,
                None => {
                    let guid = Uuid::new_v4().to_string();
                    let usn = self.next_usn();
                    self.tags.push(Tag {
                        guid: Some(guid.clone()),
                        name: Some(name.clone()),
                        update_sequence_num: Some(usn),
                        ..Tag::default()
                    });
                    guid
                }
            };
            guids.push(guid);
        }
        guids
    }

    fn prepare_resources(&mut self, note_guid: &str, resources: &mut [Resource]) {
        for resource in resources {
            if resource.guid.is_none() {
                resource.guid = Some(Uuid::new_v4().to_string());
            }
            resource.note_guid = Some(note_guid.to_string());
            resource.active = Some(true);
            resource.update_sequence_num = Some(self.next_usn());
        }
    }
}

fn not_found(identifier: &str, key: &str) -> EvernoteError {
    EvernoteError::Api(ApiError::NotFound {
        identifier: Some(identifier.to_string()),
        key: Some(key.to_string()),
    })
}

fn data_required(parameter: &str) -> EvernoteError {
    EvernoteError::Api(ApiError::User {
        code: ErrorCode(5),
        parameter: Some(parameter.to_string()),
    })
}

fn shaped_resource(resource: &Resource, with_data: bool, with_attributes: bool) -> Resource {
    let mut resource = resource.clone();
    if !with_data {
        if let Some(data) = resource.data.as_mut() {
            data.body = None;
        }
    }
    if !with_attributes {
        resource.attributes = None;
    }
    resource
}

/// Notes, notebooks and tags kept in a mutex.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    state: Mutex<State>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a notebook and return its guid.
    pub fn add_notebook(&self, name: &str, default: bool) -> String {
        let mut state = self.lock();
        let guid = Uuid::new_v4().to_string();
        let usn = state.next_usn();
        state.notebooks.push(Notebook {
            guid: Some(guid.clone()),
            name: Some(name.to_string()),
            default_notebook: Some(default),
            update_sequence_num: Some(usn),
            service_created: Some(Utc::now().timestamp_millis()),
            ..Notebook::default()
        });
        guid
    }

    /// Add a tag and return its guid.
    pub fn add_tag(&self, name: &str) -> String {
        let mut state = self.lock();
        state.tag_guids_for(&[name.to_string()]).remove(0)
    }

    /// Store a note as-is (assigning a guid if missing) and return the guid.
    pub fn insert_note(&self, mut note: Note) -> String {
        let mut state = self.lock();
        let guid = note
            .guid
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        note.guid = Some(guid.clone());
        if let Some(resources) = note.resources.as_mut() {
            state.prepare_resources(&guid, resources);
        }
        state.notes.push(note);
        guid
    }

    /// Snapshot of a stored note with everything included.
    pub fn note(&self, guid: &str) -> Option<Note> {
        self.lock()
            .notes
            .iter()
            .find(|note| note.guid.as_deref() == Some(guid))
            .cloned()
    }

    pub fn notes(&self) -> Vec<Note> {
        self.lock().notes.clone()
    }

    /// Number of `update_note` calls that reached the store.
    pub fn update_calls(&self) -> usize {
        self.lock().update_calls
    }

    /// Make the next call fail with `err`.
    pub fn fail_next(&self, err: ApiError) {
        self.lock().fail_next = Some(err);
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn list_notebooks(&self) -> Result<Vec<Notebook>> {
        let mut state = self.lock();
        state.take_failure()?;
        Ok(state.notebooks.clone())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let mut state = self.lock();
        state.take_failure()?;
        Ok(state.tags.clone())
    }

    async fn find_notes_metadata(
        &self,
        filter: &NoteFilter,
        offset: i32,
        max_notes: i32,
        spec: &NotesMetadataResultSpec,
    ) -> Result<NotesMetadataList> {
        let mut state = self.lock();
        state.take_failure()?;

        let words: Vec<String> = filter
            .words
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        let matches: Vec<&Note> = state
            .notes
            .iter()
            .filter(|note| note.active != Some(false))
            .filter(|note| match filter.notebook_guid.as_deref() {
                Some(notebook) => note.notebook_guid.as_deref() == Some(notebook),
                None => true,
            })
            .filter(|note| {
                let haystack = format!(
                    "{} {}",
                    note.title.as_deref().unwrap_or_default(),
                    note.content.as_deref().unwrap_or_default()
                )
                .to_lowercase();
                words.iter().all(|word| haystack.contains(word.as_str()))
            })
            .collect();

        let include = |flag: Option<bool>| flag.unwrap_or(false);
        let start = offset.max(0) as usize;
        let notes = matches
            .iter()
            .skip(start)
            .take(max_notes.max(0) as usize)
            .map(|note| NoteMetadata {
                guid: note.guid.clone().unwrap_or_default(),
                title: note.title.clone().filter(|_| include(spec.include_title)),
                content_length: note
                    .content_length
                    .filter(|_| include(spec.include_content_length)),
                created: note.created.filter(|_| include(spec.include_created)),
                updated: note.updated.filter(|_| include(spec.include_updated)),
                notebook_guid: note
                    .notebook_guid
                    .clone()
                    .filter(|_| include(spec.include_notebook_guid)),
                tag_guids: note
                    .tag_guids
                    .clone()
                    .filter(|_| include(spec.include_tag_guids)),
            })
            .collect();

        Ok(NotesMetadataList {
            start_index: start as i32,
            total_notes: matches.len() as i32,
            notes,
            searched_words: Some(words),
            ..NotesMetadataList::default()
        })
    }

    async fn create_note(&self, note: &Note) -> Result<Note> {
        let mut state = self.lock();
        state.take_failure()?;
        if note.title.as_deref().map_or(true, |title| title.trim().is_empty()) {
            return Err(data_required("Note.title"));
        }

        let mut stored = note.clone();
        let guid = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp_millis();
        stored.guid = Some(guid.clone());
        stored.created = Some(now);
        stored.updated = Some(now);
        stored.active = Some(true);
        stored.update_sequence_num = Some(state.next_usn());
        stored.content_length = stored.content.as_ref().map(|c| c.len() as i32);
        if stored.notebook_guid.is_none() {
            stored.notebook_guid = Some(state.default_notebook_guid());
        }
        if let Some(names) = stored.tag_names.clone() {
            stored.tag_guids = Some(state.tag_guids_for(&names));
        }
        if let Some(resources) = stored.resources.as_mut() {
            state.prepare_resources(&guid, resources);
        }
        state.notes.push(stored.clone());
        Ok(stored)
    }

    async fn get_note(&self, guid: &str, fetch: NoteFetch) -> Result<Note> {
        let mut state = self.lock();
        state.take_failure()?;
        let mut note = state
            .notes
            .iter()
            .find(|note| note.guid.as_deref() == Some(guid))
            .cloned()
            .ok_or_else(|| not_found("Note.guid", guid))?;
        if !fetch.with_content {
            note.content = None;
        }
        if let Some(resources) = note.resources.as_mut() {
            for resource in resources.iter_mut() {
                *resource = shaped_resource(resource, fetch.with_resources_data, true);
            }
        }
        Ok(note)
    }

    async fn update_note(&self, note: &Note) -> Result<Note> {
        let mut state = self.lock();
        state.take_failure()?;
        state.update_calls += 1;

        let guid = note
            .guid
            .clone()
            .ok_or_else(|| data_required("Note.guid"))?;
        let index = state
            .notes
            .iter()
            .position(|stored| stored.guid.as_deref() == Some(guid.as_str()))
            .ok_or_else(|| not_found("Note.guid", &guid))?;

        let tag_guids = note.tag_names.as_ref().map(|names| state.tag_guids_for(names));
        let mut resources = note.resources.clone();
        if let Some(resources) = resources.as_mut() {
            state.prepare_resources(&guid, resources);
        }
        let usn = state.next_usn();

        let stored = &mut state.notes[index];
        if let Some(title) = &note.title {
            stored.title = Some(title.clone());
        }
        if let Some(content) = &note.content {
            stored.content_length = Some(content.len() as i32);
            stored.content = Some(content.clone());
        }
        if let Some(notebook_guid) = &note.notebook_guid {
            stored.notebook_guid = Some(notebook_guid.clone());
        }
        if let Some(tag_guids) = tag_guids {
            stored.tag_names = note.tag_names.clone();
            stored.tag_guids = Some(tag_guids);
        }
        if resources.is_some() {
            stored.resources = resources;
        }
        stored.updated = Some(Utc::now().timestamp_millis());
        stored.update_sequence_num = Some(usn);

        let mut returned = stored.clone();
        returned.content = None;
        Ok(returned)
    }

    async fn get_resource(&self, guid: &str, fetch: ResourceFetch) -> Result<Resource> {
        let mut state = self.lock();
        state.take_failure()?;
        state
            .notes
            .iter()
            .flat_map(|note| note.resources.iter().flatten())
            .find(|resource| resource.guid.as_deref() == Some(guid))
            .map(|resource| shaped_resource(resource, fetch.with_data, fetch.with_attributes))
            .ok_or_else(|| not_found("Resource.guid", guid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get_strips_unrequested_content() {
        let store = MemoryNoteStore::new();
        let created = store
            .create_note(&Note {
                title: Some("Title".to_string()),
                content: Some("<en-note>x</en-note>".to_string()),
                tag_names: Some(vec!["work".to_string()]),
                ..Note::default()
            })
            .await
            .unwrap();
        let guid = created.guid.unwrap();

        let fetched = store.get_note(&guid, NoteFetch::default()).await.unwrap();
        assert!(fetched.content.is_none());
        assert_eq!(fetched.tag_guids.map(|t| t.len()), Some(1));

        let with_content = store.get_note(&guid, NoteFetch::content()).await.unwrap();
        assert_eq!(with_content.content.as_deref(), Some("<en-note>x</en-note>"));
    }

    #[tokio::test]
    async fn test_missing_note_is_not_found() {
        let store = MemoryNoteStore::new();
        let err = store
            .get_note("nope", NoteFetch::content())
            .await
            .unwrap_err();
        assert!(matches!(err, EvernoteError::Api(ApiError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_fail_next_applies_once() {
        let store = MemoryNoteStore::new();
        store.fail_next(ApiError::System {
            code: ErrorCode::RATE_LIMIT_REACHED,
            message: None,
            rate_limit_duration: Some(5),
        });
        assert!(store.list_tags().await.is_err());
        assert!(store.list_tags().await.is_ok());
    }
}
