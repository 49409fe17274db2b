//! EDAM NoteStore client over Thrift binary / HTTPS.

use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::thrift::{Reader, Writer};
use super::types::{
    Note, NoteFilter, Notebook, NotesMetadataList, NotesMetadataResultSpec, Resource, Tag,
};
use super::wire::{self, Decode};
use super::{NoteFetch, NoteStore, ResourceFetch};
use crate::error::{EvernoteError, Result};

const THRIFT_CONTENT_TYPE: &str = "application/x-thrift";
const USER_AGENT: &str = concat!("evernote-cli/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// POST a serialized call and return the raw reply body.
pub(crate) async fn post_thrift(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    body: Vec<u8>,
) -> Result<Vec<u8>> {
    tracing::debug!(method, url, bytes = body.len(), "thrift call");
    let response = client
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, THRIFT_CONTENT_TYPE)
        .header(reqwest::header::ACCEPT, THRIFT_CONTENT_TYPE)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .body(body)
        .send()
        .await
        .map_err(|e| EvernoteError::Network(format!("{} request failed: {}", method, e)))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(EvernoteError::Network(format!(
            "{} returned HTTP {}: {}",
            method,
            status,
            text.trim()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| EvernoteError::Network(format!("{} response read failed: {}", method, e)))?;
    Ok(bytes.to_vec())
}

/// NoteStore client bound to one account's storage endpoint and token.
pub struct ThriftNoteStore {
    url: String,
    token: String,
    client: reqwest::Client,
    seq: AtomicI32,
}

impl ThriftNoteStore {
    pub fn new(note_store_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(note_store_url, token, reqwest::Client::new())
    }

    pub fn with_client(
        note_store_url: impl Into<String>,
        token: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            url: note_store_url.into(),
            token: token.into(),
            client,
            seq: AtomicI32::new(0),
        }
    }

    async fn call<T, A, F>(&self, method: &str, args: A, success: F) -> Result<T>
    where
        A: FnOnce(&mut Writer),
        F: FnOnce(&mut Reader<'_>) -> Result<T>,
    {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let token = self.token.as_str();
        let body = wire::encode_call(method, seq, |w| {
            w.field_string(1, Some(token));
            args(w);
        })?;
        let reply = post_thrift(&self.client, &self.url, method, body).await?;
        wire::decode_reply(&reply, method, success)
    }
}

impl std::fmt::Debug for ThriftNoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThriftNoteStore")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NoteStore for ThriftNoteStore {
    async fn list_notebooks(&self) -> Result<Vec<Notebook>> {
        self.call("listNotebooks", |_| {}, wire::read_list).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.call("listTags", |_| {}, wire::read_list).await
    }

    async fn find_notes_metadata(
        &self,
        filter: &NoteFilter,
        offset: i32,
        max_notes: i32,
        spec: &NotesMetadataResultSpec,
    ) -> Result<NotesMetadataList> {
        self.call(
            "findNotesMetadata",
            |w| {
                wire::write_arg(w, 2, filter);
                w.field_i32(3, Some(offset));
                w.field_i32(4, Some(max_notes));
                wire::write_arg(w, 5, spec);
            },
            NotesMetadataList::decode,
        )
        .await
    }

    async fn create_note(&self, note: &Note) -> Result<Note> {
        self.call("createNote", |w| wire::write_arg(w, 2, note), Note::decode)
            .await
    }

    async fn get_note(&self, guid: &str, fetch: NoteFetch) -> Result<Note> {
        self.call(
            "getNote",
            |w| {
                w.field_string(2, Some(guid));
                w.field_bool(3, Some(fetch.with_content));
                w.field_bool(4, Some(fetch.with_resources_data));
                w.field_bool(5, Some(fetch.with_resources_recognition));
                w.field_bool(6, Some(fetch.with_resources_alternate_data));
            },
            Note::decode,
        )
        .await
    }

    async fn update_note(&self, note: &Note) -> Result<Note> {
        self.call("updateNote", |w| wire::write_arg(w, 2, note), Note::decode)
            .await
    }

    async fn get_resource(&self, guid: &str, fetch: ResourceFetch) -> Result<Resource> {
        self.call(
            "getResource",
            |w| {
                w.field_string(2, Some(guid));
                w.field_bool(3, Some(fetch.with_data));
                w.field_bool(4, Some(fetch.with_recognition));
                w.field_bool(5, Some(fetch.with_attributes));
                w.field_bool(6, Some(fetch.with_alternate_data));
            },
            Resource::decode,
        )
        .await
    }
}
