//! Note storage abstraction.
//!
//! The `NoteStore` trait lists the NoteStore operations the CLI uses. The
//! production implementation, `ThriftNoteStore`, speaks the EDAM Thrift
//! binary protocol to the per-account storage endpoint. Implementations hold
//! the authentication token; callers never pass it per call.
//!
//! `MemoryNoteStore` (feature `test-support`) keeps everything in memory for
//! command tests.

pub mod client;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod thrift;
pub mod types;
pub mod user_store;
pub(crate) mod wire;

use async_trait::async_trait;

use crate::error::Result;

pub use client::ThriftNoteStore;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryNoteStore;
pub use types::{
    Data, Note, NoteFilter, NoteMetadata, Notebook, NotesMetadataList, NotesMetadataResultSpec,
    Resource, ResourceAttributes, Tag,
};

/// What `get_note` should include besides the note metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteFetch {
    pub with_content: bool,
    pub with_resources_data: bool,
    pub with_resources_recognition: bool,
    pub with_resources_alternate_data: bool,
}

impl NoteFetch {
    /// Content only; resources come back without their bodies.
    pub fn content() -> Self {
        Self {
            with_content: true,
            ..Self::default()
        }
    }

    /// Content and full resource bodies, needed before re-uploading a note.
    pub fn content_and_resources() -> Self {
        Self {
            with_content: true,
            with_resources_data: true,
            ..Self::default()
        }
    }
}

/// What `get_resource` should include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceFetch {
    pub with_data: bool,
    pub with_recognition: bool,
    pub with_attributes: bool,
    pub with_alternate_data: bool,
}

impl ResourceFetch {
    /// Body and attributes, what a download needs.
    pub fn download() -> Self {
        Self {
            with_data: true,
            with_attributes: true,
            ..Self::default()
        }
    }
}

/// Note storage operations.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn list_notebooks(&self) -> Result<Vec<Notebook>>;

    async fn list_tags(&self) -> Result<Vec<Tag>>;

    /// Search notes. `offset` and `max_notes` page through the matches.
    async fn find_notes_metadata(
        &self,
        filter: &NoteFilter,
        offset: i32,
        max_notes: i32,
        spec: &NotesMetadataResultSpec,
    ) -> Result<NotesMetadataList>;

    /// Create a note and return it as stored, with service-assigned fields.
    async fn create_note(&self, note: &Note) -> Result<Note>;

    async fn get_note(&self, guid: &str, fetch: NoteFetch) -> Result<Note>;

    /// Replace a note. Resources missing from `note.resources` are removed by
    /// the service, so callers must send back the ones they want to keep.
    async fn update_note(&self, note: &Note) -> Result<Note>;

    async fn get_resource(&self, guid: &str, fetch: ResourceFetch) -> Result<Resource>;
}
