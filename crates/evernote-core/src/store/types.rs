//! EDAM data structures used by the CLI.
//!
//! Only the fields the client reads or writes are modelled. Every field is
//! optional because the service omits whatever was not requested; unknown
//! fields are skipped when decoding.

use serde::{Serialize, Serializer};

fn hex_bytes<S: Serializer>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match bytes {
        Some(bytes) => serializer.serialize_some(&hex::encode(bytes)),
        None => serializer.serialize_none(),
    }
}

/// Resource body: bytes, length and MD5 digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Data {
    #[serde(serialize_with = "hex_bytes")]
    pub body_hash: Option<Vec<u8>>,
    pub size: Option<i32>,
    #[serde(skip)]
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceAttributes {
    pub file_name: Option<String>,
    pub attachment: Option<bool>,
}

/// A file embedded in or attached to a note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub guid: Option<String>,
    pub note_guid: Option<String>,
    pub data: Option<Data>,
    pub mime: Option<String>,
    pub width: Option<i16>,
    pub height: Option<i16>,
    pub active: Option<bool>,
    pub attributes: Option<ResourceAttributes>,
    pub update_sequence_num: Option<i32>,
}

impl Resource {
    /// Stored file name, if the resource carries one.
    pub fn file_name(&self) -> Option<&str> {
        self.attributes.as_ref()?.file_name.as_deref()
    }

    pub fn size(&self) -> Option<i32> {
        self.data.as_ref()?.size
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.data.as_ref()?.body.as_deref()
    }
}

/// A note. Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Note {
    pub guid: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(serialize_with = "hex_bytes")]
    pub content_hash: Option<Vec<u8>>,
    pub content_length: Option<i32>,
    pub created: Option<i64>,
    pub updated: Option<i64>,
    pub deleted: Option<i64>,
    pub active: Option<bool>,
    pub update_sequence_num: Option<i32>,
    pub notebook_guid: Option<String>,
    pub tag_guids: Option<Vec<String>>,
    pub resources: Option<Vec<Resource>>,
    pub tag_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Notebook {
    pub guid: Option<String>,
    pub name: Option<String>,
    pub update_sequence_num: Option<i32>,
    pub default_notebook: Option<bool>,
    pub service_created: Option<i64>,
    pub service_updated: Option<i64>,
    pub stack: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub guid: Option<String>,
    pub name: Option<String>,
    pub parent_guid: Option<String>,
    pub update_sequence_num: Option<i32>,
}

/// Search criteria for `find_notes_metadata`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub order: Option<i32>,
    pub ascending: Option<bool>,
    pub words: Option<String>,
    pub notebook_guid: Option<String>,
    pub tag_guids: Option<Vec<String>>,
    pub time_zone: Option<String>,
    pub inactive: Option<bool>,
}

/// Which optional fields `find_notes_metadata` should populate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesMetadataResultSpec {
    pub include_title: Option<bool>,
    pub include_content_length: Option<bool>,
    pub include_created: Option<bool>,
    pub include_updated: Option<bool>,
    pub include_notebook_guid: Option<bool>,
    pub include_tag_guids: Option<bool>,
}

impl NotesMetadataResultSpec {
    /// Title, timestamps and notebook; what the search listing shows.
    pub fn listing() -> Self {
        Self {
            include_title: Some(true),
            include_created: Some(true),
            include_updated: Some(true),
            include_notebook_guid: Some(true),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteMetadata {
    pub guid: String,
    pub title: Option<String>,
    pub content_length: Option<i32>,
    pub created: Option<i64>,
    pub updated: Option<i64>,
    pub notebook_guid: Option<String>,
    pub tag_guids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotesMetadataList {
    pub start_index: i32,
    pub total_notes: i32,
    pub notes: Vec<NoteMetadata>,
    pub stopped_words: Option<Vec<String>>,
    pub searched_words: Option<Vec<String>>,
    pub update_count: Option<i32>,
}
