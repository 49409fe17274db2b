//! EDAM struct encoding and service reply handling.

use super::thrift::{ttype, MessageType, Reader, Writer};
use super::types::{
    Data, Note, NoteFilter, NoteMetadata, Notebook, NotesMetadataList, NotesMetadataResultSpec,
    Resource, ResourceAttributes, Tag,
};
use crate::error::{ApiError, ErrorCode, EvernoteError, Result};

pub(crate) trait Encode {
    /// Write the struct's fields followed by the stop marker.
    fn encode(&self, w: &mut Writer);
}

pub(crate) trait Decode: Sized {
    fn decode(r: &mut Reader<'_>) -> Result<Self>;
}

/// Field-by-field struct decoding; `on_field` returns `false` for fields it
/// did not consume so they are skipped.
fn read_struct<F>(r: &mut Reader<'_>, mut on_field: F) -> Result<()>
where
    F: FnMut(&mut Reader<'_>, u8, i16) -> Result<bool>,
{
    while let Some((ty, id)) = r.field_begin()? {
        if !on_field(r, ty, id)? {
            r.skip(ty)?;
        }
    }
    Ok(())
}

pub(crate) fn read_list<T: Decode>(r: &mut Reader<'_>) -> Result<Vec<T>> {
    let (elem_ty, len) = r.list_begin()?;
    if elem_ty != ttype::STRUCT {
        return Err(EvernoteError::Protocol(format!(
            "expected list of structs, got element type {}",
            elem_ty
        )));
    }
    (0..len).map(|_| T::decode(r)).collect()
}

fn write_struct_field<T: Encode>(w: &mut Writer, id: i16, value: Option<&T>) {
    if let Some(value) = value {
        w.field_begin(ttype::STRUCT, id);
        value.encode(w);
    }
}

fn write_struct_list<T: Encode>(w: &mut Writer, id: i16, values: Option<&[T]>) {
    if let Some(values) = values {
        w.field_begin(ttype::LIST, id);
        w.list_begin(ttype::STRUCT, values.len());
        for value in values {
            value.encode(w);
        }
    }
}

impl Encode for Data {
    fn encode(&self, w: &mut Writer) {
        w.field_binary(1, self.body_hash.as_deref());
        w.field_i32(2, self.size);
        w.field_binary(3, self.body.as_deref());
        w.field_stop();
    }
}

impl Decode for Data {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let mut data = Data::default();
        read_struct(r, |r, ty, id| {
            match (id, ty) {
                (1, ttype::STRING) => data.body_hash = Some(r.binary()?),
                (2, ttype::I32) => data.size = Some(r.i32()?),
                (3, ttype::STRING) => data.body = Some(r.binary()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(data)
    }
}

impl Encode for ResourceAttributes {
    fn encode(&self, w: &mut Writer) {
        w.field_string(10, self.file_name.as_deref());
        w.field_bool(11, self.attachment);
        w.field_stop();
    }
}

impl Decode for ResourceAttributes {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let mut attributes = ResourceAttributes::default();
        read_struct(r, |r, ty, id| {
            match (id, ty) {
                (10, ttype::STRING) => attributes.file_name = Some(r.string()?),
                (11, ttype::BOOL) => attributes.attachment = Some(r.bool()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(attributes)
    }
}

impl Encode for Resource {
    fn encode(&self, w: &mut Writer) {
        w.field_string(1, self.guid.as_deref());
        w.field_string(2, self.note_guid.as_deref());
        write_struct_field(w, 3, self.data.as_ref());
        w.field_string(4, self.mime.as_deref());
        if let Some(width) = self.width {
            w.field_begin(ttype::I16, 5);
            w.i16(width);
        }
        if let Some(height) = self.height {
            w.field_begin(ttype::I16, 6);
            w.i16(height);
        }
        w.field_bool(8, self.active);
        write_struct_field(w, 11, self.attributes.as_ref());
        w.field_i32(12, self.update_sequence_num);
        w.field_stop();
    }
}

impl Decode for Resource {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let mut resource = Resource::default();
        read_struct(r, |r, ty, id| {
            match (id, ty) {
                (1, ttype::STRING) => resource.guid = Some(r.string()?),
                (2, ttype::STRING) => resource.note_guid = Some(r.string()?),
                (3, ttype::STRUCT) => resource.data = Some(Data::decode(r)?),
                (4, ttype::STRING) => resource.mime = Some(r.string()?),
                (5, ttype::I16) => resource.width = Some(r.i16()?),
                (6, ttype::I16) => resource.height = Some(r.i16()?),
                (8, ttype::BOOL) => resource.active = Some(r.bool()?),
                (11, ttype::STRUCT) => resource.attributes = Some(ResourceAttributes::decode(r)?),
                (12, ttype::I32) => resource.update_sequence_num = Some(r.i32()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(resource)
    }
}

impl Encode for Note {
    fn encode(&self, w: &mut Writer) {
        w.field_string(1, self.guid.as_deref());
        w.field_string(2, self.title.as_deref());
        w.field_string(3, self.content.as_deref());
        w.field_binary(4, self.content_hash.as_deref());
        w.field_i32(5, self.content_length);
        w.field_i64(6, self.created);
        w.field_i64(7, self.updated);
        w.field_i64(8, self.deleted);
        w.field_bool(9, self.active);
        w.field_i32(10, self.update_sequence_num);
        w.field_string(11, self.notebook_guid.as_deref());
        w.field_string_list(12, self.tag_guids.as_deref());
        write_struct_list(w, 13, self.resources.as_deref());
        w.field_string_list(15, self.tag_names.as_deref());
        w.field_stop();
    }
}

impl Decode for Note {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let mut note = Note::default();
        read_struct(r, |r, ty, id| {
            match (id, ty) {
                (1, ttype::STRING) => note.guid = Some(r.string()?),
                (2, ttype::STRING) => note.title = Some(r.string()?),
                (3, ttype::STRING) => note.content = Some(r.string()?),
                (4, ttype::STRING) => note.content_hash = Some(r.binary()?),
                (5, ttype::I32) => note.content_length = Some(r.i32()?),
                (6, ttype::I64) => note.created = Some(r.i64()?),
                (7, ttype::I64) => note.updated = Some(r.i64()?),
                (8, ttype::I64) => note.deleted = Some(r.i64()?),
                (9, ttype::BOOL) => note.active = Some(r.bool()?),
                (10, ttype::I32) => note.update_sequence_num = Some(r.i32()?),
                (11, ttype::STRING) => note.notebook_guid = Some(r.string()?),
                (12, ttype::LIST) => note.tag_guids = Some(r.string_list()?),
                (13, ttype::LIST) => note.resources = Some(read_list(r)?),
                (15, ttype::LIST) => note.tag_names = Some(r.string_list()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(note)
    }
}

impl Decode for Notebook {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let mut notebook = Notebook::default();
        read_struct(r, |r, ty, id| {
            match (id, ty) {
                (1, ttype::STRING) => notebook.guid = Some(r.string()?),
                (2, ttype::STRING) => notebook.name = Some(r.string()?),
                (5, ttype::I32) => notebook.update_sequence_num = Some(r.i32()?),
                (6, ttype::BOOL) => notebook.default_notebook = Some(r.bool()?),
                (7, ttype::I64) => notebook.service_created = Some(r.i64()?),
                (8, ttype::I64) => notebook.service_updated = Some(r.i64()?),
                (12, ttype::STRING) => notebook.stack = Some(r.string()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(notebook)
    }
}

impl Decode for Tag {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let mut tag = Tag::default();
        read_struct(r, |r, ty, id| {
            match (id, ty) {
                (1, ttype::STRING) => tag.guid = Some(r.string()?),
                (2, ttype::STRING) => tag.name = Some(r.string()?),
                (3, ttype::STRING) => tag.parent_guid = Some(r.string()?),
                (4, ttype::I32) => tag.update_sequence_num = Some(r.i32()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(tag)
    }
}

impl Encode for NoteFilter {
    fn encode(&self, w: &mut Writer) {
        w.field_i32(1, self.order);
        w.field_bool(2, self.ascending);
        w.field_string(3, self.words.as_deref());
        w.field_string(4, self.notebook_guid.as_deref());
        w.field_string_list(5, self.tag_guids.as_deref());
        w.field_string(6, self.time_zone.as_deref());
        w.field_bool(7, self.inactive);
        w.field_stop();
    }
}

impl Encode for NotesMetadataResultSpec {
    fn encode(&self, w: &mut Writer) {
        w.field_bool(2, self.include_title);
        w.field_bool(5, self.include_content_length);
        w.field_bool(6, self.include_created);
        w.field_bool(7, self.include_updated);
        w.field_bool(11, self.include_notebook_guid);
        w.field_bool(12, self.include_tag_guids);
        w.field_stop();
    }
}

impl Decode for NoteMetadata {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let mut metadata = NoteMetadata::default();
        read_struct(r, |r, ty, id| {
            match (id, ty) {
                (1, ttype::STRING) => metadata.guid = r.string()?,
                (2, ttype::STRING) => metadata.title = Some(r.string()?),
                (5, ttype::I32) => metadata.content_length = Some(r.i32()?),
                (6, ttype::I64) => metadata.created = Some(r.i64()?),
                (7, ttype::I64) => metadata.updated = Some(r.i64()?),
                (11, ttype::STRING) => metadata.notebook_guid = Some(r.string()?),
                (12, ttype::LIST) => metadata.tag_guids = Some(r.string_list()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(metadata)
    }
}

impl Decode for NotesMetadataList {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let mut list = NotesMetadataList::default();
        read_struct(r, |r, ty, id| {
            match (id, ty) {
                (1, ttype::I32) => list.start_index = r.i32()?,
                (2, ttype::I32) => list.total_notes = r.i32()?,
                (3, ttype::LIST) => list.notes = read_list(r)?,
                (4, ttype::LIST) => list.stopped_words = Some(r.string_list()?),
                (5, ttype::LIST) => list.searched_words = Some(r.string_list()?),
                (6, ttype::I32) => list.update_count = Some(r.i32()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(list)
    }
}

fn decode_user_exception(r: &mut Reader<'_>) -> Result<ApiError> {
    let mut code = ErrorCode(1);
    let mut parameter = None;
    read_struct(r, |r, ty, id| {
        match (id, ty) {
            (1, ttype::I32) => code = ErrorCode(r.i32()?),
            (2, ttype::STRING) => parameter = Some(r.string()?),
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(ApiError::User { code, parameter })
}

fn decode_system_exception(r: &mut Reader<'_>) -> Result<ApiError> {
    let mut code = ErrorCode(1);
    let mut message = None;
    let mut rate_limit_duration = None;
    read_struct(r, |r, ty, id| {
        match (id, ty) {
            (1, ttype::I32) => code = ErrorCode(r.i32()?),
            (2, ttype::STRING) => message = Some(r.string()?),
            (3, ttype::I32) => rate_limit_duration = Some(r.i32()?),
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(ApiError::System {
        code,
        message,
        rate_limit_duration,
    })
}

fn decode_not_found_exception(r: &mut Reader<'_>) -> Result<ApiError> {
    let mut identifier = None;
    let mut key = None;
    read_struct(r, |r, ty, id| {
        match (id, ty) {
            (1, ttype::STRING) => identifier = Some(r.string()?),
            (2, ttype::STRING) => key = Some(r.string()?),
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(ApiError::NotFound { identifier, key })
}

fn decode_application_exception(r: &mut Reader<'_>) -> Result<EvernoteError> {
    let mut message = None;
    let mut kind = 0;
    read_struct(r, |r, ty, id| {
        match (id, ty) {
            (1, ttype::STRING) => message = Some(r.string()?),
            (2, ttype::I32) => kind = r.i32()?,
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(EvernoteError::Protocol(format!(
        "application exception {}: {}",
        kind,
        message.unwrap_or_else(|| "unknown".to_string())
    )))
}

/// Serialize a call. `args` writes the argument struct fields; the stop
/// marker is appended here.
pub(crate) fn encode_call<F>(method: &str, seq: i32, args: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut Writer),
{
    let mut w = Writer::new();
    w.message_begin(method, MessageType::Call, seq);
    args(&mut w);
    w.field_stop();
    w.finish()
}

/// Write a struct-typed call argument.
pub(crate) fn write_arg<T: Encode>(w: &mut Writer, id: i16, value: &T) {
    write_struct_field(w, id, Some(value));
}

/// Parse a reply to `method`. `success` decodes result field 0; declared
/// exceptions in fields 1 to 3 become `EvernoteError::Api`.
pub(crate) fn decode_reply<T, F>(bytes: &[u8], method: &str, success: F) -> Result<T>
where
    F: FnOnce(&mut Reader<'_>) -> Result<T>,
{
    let mut r = Reader::new(bytes);
    let (name, kind, _seq) = r.message_begin()?;
    if kind == MessageType::Exception {
        return Err(decode_application_exception(&mut r)?);
    }
    if kind != MessageType::Reply {
        return Err(EvernoteError::Protocol(format!(
            "expected reply, got {:?}",
            kind
        )));
    }
    if name != method {
        return Err(EvernoteError::Protocol(format!(
            "reply for {} while waiting for {}",
            name, method
        )));
    }

    let mut success = Some(success);
    let mut value = None;
    let mut exception = None;
    read_struct(&mut r, |r, ty, id| {
        match (id, ty) {
            (0, _) => match success.take() {
                Some(decode) => value = Some(decode(r)?),
                None => return Ok(false),
            },
            (1, ttype::STRUCT) => exception = Some(decode_user_exception(r)?),
            (2, ttype::STRUCT) => exception = Some(decode_system_exception(r)?),
            (3, ttype::STRUCT) => exception = Some(decode_not_found_exception(r)?),
            _ => return Ok(false),
        }
        Ok(true)
    })?;

    if let Some(exception) = exception {
        return Err(EvernoteError::Api(exception));
    }
    value.ok_or_else(|| EvernoteError::Protocol(format!("{} returned no result", method)))
}
