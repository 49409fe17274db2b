//! Minimal Thrift binary protocol codec.
//!
//! Covers what the EDAM services need: strict message headers, structs,
//! lists, and skipping of anything the client does not model.

use crate::error::{EvernoteError, Result};

const VERSION_1: u32 = 0x8001_0000;
const VERSION_MASK: u32 = 0xffff_0000;
const MAX_SKIP_DEPTH: usize = 64;

/// Wire type identifiers.
pub mod ttype {
    pub const STOP: u8 = 0;
    pub const BOOL: u8 = 2;
    pub const BYTE: u8 = 3;
    pub const DOUBLE: u8 = 4;
    pub const I16: u8 = 6;
    pub const I32: u8 = 8;
    pub const I64: u8 = 10;
    pub const STRING: u8 = 11;
    pub const STRUCT: u8 = 12;
    pub const MAP: u8 = 13;
    pub const SET: u8 = 14;
    pub const LIST: u8 = 15;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Call,
    Reply,
    Exception,
}

impl MessageType {
    fn as_u8(self) -> u8 {
        match self {
            MessageType::Call => 1,
            MessageType::Reply => 2,
            MessageType::Exception => 3,
        }
    }

    fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(MessageType::Call),
            2 => Ok(MessageType::Reply),
            3 => Ok(MessageType::Exception),
            other => Err(protocol(format!("unknown message type {}", other))),
        }
    }
}

fn protocol(message: impl Into<String>) -> EvernoteError {
    EvernoteError::Protocol(message.into())
}

/// Serializes values into a byte buffer.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
    oversized: Option<usize>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The encoded message, or a protocol error if a length did not fit
    /// the wire's signed 32-bit size field.
    pub fn finish(self) -> Result<Vec<u8>> {
        match self.oversized {
            Some(len) => Err(protocol(format!(
                "{} elements exceed the 32-bit length limit",
                len
            ))),
            None => Ok(self.buf),
        }
    }

    fn length(&mut self, len: usize) {
        match i32::try_from(len) {
            Ok(len) => self.i32(len),
            Err(_) => {
                self.oversized.get_or_insert(len);
                self.i32(0);
            }
        }
    }

    pub fn message_begin(&mut self, name: &str, kind: MessageType, seq: i32) {
        self.i32((VERSION_1 | kind.as_u8() as u32) as i32);
        self.string(name);
        self.i32(seq);
    }

    pub fn field_begin(&mut self, ty: u8, id: i16) {
        self.byte(ty);
        self.i16(id);
    }

    pub fn field_stop(&mut self) {
        self.byte(ttype::STOP);
    }

    pub fn list_begin(&mut self, elem_ty: u8, len: usize) {
        self.byte(elem_ty);
        self.length(len);
    }

    pub fn bool(&mut self, value: bool) {
        self.byte(u8::from(value));
    }

    pub fn byte(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn i16(&mut self, value: i16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn binary(&mut self, value: &[u8]) {
        self.length(value.len());
        self.buf.extend_from_slice(value);
    }

    pub fn string(&mut self, value: &str) {
        self.binary(value.as_bytes());
    }

    // Field helpers that skip `None` values.

    pub fn field_bool(&mut self, id: i16, value: Option<bool>) {
        if let Some(value) = value {
            self.field_begin(ttype::BOOL, id);
            self.bool(value);
        }
    }

    pub fn field_i32(&mut self, id: i16, value: Option<i32>) {
        if let Some(value) = value {
            self.field_begin(ttype::I32, id);
            self.i32(value);
        }
    }

    pub fn field_i64(&mut self, id: i16, value: Option<i64>) {
        if let Some(value) = value {
            self.field_begin(ttype::I64, id);
            self.i64(value);
        }
    }

    pub fn field_string(&mut self, id: i16, value: Option<&str>) {
        if let Some(value) = value {
            self.field_begin(ttype::STRING, id);
            self.string(value);
        }
    }

    pub fn field_binary(&mut self, id: i16, value: Option<&[u8]>) {
        if let Some(value) = value {
            self.field_begin(ttype::STRING, id);
            self.binary(value);
        }
    }

    pub fn field_string_list(&mut self, id: i16, values: Option<&[String]>) {
        if let Some(values) = values {
            self.field_begin(ttype::LIST, id);
            self.list_begin(ttype::STRING, values.len());
            for value in values {
                self.string(value);
            }
        }
    }
}

/// Reads values from a byte slice.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| protocol("unexpected end of message"))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn length(&mut self) -> Result<usize> {
        let len = self.i32()?;
        usize::try_from(len).map_err(|_| protocol(format!("negative length {}", len)))
    }

    /// Returns `(name, type, sequence id)`. Accepts strict and legacy headers.
    pub fn message_begin(&mut self) -> Result<(String, MessageType, i32)> {
        let first = self.i32()?;
        if first < 0 {
            let version = first as u32 & VERSION_MASK;
            if version != VERSION_1 {
                return Err(protocol(format!("bad protocol version {:#x}", version)));
            }
            let kind = MessageType::from_u8((first & 0xff) as u8)?;
            let name = self.string()?;
            let seq = self.i32()?;
            Ok((name, kind, seq))
        } else {
            let bytes = self.take(first as usize)?;
            let name = String::from_utf8(bytes.to_vec())
                .map_err(|_| protocol("message name is not UTF-8"))?;
            let kind = MessageType::from_u8(self.byte()?)?;
            let seq = self.i32()?;
            Ok((name, kind, seq))
        }
    }

    /// Next field header, or `None` at the struct's stop marker.
    pub fn field_begin(&mut self) -> Result<Option<(u8, i16)>> {
        let ty = self.byte()?;
        if ty == ttype::STOP {
            return Ok(None);
        }
        let id = self.i16()?;
        Ok(Some((ty, id)))
    }

    pub fn list_begin(&mut self) -> Result<(u8, usize)> {
        let elem_ty = self.byte()?;
        let len = self.length()?;
        Ok((elem_ty, len))
    }

    pub fn map_begin(&mut self) -> Result<(u8, u8, usize)> {
        let key_ty = self.byte()?;
        let value_ty = self.byte()?;
        let len = self.length()?;
        Ok((key_ty, value_ty, len))
    }

    pub fn bool(&mut self) -> Result<bool> {
        Ok(self.byte()? != 0)
    }

    pub fn byte(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    pub fn i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.array()?))
    }

    pub fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    pub fn i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.array()?))
    }

    pub fn binary(&mut self) -> Result<Vec<u8>> {
        let len = self.length()?;
        Ok(self.take(len)?.to_vec())
    }

    pub fn string(&mut self) -> Result<String> {
        String::from_utf8(self.binary()?).map_err(|_| protocol("string is not UTF-8"))
    }

    pub fn string_list(&mut self) -> Result<Vec<String>> {
        let (elem_ty, len) = self.list_begin()?;
        if elem_ty != ttype::STRING {
            for _ in 0..len {
                self.skip(elem_ty)?;
            }
            return Ok(Vec::new());
        }
        (0..len).map(|_| self.string()).collect()
    }

    /// Consume a value of type `ty` without decoding it.
    pub fn skip(&mut self, ty: u8) -> Result<()> {
        self.skip_depth(ty, 0)
    }

    fn skip_depth(&mut self, ty: u8, depth: usize) -> Result<()> {
        if depth > MAX_SKIP_DEPTH {
            return Err(protocol("nesting too deep"));
        }
        match ty {
            ttype::BOOL | ttype::BYTE => {
                self.take(1)?;
            }
            ttype::I16 => {
                self.take(2)?;
            }
            ttype::I32 => {
                self.take(4)?;
            }
            ttype::I64 | ttype::DOUBLE => {
                self.take(8)?;
            }
            ttype::STRING => {
                let len = self.length()?;
                self.take(len)?;
            }
            ttype::STRUCT => {
                while let Some((field_ty, _)) = self.field_begin()? {
                    self.skip_depth(field_ty, depth + 1)?;
                }
            }
            ttype::MAP => {
                let (key_ty, value_ty, len) = self.map_begin()?;
                for _ in 0..len {
                    self.skip_depth(key_ty, depth + 1)?;
                    self.skip_depth(value_ty, depth + 1)?;
                }
            }
            ttype::SET | ttype::LIST => {
                let (elem_ty, len) = self.list_begin()?;
                for _ in 0..len {
                    self.skip_depth(elem_ty, depth + 1)?;
                }
            }
            other => return Err(protocol(format!("unknown field type {}", other))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_message_header_layout() {
        let mut writer = Writer::new();
        writer.message_begin("getNote", MessageType::Call, 7);
        let bytes = writer.finish().unwrap();

        assert_eq!(&bytes[..4], &[0x80, 0x01, 0x00, 0x01]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 7]);
        assert_eq!(&bytes[8..15], b"getNote");
        assert_eq!(&bytes[15..], &[0, 0, 0, 7]);

        let mut reader = Reader::new(&bytes);
        let (name, kind, seq) = reader.message_begin().unwrap();
        assert_eq!(name, "getNote");
        assert_eq!(kind, MessageType::Call);
        assert_eq!(seq, 7);
    }

    #[test]
    fn test_legacy_message_header() {
        let mut bytes = vec![0, 0, 0, 4];
        bytes.extend_from_slice(b"ping");
        bytes.push(2);
        bytes.extend_from_slice(&[0, 0, 0, 1]);

        let (name, kind, seq) = Reader::new(&bytes).message_begin().unwrap();
        assert_eq!((name.as_str(), kind, seq), ("ping", MessageType::Reply, 1));
    }

    #[test]
    fn test_skip_nested_unknown_fields() {
        let mut writer = Writer::new();
        // field 99: struct { 1: list<string>, 2: map<i32, i64> }
        writer.field_begin(ttype::STRUCT, 99);
        writer.field_string_list(1, Some(&["a".to_string(), "b".to_string()]));
        writer.field_begin(ttype::MAP, 2);
        writer.byte(ttype::I32);
        writer.byte(ttype::I64);
        writer.i32(1);
        writer.i32(5);
        writer.i64(6);
        writer.field_stop();
        // field 1: string
        writer.field_string(1, Some("kept"));
        writer.field_stop();
        let bytes = writer.finish().unwrap();

        let mut reader = Reader::new(&bytes);
        let (ty, id) = reader.field_begin().unwrap().unwrap();
        assert_eq!((ty, id), (ttype::STRUCT, 99));
        reader.skip(ty).unwrap();
        let (ty, id) = reader.field_begin().unwrap().unwrap();
        assert_eq!((ty, id), (ttype::STRING, 1));
        assert_eq!(reader.string().unwrap(), "kept");
        assert!(reader.field_begin().unwrap().is_none());
    }

    #[test]
    fn test_truncated_input_is_protocol_error() {
        let mut reader = Reader::new(&[0, 0, 0, 10, b'a']);
        let err = reader.string().unwrap_err();
        assert!(matches!(err, EvernoteError::Protocol(_)));
    }

    #[test]
    fn test_negative_length_rejected() {
        let mut reader = Reader::new(&[0xff, 0xff, 0xff, 0xff]);
        assert!(matches!(reader.binary(), Err(EvernoteError::Protocol(_))));
    }

    #[test]
    fn test_bad_version_rejected() {
        let mut reader = Reader::new(&[0x80, 0x02, 0x00, 0x01]);
        assert!(matches!(reader.message_begin(), Err(EvernoteError::Protocol(_))));
    }

    #[test]
    fn test_oversized_length_fails_on_finish() {
        let mut writer = Writer::new();
        writer.field_begin(ttype::LIST, 1);
        writer.list_begin(ttype::STRING, i32::MAX as usize + 1);
        let err = writer.finish().unwrap_err();
        assert!(matches!(err, EvernoteError::Protocol(_)));
        assert!(err.to_string().contains("2147483648"));
    }

    #[test]
    fn test_oneway_message_type_rejected() {
        let mut reader = Reader::new(&[0x80, 0x01, 0x00, 0x04]);
        assert!(matches!(reader.message_begin(), Err(EvernoteError::Protocol(_))));
    }

    #[test]
    fn test_optional_fields_omitted() {
        let mut writer = Writer::new();
        writer.field_string(1, None);
        writer.field_i32(2, None);
        writer.field_bool(3, None);
        writer.field_stop();
        assert_eq!(writer.finish().unwrap(), vec![ttype::STOP]);
    }
}
