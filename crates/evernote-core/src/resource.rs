//! Attachment resources built from local files.

use std::fmt;
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::enml::MediaReference;
use crate::error::{EvernoteError, Result};
use crate::store::types::{Data, Resource, ResourceAttributes};

/// Media type used when the extension is unknown.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Extension to media type table, lowercase keys without the dot.
static MIME_TYPES: &[(&str, &str)] = &[
    ("7z", "application/x-7z-compressed"),
    ("aac", "audio/aac"),
    ("avi", "video/x-msvideo"),
    ("bmp", "image/bmp"),
    ("css", "text/css; charset=utf-8"),
    ("csv", "text/csv; charset=utf-8"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("epub", "application/epub+zip"),
    ("gif", "image/gif"),
    ("gz", "application/gzip"),
    ("heic", "image/heic"),
    ("htm", "text/html; charset=utf-8"),
    ("html", "text/html; charset=utf-8"),
    ("ico", "image/vnd.microsoft.icon"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("js", "text/javascript; charset=utf-8"),
    ("json", "application/json"),
    ("m4a", "audio/mp4"),
    ("md", "text/markdown; charset=utf-8"),
    ("mov", "video/quicktime"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("mpeg", "video/mpeg"),
    ("odp", "application/vnd.oasis.opendocument.presentation"),
    ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("oga", "audio/ogg"),
    ("ogg", "audio/ogg"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    ("rtf", "application/rtf"),
    ("svg", "image/svg+xml"),
    ("tar", "application/x-tar"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("txt", "text/plain; charset=utf-8"),
    ("wav", "audio/wav"),
    ("webm", "video/webm"),
    ("webp", "image/webp"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("xml", "text/xml; charset=utf-8"),
    ("zip", "application/zip"),
];

/// 128-bit MD5 digest of an attachment body.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    #[cfg(test)]
    pub(crate) fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn of(data: &[u8]) -> Self {
        Self(md5::compute(data).0)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase hex, the form used in `<en-media hash="...">`.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// A file prepared for upload as a note resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentResource {
    pub data: Vec<u8>,
    pub size: i32,
    pub hash: ContentHash,
    pub mime: String,
    pub file_name: String,
    pub attachment: bool,
}

impl AttachmentResource {
    /// The `<en-media>` reference that points at this resource.
    pub fn media_reference(&self) -> MediaReference {
        MediaReference::new(self.mime.clone(), self.hash)
    }
}

impl From<AttachmentResource> for Resource {
    fn from(attachment: AttachmentResource) -> Self {
        Resource {
            data: Some(Data {
                body_hash: Some(attachment.hash.as_bytes().to_vec()),
                size: Some(attachment.size),
                body: Some(attachment.data),
            }),
            mime: Some(attachment.mime),
            attributes: Some(ResourceAttributes {
                file_name: Some(attachment.file_name),
                attachment: Some(attachment.attachment),
            }),
            ..Resource::default()
        }
    }
}

/// Media type for a path, by extension, without parameters.
///
/// Unknown or missing extensions map to `application/octet-stream`.
pub fn mime_for_path(path: &Path) -> String {
    let extension = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return FALLBACK_MIME.to_string(),
    };
    let raw = MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_MIME);
    let essence = raw.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        FALLBACK_MIME.to_string()
    } else {
        essence.to_string()
    }
}

/// Resource sizes travel as a signed 32-bit field.
fn resource_size(path: &Path, len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| EvernoteError::FileRead {
        path: path.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{} bytes is larger than a note resource can hold", len),
        ),
    })
}

/// Read `path` and build an upload-ready resource plus its content hash.
pub fn build_attachment(path: &Path) -> Result<(AttachmentResource, ContentHash)> {
    let data = std::fs::read(path).map_err(|source| EvernoteError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let size = resource_size(path, data.len())?;
    let hash = ContentHash::of(&data);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    tracing::debug!(file = %file_name, bytes = data.len(), hash = %hash, "built attachment");

    let resource = AttachmentResource {
        size,
        data,
        hash,
        mime: mime_for_path(path),
        file_name,
        attachment: true,
    };
    Ok((resource, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_build_attachment_pdf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.pdf");
        std::fs::write(&path, b"fake pdf content").unwrap();

        let (resource, hash) = build_attachment(&path).unwrap();

        assert_eq!(resource.mime, "application/pdf");
        assert_eq!(resource.file_name, "test.pdf");
        assert_eq!(resource.size, 16);
        assert_eq!(resource.data, b"fake pdf content");
        assert!(resource.attachment);
        assert_eq!(hash, resource.hash);
        assert_eq!(hash.as_bytes(), &md5::compute(b"fake pdf content").0);
    }

    #[test]
    fn test_hash_matches_known_digest() {
        assert_eq!(
            ContentHash::of(b"hello").to_hex(),
            "5d41402abc4b2a76b9719d911017c592"
        );
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.xyzabc123");
        std::fs::write(&path, b"data").unwrap();

        let (resource, _) = build_attachment(&path).unwrap();
        assert_eq!(resource.mime, FALLBACK_MIME);
    }

    #[test]
    fn test_no_extension_falls_back() {
        assert_eq!(mime_for_path(Path::new("/tmp/Makefile")), FALLBACK_MIME);
    }

    #[test]
    fn test_mime_parameters_stripped() {
        let mime = mime_for_path(Path::new("notes.txt"));
        assert_eq!(mime, "text/plain");
        assert!(!mime.contains(';'));
        assert_eq!(mime_for_path(Path::new("page.html")), "text/html");
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert_eq!(mime_for_path(Path::new("PHOTO.JPG")), "image/jpeg");
    }

    #[test]
    fn test_table_entries_have_no_empty_essence() {
        for (ext, mime) in MIME_TYPES {
            let essence = mime_for_path(Path::new(&format!("file.{}", ext)));
            assert!(!essence.is_empty());
            assert!(mime.starts_with(&essence));
        }
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = build_attachment(Path::new("/nonexistent/file.pdf")).unwrap_err();
        match &err {
            EvernoteError::FileRead { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/file.pdf"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("/nonexistent/file.pdf"));
    }

    #[test]
    fn test_file_name_is_last_segment() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        let path = nested.join("report.csv");
        std::fs::write(&path, b"x,y").unwrap();

        let (resource, _) = build_attachment(&path).unwrap();
        assert_eq!(resource.file_name, "report.csv");
        assert_eq!(resource.mime, "text/csv");
    }

    #[test]
    fn test_same_bytes_hash_alike_at_any_depth() {
        let dir = tempdir().unwrap();
        let shallow = dir.path().join("a.bin");
        let deep_dir = dir.path().join("x").join("y").join("z");
        std::fs::create_dir_all(&deep_dir).unwrap();
        let deep = deep_dir.join("b.bin");
        std::fs::write(&shallow, b"same bytes").unwrap();
        std::fs::write(&deep, b"same bytes").unwrap();

        let (first, first_hash) = build_attachment(&shallow).unwrap();
        let (second, second_hash) = build_attachment(&deep).unwrap();

        assert_eq!(first_hash, second_hash);
        assert_eq!(first.mime, second.mime);
        assert_eq!(first.mime, mime_for_path(Path::new("anything.bin")));
        assert_eq!(first.file_name, "a.bin");
        assert_eq!(second.file_name, "b.bin");
    }

    #[test]
    fn test_oversized_resource_is_rejected() {
        let path = Path::new("/tmp/huge.iso");
        assert_eq!(resource_size(path, 42).unwrap(), 42);

        let err = resource_size(path, i32::MAX as usize + 1).unwrap_err();
        assert!(matches!(err, EvernoteError::FileRead { .. }));
        assert!(err.to_string().contains("huge.iso"));
    }

    #[test]
    fn test_media_reference_and_store_resource() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"png").unwrap();
        let (attachment, hash) = build_attachment(&path).unwrap();

        let reference = attachment.media_reference();
        assert_eq!(reference.hash, hash);
        assert_eq!(reference.mime, "image/png");

        let resource: Resource = attachment.into();
        let data = resource.data.unwrap();
        assert_eq!(data.body_hash.as_deref(), Some(&hash.as_bytes()[..]));
        assert_eq!(data.size, Some(3));
        let attributes = resource.attributes.unwrap();
        assert_eq!(attributes.file_name.as_deref(), Some("photo.png"));
        assert_eq!(attributes.attachment, Some(true));
    }
}
