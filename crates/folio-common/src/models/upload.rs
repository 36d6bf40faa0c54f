//! Files handed to the storage bucket, and the rules they are checked against.

/// Client-side size cap for every upload: 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const DOCUMENT_TYPES: [&str; 4] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// A file waiting to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accept {
    /// Any `image/*` MIME type
    Images,
    /// PDF, Word, or plain text
    Documents,
}

/// Size and type constraints for one kind of upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRule {
    pub label: &'static str,
    pub max_bytes: u64,
    accept: Accept,
}

impl UploadRule {
    pub fn image() -> Self {
        Self { label: "image", max_bytes: MAX_UPLOAD_BYTES, accept: Accept::Images }
    }

    pub fn document() -> Self {
        Self { label: "document", max_bytes: MAX_UPLOAD_BYTES, accept: Accept::Documents }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn accepts(&self, content_type: &str) -> bool {
        let ct = content_type.trim().to_ascii_lowercase();
        match self.accept {
            Accept::Images => ct.starts_with("image/"),
            Accept::Documents => DOCUMENT_TYPES.contains(&ct.as_str()),
        }
    }
}

/// What an edit form wants done with a single-image field.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ImageChange {
    #[default]
    Keep,
    Remove,
    Replace(Upload),
}

/// Edit of a multi-image field: the stored file IDs to retain, in order, plus
/// new files appended after them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryChange {
    pub keep: Vec<String>,
    pub add: Vec<Upload>,
}
