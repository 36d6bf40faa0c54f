//! Wire types for list responses, stored files, and provisioning requests.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Response of every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentList<T> {
    pub total: u64,
    pub documents: Vec<T>,
}

/// Metadata of a file in a storage bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    #[serde(rename = "$id")]
    pub id: String,
    pub bucket_id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub size_original: u64,
    #[serde(default)]
    pub chunks_total: u32,
    #[serde(default)]
    pub chunks_uploaded: u32,
}

/// Permission strings understood by the backend.
pub mod permission {
    pub fn read_any() -> String {
        r#"read("any")"#.to_string()
    }

    pub fn create_any() -> String {
        r#"create("any")"#.to_string()
    }

    pub fn read_users() -> String {
        r#"read("users")"#.to_string()
    }

    pub fn create_users() -> String {
        r#"create("users")"#.to_string()
    }

    pub fn update_users() -> String {
        r#"update("users")"#.to_string()
    }

    pub fn delete_users() -> String {
        r#"delete("users")"#.to_string()
    }
}

/// Attribute type plus its type-specific settings.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKind {
    String { size: u32 },
    Boolean,
    Integer,
    Datetime,
    Email,
    Url,
    Enum { elements: Vec<String> },
}

impl AttributeKind {
    /// Path segment of the create-attribute endpoint.
    pub fn path(&self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Datetime => "datetime",
            Self::Email => "email",
            Self::Url => "url",
            Self::Enum { .. } => "enum",
        }
    }
}

/// One collection attribute to provision.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    pub key: &'static str,
    pub kind: AttributeKind,
    pub required: bool,
    pub array: bool,
    pub default: Option<Value>,
}

impl AttributeSpec {
    pub fn string(key: &'static str, size: u32) -> Self {
        Self::of(key, AttributeKind::String { size })
    }

    pub fn boolean(key: &'static str) -> Self {
        Self::of(key, AttributeKind::Boolean)
    }

    pub fn integer(key: &'static str) -> Self {
        Self::of(key, AttributeKind::Integer)
    }

    pub fn datetime(key: &'static str) -> Self {
        Self::of(key, AttributeKind::Datetime)
    }

    pub fn email(key: &'static str) -> Self {
        Self::of(key, AttributeKind::Email)
    }

    pub fn url(key: &'static str) -> Self {
        Self::of(key, AttributeKind::Url)
    }

    pub fn enumeration(key: &'static str, elements: &[&str]) -> Self {
        Self::of(
            key,
            AttributeKind::Enum { elements: elements.iter().map(|e| e.to_string()).collect() },
        )
    }

    fn of(key: &'static str, kind: AttributeKind) -> Self {
        Self { key, kind, required: false, array: false, default: None }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Request body of the create-attribute endpoint.
    pub fn body(&self) -> Value {
        let mut body = json!({
            "key": self.key,
            "required": self.required,
            "array": self.array,
        });
        // Required attributes cannot carry a default
        if !self.required {
            if let Some(d) = &self.default {
                body["default"] = d.clone();
            }
        }
        match &self.kind {
            AttributeKind::String { size } => body["size"] = json!(size),
            AttributeKind::Enum { elements } => body["elements"] = json!(elements),
            _ => {}
        }
        body
    }
}

/// A storage bucket to provision.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketSpec {
    pub id: String,
    pub name: String,
    pub permissions: Vec<String>,
    pub maximum_file_size: u64,
    pub allowed_extensions: Vec<&'static str>,
}

impl BucketSpec {
    pub fn body(&self) -> Value {
        json!({
            "bucketId": self.id,
            "name": self.name,
            "permissions": self.permissions,
            "fileSecurity": false,
            "enabled": true,
            "maximumFileSize": self.maximum_file_size,
            "allowedFileExtensions": self.allowed_extensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_attribute_body_carries_size() {
        let body = AttributeSpec::string("technologies", 64).array().body();
        assert_eq!(body["size"], 64);
        assert_eq!(body["array"], true);
        assert_eq!(body["required"], false);
    }

    #[test]
    fn required_attribute_drops_default() {
        let body = AttributeSpec::boolean("read").required().default_value(false).body();
        assert!(body.get("default").is_none());
        let body = AttributeSpec::boolean("read").default_value(false).body();
        assert_eq!(body["default"], false);
    }

    #[test]
    fn enum_attribute_lists_elements() {
        let spec = AttributeSpec::enumeration("status", &["applied", "offer"]);
        assert_eq!(spec.kind.path(), "enum");
        assert_eq!(spec.body()["elements"], json!(["applied", "offer"]));
    }
}
