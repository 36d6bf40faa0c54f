//! The envelope every collection record comes back in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::ops::Deref;

/// A stored record: backend-assigned metadata plus the entity payload, which is
/// flattened alongside the `$`-prefixed keys exactly as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<T> {
    #[serde(rename = "$id")]
    pub id: String,

    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,

    #[serde(flatten)]
    pub data: T,
}

impl<T> Deref for Document<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

/// Optional attributes come back as an explicit `null` when unset; read
/// that as the field's default. Pair with `#[serde(default)]` for absent keys.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Case-insensitive substring match, the way list pages filter.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        title: String,
    }

    #[test]
    fn parses_backend_envelope() {
        let raw = serde_json::json!({
            "$id": "abc123",
            "$createdAt": "2024-03-01T10:00:00.000+00:00",
            "$updatedAt": "2024-03-02T10:00:00.000+00:00",
            "$collectionId": "notes",
            "$databaseId": "portfolio",
            "$permissions": [],
            "title": "Hello"
        });
        let doc: Document<Note> = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.id, "abc123");
        assert_eq!(doc.title, "Hello");
        assert!(doc.updated_at > doc.created_at);
    }

    #[test]
    fn null_attributes_read_as_defaults() {
        use crate::models::{Experience, Profile};

        let raw = serde_json::json!({
            "$id": "e1",
            "$createdAt": "2024-03-01T10:00:00.000+00:00",
            "$updatedAt": "2024-03-01T10:00:00.000+00:00",
            "company": "Acme",
            "position": "Engineer",
            "startDate": "2022-01",
            "endDate": null,
            "current": null,
            "description": null,
            "skills": null
        });
        let doc: Document<Experience> = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.description, "");
        assert!(!doc.current);
        assert!(doc.skills.is_empty());

        let raw = serde_json::json!({
            "$id": "me",
            "$createdAt": "2024-03-01T10:00:00.000+00:00",
            "$updatedAt": "2024-03-01T10:00:00.000+00:00",
            "name": "Ada",
            "title": "Engineer",
            "email": "ada@example.com",
            "bio": null,
            "skills": null
        });
        let doc: Document<Profile> = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.bio, "");
    }
}
