//! Contact message model: what visitors send through the public site.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

use super::document::{contains_ci, null_as_default};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub read: bool,
    /// Soft-hide flag; archived messages leave the inbox views
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,
}

impl Message {
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim();
        term.is_empty()
            || contains_ci(&self.name, term)
            || contains_ci(&self.email, term)
            || self.subject.as_deref().is_some_and(|s| contains_ci(s, term))
            || contains_ci(&self.message, term)
    }
}

/// Contact form submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewMessage {
    #[validate(custom(function = "crate::validation::not_blank", message = "Name is required"))]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(max = 200, message = "Subject must be at most 200 characters"))]
    pub subject: Option<String>,

    #[validate(custom(function = "crate::validation::not_blank", message = "Message is required"))]
    #[validate(length(max = 5000, message = "Message must be at most 5000 characters"))]
    pub message: String,
}

impl From<NewMessage> for Message {
    fn from(m: NewMessage) -> Self {
        Self {
            name: m.name.trim().to_string(),
            email: m.email.trim().to_string(),
            subject: m.subject.filter(|s| !s.trim().is_empty()),
            message: m.message,
            read: false,
            archived: false,
        }
    }
}

/// Inbox views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageFilter {
    /// Everything not archived
    #[default]
    All,
    /// Not archived and not read
    Unread,
    /// Not archived and read
    Read,
    Archived,
}

impl MessageFilter {
    pub fn matches(self, m: &Message) -> bool {
        match self {
            Self::All => !m.archived,
            Self::Unread => !m.archived && !m.read,
            Self::Read => !m.archived && m.read,
            Self::Archived => m.archived,
        }
    }
}

impl FromStr for MessageFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "unread" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            "archived" => Ok(Self::Archived),
            other => Err(format!("unknown message filter '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(read: bool, archived: bool) -> Message {
        Message { read, archived, ..Default::default() }
    }

    #[test]
    fn filters_partition_inbox() {
        assert!(MessageFilter::Unread.matches(&msg(false, false)));
        assert!(!MessageFilter::Unread.matches(&msg(true, false)));
        assert!(!MessageFilter::Unread.matches(&msg(false, true)));
        assert!(MessageFilter::Read.matches(&msg(true, false)));
        assert!(MessageFilter::Archived.matches(&msg(true, true)));
        assert!(!MessageFilter::All.matches(&msg(false, true)));
    }

    #[test]
    fn new_messages_start_unread() {
        let m: Message = NewMessage {
            name: " Ada ".into(),
            email: "ada@example.com".into(),
            subject: Some("".into()),
            message: "Hello".into(),
        }
        .into();
        assert_eq!(m.name, "Ada");
        assert!(m.subject.is_none());
        assert!(!m.read && !m.archived);
    }
}
