//! Profile / site settings: a single document in the `personal` collection.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::document::null_as_default;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bio: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Storage file ID of the avatar
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
}

/// Settings form. Always a full replace of the text fields; the avatar is
/// handled separately.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(custom(function = "crate::validation::not_blank", message = "Name is required"))]
    pub name: String,
    #[validate(custom(function = "crate::validation::not_blank", message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[validate(url(message = "GitHub URL must be a valid URL"))]
    pub github_url: Option<String>,
    #[validate(url(message = "LinkedIn URL must be a valid URL"))]
    pub linkedin_url: Option<String>,
    #[validate(url(message = "Twitter URL must be a valid URL"))]
    pub twitter_url: Option<String>,
    #[validate(url(message = "Website must be a valid URL"))]
    pub website: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl ProfileUpdate {
    pub fn into_profile(self, avatar: Option<String>) -> Profile {
        Profile {
            name: self.name.trim().to_string(),
            title: self.title.trim().to_string(),
            bio: self.bio,
            email: self.email.trim().to_string(),
            phone: self.phone,
            location: self.location,
            avatar,
            github_url: self.github_url,
            linkedin_url: self.linkedin_url,
            twitter_url: self.twitter_url,
            website: self.website,
            skills: super::project::normalize_tags(self.skills),
        }
    }
}
