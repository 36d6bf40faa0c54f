//! Project model: a portfolio entry with a cover image and a screenshot gallery.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::document::{contains_ci, null_as_default};
use super::upload::{GalleryChange, ImageChange};

/// A portfolio project as stored in the `projects` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,

    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub technologies: Vec<String>,

    /// Storage file ID of the cover image
    #[serde(default)]
    pub cover_image: Option<String>,

    /// Storage file IDs of the gallery, in display order
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,

    #[serde(default)]
    pub github_url: Option<String>,

    #[serde(default)]
    pub live_url: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
}

impl Project {
    /// Every storage file this project references.
    pub fn file_ids(&self) -> Vec<String> {
        self.cover_image.iter().chain(self.images.iter()).cloned().collect()
    }

    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim();
        term.is_empty()
            || contains_ci(&self.name, term)
            || contains_ci(&self.description, term)
            || self.technologies.iter().any(|t| contains_ci(t, term))
    }
}

/// "New project" form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[validate(custom(function = "crate::validation::not_blank", message = "Project name is required"))]
    #[validate(length(max = 128, message = "Project name must be at most 128 characters"))]
    pub name: String,

    #[validate(custom(function = "crate::validation::not_blank", message = "Description is required"))]
    pub description: String,

    #[serde(default)]
    pub technologies: Vec<String>,

    #[validate(url(message = "GitHub URL must be a valid URL"))]
    pub github_url: Option<String>,

    #[validate(url(message = "Live URL must be a valid URL"))]
    pub live_url: Option<String>,

    #[serde(default)]
    pub featured: bool,
}

impl NewProject {
    pub fn into_project(self, cover_image: Option<String>, images: Vec<String>) -> Project {
        Project {
            name: self.name.trim().to_string(),
            description: self.description,
            technologies: normalize_tags(self.technologies),
            cover_image,
            images,
            github_url: self.github_url.filter(|u| !u.trim().is_empty()),
            live_url: self.live_url.filter(|u| !u.trim().is_empty()),
            featured: self.featured,
        }
    }
}

/// "Edit project" form. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct ProjectUpdate {
    #[validate(custom(function = "crate::validation::not_blank", message = "Project name is required"))]
    #[validate(length(max = 128, message = "Project name must be at most 128 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<Vec<String>>,
    #[validate(url(message = "GitHub URL must be a valid URL"))]
    pub github_url: Option<String>,
    #[validate(url(message = "Live URL must be a valid URL"))]
    pub live_url: Option<String>,
    pub featured: Option<bool>,
    pub cover: ImageChange,
    /// `None` keeps the gallery as it is.
    pub gallery: Option<GalleryChange>,
}

/// Trim, drop empties, and de-duplicate a tag list while keeping its order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            out.push(tag.to_string());
        }
    }
    out
}
