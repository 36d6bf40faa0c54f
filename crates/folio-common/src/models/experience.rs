//! Work experience model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::document::null_as_default;
use super::project::normalize_tags;
use super::upload::ImageChange;

/// A position held, as stored in the `experience` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub location: Option<String>,
    /// ISO date (`YYYY-MM` or `YYYY-MM-DD`); ordering is lexicographic
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    /// Storage file ID of the company logo
    #[serde(default)]
    pub company_logo: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewExperience {
    #[validate(custom(function = "crate::validation::not_blank", message = "Company is required"))]
    pub company: String,
    #[validate(custom(function = "crate::validation::not_blank", message = "Position is required"))]
    pub position: String,
    pub location: Option<String>,
    #[validate(custom(function = "crate::validation::not_blank", message = "Start date is required"))]
    pub start_date: String,
    pub end_date: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl NewExperience {
    pub fn into_experience(self, company_logo: Option<String>) -> Experience {
        Experience {
            company: self.company.trim().to_string(),
            position: self.position.trim().to_string(),
            location: self.location.filter(|l| !l.trim().is_empty()),
            start_date: self.start_date,
            // An ongoing position has no end date
            end_date: if self.current { None } else { self.end_date },
            current: self.current,
            description: self.description,
            skills: normalize_tags(self.skills),
            company_logo,
        }
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct ExperienceUpdate {
    #[validate(custom(function = "crate::validation::not_blank", message = "Company is required"))]
    pub company: Option<String>,
    #[validate(custom(function = "crate::validation::not_blank", message = "Position is required"))]
    pub position: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub logo: ImageChange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_position_drops_end_date() {
        let exp = NewExperience {
            company: "Acme".into(),
            position: "Engineer".into(),
            start_date: "2022-01".into(),
            end_date: Some("2023-01".into()),
            current: true,
            ..Default::default()
        }
        .into_experience(None);
        assert!(exp.end_date.is_none());
        assert!(exp.current);
    }

    #[test]
    fn blank_position_rejected_on_edit() {
        let update = ExperienceUpdate { position: Some("\t".into()), ..Default::default() };
        assert!(update.validate().is_err());
    }
}
