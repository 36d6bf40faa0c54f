//! Job application tracker model. Applications move across Kanban columns by
//! changing `status`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::document::null_as_default;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Saved for later, not applied yet
    #[default]
    Wishlist,
    Applied,
    Interview,
    Offer,
    Rejected,
    Accepted,
}

impl JobStatus {
    /// Board column order, left to right.
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Wishlist,
        JobStatus::Applied,
        JobStatus::Interview,
        JobStatus::Offer,
        JobStatus::Rejected,
        JobStatus::Accepted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wishlist => "wishlist",
            Self::Applied => "applied",
            Self::Interview => "interview",
            Self::Offer => "offer",
            Self::Rejected => "rejected",
            Self::Accepted => "accepted",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Wishlist => "Wishlist",
            Self::Applied => "Applied",
            Self::Interview => "Interview",
            Self::Offer => "Offer",
            Self::Rejected => "Rejected",
            Self::Accepted => "Accepted",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown job status '{s}'"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub company: String,
    pub position: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: JobStatus,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub applied_date: Option<String>,
    /// ID of the CV document sent with this application
    #[serde(rename = "fk_cv_id", default)]
    pub fk_cv_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewJobApplication {
    #[validate(custom(function = "crate::validation::not_blank", message = "Company is required"))]
    pub company: String,
    #[validate(custom(function = "crate::validation::not_blank", message = "Position is required"))]
    pub position: String,
    #[serde(default)]
    pub status: JobStatus,
    pub location: Option<String>,
    #[validate(url(message = "Job URL must be a valid URL"))]
    pub job_url: Option<String>,
    pub salary: Option<String>,
    pub notes: Option<String>,
    pub applied_date: Option<String>,
    #[serde(rename = "fk_cv_id")]
    pub fk_cv_id: Option<String>,
}

impl From<NewJobApplication> for JobApplication {
    fn from(j: NewJobApplication) -> Self {
        Self {
            company: j.company.trim().to_string(),
            position: j.position.trim().to_string(),
            status: j.status,
            location: j.location,
            job_url: j.job_url.filter(|u| !u.trim().is_empty()),
            salary: j.salary,
            notes: j.notes,
            applied_date: j.applied_date,
            fk_cv_id: j.fk_cv_id,
        }
    }
}

/// Partial edit of an application. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobApplicationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::not_blank", message = "Company is required"))]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::not_blank", message = "Position is required"))]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Job URL must be a valid URL"))]
    pub job_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_date: Option<String>,
    #[serde(rename = "fk_cv_id", skip_serializing_if = "Option::is_none")]
    pub fk_cv_id: Option<String>,
}
