//! CV documents that job applications reference through `fk_cv_id`.

use serde::{Deserialize, Serialize};

use super::document::null_as_default;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cv {
    /// Display name, e.g. "Backend CV 2024"
    pub name: String,
    /// Storage file ID in the CV bucket
    pub file_id: String,
    pub file_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_default: bool,
}
