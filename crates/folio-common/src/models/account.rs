//! Account and session types returned by the auth endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The signed-in administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "emailVerification", default)]
    pub email_verified: bool,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    pub user_id: String,
    pub expire: DateTime<Utc>,
    /// Only populated when the session is created with a server key
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub current: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 256, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordChange {
    #[validate(length(min = 8, max = 256, message = "Current password must be at least 8 characters"))]
    pub old_password: String,

    #[validate(length(min = 8, max = 256, message = "New password must be at least 8 characters"))]
    pub new_password: String,
}
