//! API route modules.

pub mod contact;
pub mod experience;
pub mod health;
pub mod profile;
pub mod projects;
