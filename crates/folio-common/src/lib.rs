//! # folio-common
//!
//! Shared configuration, error handling, validation, and domain models used
//! across all Folio crates. No backend calls live here.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;
