//! Domain models shared across all Folio crates.
//!
//! Every persisted record is a [`Document`] wrapping one of the entity payloads
//! below. Field names follow the camelCase attribute keys of the collections.

pub mod account;
pub mod cv;
pub mod document;
pub mod experience;
pub mod job;
pub mod message;
pub mod profile;
pub mod project;
pub mod upload;

/// Re-export all model types for convenience.
pub use account::*;
pub use cv::*;
pub use document::*;
pub use experience::*;
pub use job::*;
pub use message::*;
pub use profile::*;
pub use project::*;
pub use upload::*;
