//! Appwrite REST client for Rust.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use folio_appwrite::{ClientOptions, Query, RestClient};
//!
//! #[tokio::main]
//! async fn main() -> folio_appwrite::Result<()> {
//!     let client = RestClient::new(
//!         ClientOptions::new("https://cloud.appwrite.io/v1", "my-project").api_key("secret"),
//!     )?;
//!
//!     let projects = client
//!         .list_documents::<serde_json::Value>("portfolio", "projects", &[Query::order_desc("$createdAt")])
//!         .await?;
//!     println!("{} projects", projects.total);
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod databases;
pub mod error;
pub mod query;
pub mod rest;
pub mod storage;
pub mod types;

pub use error::{AppwriteError, Result};
pub use query::Query;
pub use rest::{ClientOptions, RestClient};
pub use types::*;

/// A fresh document/file ID: 32 lowercase hex characters, within the
/// backend's 36-character limit and never starting with a special character.
pub fn unique_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
