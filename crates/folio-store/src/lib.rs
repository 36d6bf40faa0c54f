//! # folio-store
//!
//! The data layer of Folio. Each collection gets a *context*: an in-memory
//! cache of the collection plus `loading`/`error` state, with CRUD methods
//! that call the backend first and touch the cache only after success.
//!
//! - [`backend`]: the `DocumentStore` / `FileStore` / `AccountStore` seams and
//!   their Appwrite implementation
//! - [`memory`]: an in-process backend that records every call
//! - [`context`]: the generic collection context
//! - per-entity contexts: [`projects`], [`experience`], [`messages`], [`jobs`],
//!   [`cvs`], [`profile`], [`auth`]
//! - [`poller`]: the interval-gated message refresh
//! - [`schema`]: collection/bucket provisioning

pub mod auth;
pub mod backend;
pub mod context;
pub mod cvs;
pub mod experience;
pub mod files;
pub mod jobs;
pub mod kanban;
pub mod memory;
pub mod messages;
pub mod poller;
pub mod profile;
pub mod projects;
pub mod schema;

pub use auth::{AuthContext, AuthState};
pub use backend::{AccountStore, AppwriteBackend, DocumentStore, FileStore};
pub use context::{CollectionContext, ContextState};
pub use cvs::CvContext;
pub use experience::ExperienceContext;
pub use files::{FileBucket, FileChanges};
pub use jobs::{JobContext, JobStats};
pub use kanban::{Board, Column, MoveOutcome};
pub use memory::MemoryBackend;
pub use messages::MessagesContext;
pub use poller::{DEFAULT_POLL_INTERVAL, MessagePoller, PollGate};
pub use profile::ProfileContext;
pub use projects::ProjectContext;
pub use schema::ProvisionReport;

use folio_common::config::AppConfig;
use folio_common::models::UploadRule;
use std::sync::Arc;

/// Every context of the application, wired to one backend.
#[derive(Clone)]
pub struct Contexts {
    pub projects: Arc<ProjectContext>,
    pub experience: Arc<ExperienceContext>,
    pub messages: Arc<MessagesContext>,
    pub jobs: Arc<JobContext>,
    pub cvs: Arc<CvContext>,
    pub profile: Arc<ProfileContext>,
    pub auth: Arc<AuthContext>,
}

impl Contexts {
    /// Build all contexts over a backend that implements every store trait.
    pub fn new<B>(backend: Arc<B>, config: &AppConfig) -> Self
    where
        B: DocumentStore + FileStore + AccountStore + 'static,
    {
        let docs: Arc<dyn DocumentStore> = backend.clone();
        let files: Arc<dyn FileStore> = backend.clone();
        let account: Arc<dyn AccountStore> = backend;
        let limit = config.limits.list_limit;

        let images = FileBucket::new(
            files.clone(),
            &config.buckets.images,
            UploadRule::image().with_max_bytes(config.limits.max_upload_bytes),
        );
        let documents = FileBucket::new(
            files,
            &config.buckets.cvs,
            UploadRule::document().with_max_bytes(config.limits.max_upload_bytes),
        );

        Self {
            projects: Arc::new(ProjectContext::new(
                CollectionContext::new("Project", &config.collections.projects, docs.clone())
                    .with_limit(limit),
                images.clone(),
            )),
            experience: Arc::new(ExperienceContext::new(
                CollectionContext::new("Experience", &config.collections.experience, docs.clone())
                    .with_limit(limit),
                images.clone(),
            )),
            messages: Arc::new(MessagesContext::new(
                CollectionContext::new("Message", &config.collections.messages, docs.clone())
                    .with_limit(limit),
            )),
            jobs: Arc::new(JobContext::new(
                CollectionContext::new(
                    "Job application",
                    &config.collections.job_applications,
                    docs.clone(),
                )
                .with_limit(limit),
            )),
            cvs: Arc::new(CvContext::new(
                CollectionContext::new("CV", &config.collections.cvs, docs.clone()).with_limit(limit),
                documents,
            )),
            profile: Arc::new(ProfileContext::new(
                CollectionContext::new("Profile", &config.collections.personal, docs),
                images,
            )),
            auth: Arc::new(AuthContext::new(account)),
        }
    }
}
