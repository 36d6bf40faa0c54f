//! Job application tracker.
//!
//! Besides plain CRUD the context drives the Kanban board: moving a card is a
//! single status update, and only one move may be in flight at a time.

use folio_common::error::FolioResult;
use folio_common::models::{
    Cv, Document, JobApplication, JobApplicationUpdate, JobStatus, NewJobApplication,
};
use folio_common::validation::validate_request;
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::context::{CollectionContext, ContextState};
use crate::kanban::{Board, MoveOutcome};

pub struct JobContext {
    docs: CollectionContext<JobApplication>,
    is_updating: AtomicBool,
}

/// Clears the in-flight flag when the move finishes, however it finishes.
struct UpdateGuard<'a>(&'a AtomicBool);

impl<'a> UpdateGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Application counts per status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStats {
    pub total: usize,
    pub by_status: Vec<(JobStatus, usize)>,
}

impl JobStats {
    pub fn count(&self, status: JobStatus) -> usize {
        self.by_status
            .iter()
            .find(|(s, _)| *s == status)
            .map_or(0, |(_, n)| *n)
    }

    /// Applications still waiting on a decision.
    pub fn active(&self) -> usize {
        self.count(JobStatus::Applied) + self.count(JobStatus::Interview) + self.count(JobStatus::Offer)
    }
}

impl JobContext {
    pub fn new(docs: CollectionContext<JobApplication>) -> Self {
        Self { docs, is_updating: AtomicBool::new(false) }
    }

    pub async fn snapshot(&self) -> ContextState<JobApplication> {
        self.docs.snapshot().await
    }

    pub async fn items(&self) -> Vec<Document<JobApplication>> {
        self.docs.items().await
    }

    pub async fn error(&self) -> Option<String> {
        self.docs.error().await
    }

    pub async fn clear_error(&self) {
        self.docs.clear_error().await
    }

    /// True while a Kanban move is waiting on the backend.
    pub fn is_updating(&self) -> bool {
        self.is_updating.load(Ordering::Acquire)
    }

    pub async fn fetch_all(&self) -> FolioResult<Vec<Document<JobApplication>>> {
        self.docs.fetch_all().await
    }

    pub async fn get(&self, id: &str) -> FolioResult<Document<JobApplication>> {
        self.docs.get(id).await
    }

    pub async fn create(&self, form: NewJobApplication) -> FolioResult<Document<JobApplication>> {
        self.docs
            .track("create", async {
                validate_request(&form)?;
                let doc = self.docs.raw_create(&JobApplication::from(form)).await?;
                tracing::info!(id = %doc.id, company = %doc.company, status = %doc.status, "application added");
                Ok(doc)
            })
            .await
    }

    pub async fn update(
        &self,
        id: &str,
        update: JobApplicationUpdate,
    ) -> FolioResult<Document<JobApplication>> {
        self.docs
            .track("update", async {
                validate_request(&update)?;
                let patch = serde_json::to_value(&update)
                    .map_err(|e| anyhow::anyhow!("Cannot encode application update: {e}"))?;
                self.docs.raw_update(id, patch).await
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> FolioResult<()> {
        self.docs.delete(id).await
    }

    /// Move an application to another column.
    ///
    /// Sends exactly one `{status}` update, and only when the status actually
    /// changes. While a move is in flight further moves return
    /// [`MoveOutcome::Busy`] without touching the backend.
    pub async fn move_to(&self, id: &str, status: JobStatus) -> FolioResult<MoveOutcome> {
        let Some(_guard) = UpdateGuard::acquire(&self.is_updating) else {
            tracing::debug!(%id, %status, "move ignored, another update is in flight");
            return Ok(MoveOutcome::Busy);
        };

        self.docs
            .track("move", async {
                let current = self.docs.raw_current(id).await?;
                if current.status == status {
                    return Ok(MoveOutcome::Unchanged);
                }
                let doc = self.docs.raw_update(id, json!({ "status": status })).await?;
                tracing::info!(%id, from = %current.status, to = %status, "application moved");
                Ok(MoveOutcome::Moved(Box::new(doc)))
            })
            .await
    }

    /// The cached applications grouped into Kanban columns.
    pub async fn board(&self) -> Board {
        Board::group(&self.docs.items().await)
    }

    pub async fn stats(&self) -> JobStats {
        let items = self.docs.items().await;
        let by_status = JobStatus::ALL
            .into_iter()
            .map(|s| (s, items.iter().filter(|a| a.status == s).count()))
            .collect();
        JobStats { total: items.len(), by_status }
    }

    /// The CV an application was sent with, if it still exists.
    pub fn cv_for<'a>(
        application: &JobApplication,
        cvs: &'a [Document<Cv>],
    ) -> Option<&'a Document<Cv>> {
        let cv_id = application.fk_cv_id.as_deref()?;
        cvs.iter().find(|cv| cv.id == cv_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Call, CallKind, MemoryBackend};
    use std::sync::Arc;

    fn context(backend: &MemoryBackend) -> JobContext {
        JobContext::new(CollectionContext::new(
            "Job application",
            "jobApplications",
            Arc::new(backend.clone()),
        ))
    }

    fn application(company: &str, status: JobStatus) -> NewJobApplication {
        NewJobApplication {
            company: company.into(),
            position: "Backend Engineer".into(),
            status,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn move_sends_single_status_update() {
        let backend = MemoryBackend::new();
        let jobs = context(&backend);
        let doc = jobs.create(application("Acme", JobStatus::Applied)).await.unwrap();
        backend.clear_calls();

        let outcome = jobs.move_to(&doc.id, JobStatus::Interview).await.unwrap();
        assert!(matches!(outcome, MoveOutcome::Moved(ref d) if d.status == JobStatus::Interview));
        assert_eq!(
            backend.calls(),
            vec![Call::UpdateDocument {
                collection: "jobApplications".into(),
                id: doc.id.clone(),
                data: json!({ "status": "interview" }),
            }]
        );
        assert!(!jobs.is_updating());
    }

    #[tokio::test]
    async fn move_to_same_column_sends_nothing() {
        let backend = MemoryBackend::new();
        let jobs = context(&backend);
        let doc = jobs.create(application("Acme", JobStatus::Offer)).await.unwrap();
        backend.clear_calls();

        assert_eq!(jobs.move_to(&doc.id, JobStatus::Offer).await.unwrap(), MoveOutcome::Unchanged);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn move_while_busy_is_ignored() {
        let backend = MemoryBackend::new();
        let jobs = context(&backend);
        let doc = jobs.create(application("Acme", JobStatus::Applied)).await.unwrap();
        backend.clear_calls();

        let held = UpdateGuard::acquire(&jobs.is_updating).unwrap();
        assert_eq!(jobs.move_to(&doc.id, JobStatus::Offer).await.unwrap(), MoveOutcome::Busy);
        assert!(backend.calls().is_empty());
        drop(held);

        assert!(matches!(
            jobs.move_to(&doc.id, JobStatus::Offer).await.unwrap(),
            MoveOutcome::Moved(_)
        ));
    }

    #[tokio::test]
    async fn failed_move_releases_flag() {
        let backend = MemoryBackend::new();
        let jobs = context(&backend);
        let doc = jobs.create(application("Acme", JobStatus::Applied)).await.unwrap();
        backend.fail_next(CallKind::UpdateDocument);

        assert!(jobs.move_to(&doc.id, JobStatus::Rejected).await.is_err());
        assert!(!jobs.is_updating());
        assert_eq!(jobs.items().await[0].status, JobStatus::Applied);
    }

    #[tokio::test]
    async fn board_and_stats_group_by_status() {
        let backend = MemoryBackend::new();
        let jobs = context(&backend);
        jobs.create(application("A", JobStatus::Applied)).await.unwrap();
        jobs.create(application("B", JobStatus::Applied)).await.unwrap();
        jobs.create(application("C", JobStatus::Rejected)).await.unwrap();

        let board = jobs.board().await;
        assert_eq!(board.column(JobStatus::Applied).unwrap().len(), 2);
        let stats = jobs.stats().await;
        assert_eq!(stats.total, 3);
        assert_eq!(stats.count(JobStatus::Rejected), 1);
        assert_eq!(stats.active(), 2);
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let backend = MemoryBackend::new();
        let jobs = context(&backend);
        let doc = jobs.create(application("Acme", JobStatus::Wishlist)).await.unwrap();

        let update = JobApplicationUpdate { salary: Some("100k".into()), ..Default::default() };
        let updated = jobs.update(&doc.id, update).await.unwrap();
        assert_eq!(updated.salary.as_deref(), Some("100k"));
        assert_eq!(updated.company, "Acme");
    }

    #[test]
    fn cv_reference_resolves_by_id() {
        let cv = Document {
            id: "cv1".into(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            data: Cv { name: "Main".into(), ..Default::default() },
        };
        let cvs = vec![cv];
        let app = JobApplication { fk_cv_id: Some("cv1".into()), ..Default::default() };
        assert_eq!(JobContext::cv_for(&app, &cvs).unwrap().name, "Main");

        let dangling = JobApplication { fk_cv_id: Some("gone".into()), ..Default::default() };
        assert!(JobContext::cv_for(&dangling, &cvs).is_none());
    }
}
