//! One storage bucket plus the upload rule its files must satisfy.
//!
//! Uploads are validated up front and stored sequentially. Deletions of
//! replaced files are best-effort: failures are logged and swallowed.

use folio_common::error::FolioResult;
use folio_common::models::{ImageChange, Upload, UploadRule};
use folio_common::validation::validate_uploads;
use std::sync::Arc;

use crate::backend::FileStore;

/// Files touched while editing a record: `fresh` were stored by this edit,
/// `stale` are stored files the edit stops referencing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FileChanges {
    pub fresh: Vec<String>,
    pub stale: Vec<String>,
}

#[derive(Clone)]
pub struct FileBucket {
    store: Arc<dyn FileStore>,
    bucket: String,
    rule: UploadRule,
}

impl FileBucket {
    pub fn new(store: Arc<dyn FileStore>, bucket: impl Into<String>, rule: UploadRule) -> Self {
        Self { store, bucket: bucket.into(), rule }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn rule(&self) -> &UploadRule {
        &self.rule
    }

    pub fn validate<'a>(&self, uploads: impl IntoIterator<Item = &'a Upload>) -> FolioResult<()> {
        validate_uploads(uploads, &self.rule)
    }

    /// Store one file under a fresh ID and return the ID.
    pub async fn upload(&self, upload: &Upload) -> FolioResult<String> {
        self.validate([upload])?;
        let file_id = folio_appwrite::unique_id();
        let stored = self.store.create_file(&self.bucket, &file_id, upload).await?;
        tracing::info!(bucket = %self.bucket, file_id = %stored.id, name = %upload.file_name, "file stored");
        Ok(stored.id)
    }

    /// Store files one after another. If any fails, the ones already stored
    /// by this call are removed again before the error is returned.
    pub async fn upload_all(&self, uploads: &[Upload]) -> FolioResult<Vec<String>> {
        self.validate(uploads)?;
        let mut ids = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.upload(upload).await {
                Ok(id) => ids.push(id),
                Err(e) => {
                    self.remove_best_effort(&ids).await;
                    return Err(e);
                }
            }
        }
        Ok(ids)
    }

    /// Delete files, logging and ignoring failures.
    pub async fn remove_best_effort(&self, file_ids: &[String]) {
        for file_id in file_ids {
            if let Err(e) = self.store.delete_file(&self.bucket, file_id).await {
                tracing::warn!(bucket = %self.bucket, %file_id, error = %e, "could not delete file");
            }
        }
    }

    /// Apply an edit to a single-image field whose stored value is `current`.
    ///
    /// Returns `None` when the field is unchanged, otherwise the new value.
    pub async fn apply_image_change(
        &self,
        current: Option<&str>,
        change: &ImageChange,
        changes: &mut FileChanges,
    ) -> FolioResult<Option<Option<String>>> {
        match change {
            ImageChange::Keep => Ok(None),
            ImageChange::Remove => {
                changes.stale.extend(current.map(str::to_string));
                Ok(Some(None))
            }
            ImageChange::Replace(upload) => {
                let id = self.upload(upload).await?;
                changes.fresh.push(id.clone());
                changes.stale.extend(current.map(str::to_string));
                Ok(Some(Some(id)))
            }
        }
    }

    /// The record now points at the new files; drop the old ones.
    pub async fn commit(&self, changes: &FileChanges) {
        self.remove_best_effort(&changes.stale).await;
    }

    /// The record update failed; drop the files this edit stored.
    pub async fn rollback(&self, changes: &FileChanges) {
        self.remove_best_effort(&changes.fresh).await;
    }

    pub fn view_url(&self, file_id: &str) -> String {
        self.store.view_url(&self.bucket, file_id)
    }

    pub fn download_url(&self, file_id: &str) -> String {
        self.store.download_url(&self.bucket, file_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{CallKind, MemoryBackend};

    fn png() -> Upload {
        Upload::new("a.png", "image/png", vec![1, 2, 3])
    }

    #[tokio::test]
    async fn failed_batch_removes_partial_uploads() {
        let backend = MemoryBackend::new();
        let bucket = FileBucket::new(Arc::new(backend.clone()), "images", UploadRule::image());

        backend.fail_nth(CallKind::CreateFile, 2);
        let uploads = vec![png(), png(), png()];

        assert!(bucket.upload_all(&uploads).await.is_err());
        assert_eq!(backend.count(CallKind::CreateFile), 2);
        assert_eq!(backend.count(CallKind::DeleteFile), 1);
        assert_eq!(backend.file_count(), 0);
    }

    #[tokio::test]
    async fn invalid_batch_makes_no_calls() {
        let backend = MemoryBackend::new();
        let bucket = FileBucket::new(Arc::new(backend.clone()), "images", UploadRule::image());
        let uploads = vec![png(), Upload::new("notes.txt", "text/plain", vec![1])];

        assert!(bucket.upload_all(&uploads).await.is_err());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn replace_marks_old_file_stale() {
        let backend = MemoryBackend::new();
        let bucket = FileBucket::new(Arc::new(backend.clone()), "images", UploadRule::image());
        let mut changes = FileChanges::default();

        let value = bucket
            .apply_image_change(Some("old"), &ImageChange::Replace(png()), &mut changes)
            .await
            .unwrap();
        let new_id = value.flatten().unwrap();
        assert_eq!(changes.fresh, vec![new_id]);
        assert_eq!(changes.stale, vec!["old".to_string()]);
    }
}
