//! CV documents: a record per CV plus its file in the CV bucket.

use folio_common::error::{FolioError, FolioResult};
use folio_common::models::{Cv, Document, Upload};
use serde_json::json;

use crate::context::{CollectionContext, ContextState};
use crate::files::FileBucket;

pub struct CvContext {
    docs: CollectionContext<Cv>,
    files: FileBucket,
}

impl CvContext {
    pub fn new(docs: CollectionContext<Cv>, files: FileBucket) -> Self {
        Self { docs, files }
    }

    pub async fn snapshot(&self) -> ContextState<Cv> {
        self.docs.snapshot().await
    }

    pub async fn items(&self) -> Vec<Document<Cv>> {
        self.docs.items().await
    }

    pub async fn error(&self) -> Option<String> {
        self.docs.error().await
    }

    pub async fn fetch_all(&self) -> FolioResult<Vec<Document<Cv>>> {
        self.docs.fetch_all().await
    }

    /// Store the file and create its record. The first CV becomes the default.
    pub async fn upload(&self, name: &str, file: Upload) -> FolioResult<Document<Cv>> {
        self.docs
            .track("upload", async {
                let name = name.trim();
                if name.is_empty() {
                    return Err(FolioError::validation("CV name is required"));
                }
                self.files.validate([&file])?;
                // The cache may be cold, so ask the backend
                let first = self.docs.raw_fetch_all().await?.is_empty();

                let file_id = self.files.upload(&file).await?;
                let cv = Cv {
                    name: name.to_string(),
                    file_id: file_id.clone(),
                    file_name: file.file_name.clone(),
                    is_default: first,
                };
                match self.docs.raw_create(&cv).await {
                    Ok(doc) => Ok(doc),
                    Err(e) => {
                        self.files.remove_best_effort(&[file_id]).await;
                        Err(e)
                    }
                }
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> FolioResult<()> {
        self.docs
            .track("delete", async {
                let current = self.docs.raw_current(id).await?;
                self.files.remove_best_effort(&[current.file_id.clone()]).await;
                self.docs.raw_delete(id).await
            })
            .await
    }

    /// Make `id` the default CV and clear the flag everywhere else.
    pub async fn set_default(&self, id: &str) -> FolioResult<Document<Cv>> {
        self.docs
            .track("set default", async {
                let previous: Vec<String> = self
                    .docs
                    .raw_fetch_all()
                    .await?
                    .into_iter()
                    .filter(|cv| cv.is_default && cv.id != id)
                    .map(|cv| cv.id)
                    .collect();
                let doc = self.docs.raw_update(id, json!({ "isDefault": true })).await?;
                for other in &previous {
                    self.docs.raw_update(other, json!({ "isDefault": false })).await?;
                }
                Ok(doc)
            })
            .await
    }

    pub async fn default_cv(&self) -> Option<Document<Cv>> {
        self.docs.items().await.into_iter().find(|cv| cv.is_default)
    }

    pub async fn download_url(&self, id: &str) -> FolioResult<String> {
        let cv = self.docs.raw_current(id).await?;
        Ok(self.files.download_url(&cv.file_id))
    }
}
