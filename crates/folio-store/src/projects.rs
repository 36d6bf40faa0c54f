//! Portfolio projects: a collection context plus the image bucket that holds
//! each project's cover and gallery.

use folio_common::error::FolioResult;
use folio_common::models::{
    Document, GalleryChange, ImageChange, NewProject, Project, ProjectUpdate, Upload,
    normalize_tags,
};
use folio_common::validation::validate_request;
use serde_json::{Map, Value, json};

use crate::context::{CollectionContext, ContextState};
use crate::files::{FileBucket, FileChanges};

pub struct ProjectContext {
    docs: CollectionContext<Project>,
    images: FileBucket,
}

impl ProjectContext {
    pub fn new(docs: CollectionContext<Project>, images: FileBucket) -> Self {
        Self { docs, images }
    }

    pub fn documents(&self) -> &CollectionContext<Project> {
        &self.docs
    }

    pub async fn snapshot(&self) -> ContextState<Project> {
        self.docs.snapshot().await
    }

    pub async fn items(&self) -> Vec<Document<Project>> {
        self.docs.items().await
    }

    pub async fn error(&self) -> Option<String> {
        self.docs.error().await
    }

    pub async fn clear_error(&self) {
        self.docs.clear_error().await
    }

    pub async fn fetch_all(&self) -> FolioResult<Vec<Document<Project>>> {
        self.docs.fetch_all().await
    }

    pub async fn get(&self, id: &str) -> FolioResult<Document<Project>> {
        self.docs.get(id).await
    }

    /// Store the cover and gallery, then create the record.
    ///
    /// Every file is checked before the first request goes out. If the record
    /// cannot be created the files stored for it are removed again.
    pub async fn create(
        &self,
        form: NewProject,
        cover: Option<Upload>,
        gallery: Vec<Upload>,
    ) -> FolioResult<Document<Project>> {
        self.docs
            .track("create", async {
                validate_request(&form)?;
                self.images.validate(cover.iter().chain(gallery.iter()))?;

                let mut changes = FileChanges::default();
                let result = self.store_new(form, cover.as_ref(), &gallery, &mut changes).await;
                if result.is_err() {
                    self.images.rollback(&changes).await;
                }
                result
            })
            .await
    }

    async fn store_new(
        &self,
        form: NewProject,
        cover: Option<&Upload>,
        gallery: &[Upload],
        changes: &mut FileChanges,
    ) -> FolioResult<Document<Project>> {
        let cover_image = match cover {
            Some(upload) => {
                let id = self.images.upload(upload).await?;
                changes.fresh.push(id.clone());
                Some(id)
            }
            None => None,
        };
        let images = self.images.upload_all(gallery).await?;
        changes.fresh.extend(images.iter().cloned());

        let doc = self.docs.raw_create(&form.into_project(cover_image, images)).await?;
        tracing::info!(id = %doc.id, name = %doc.name, "project created");
        Ok(doc)
    }

    /// Apply an edit. New files are stored first; files the project stops
    /// referencing are deleted only once the record points away from them.
    pub async fn update(&self, id: &str, update: ProjectUpdate) -> FolioResult<Document<Project>> {
        self.docs
            .track("update", async {
                validate_request(&update)?;
                if let ImageChange::Replace(upload) = &update.cover {
                    self.images.validate([upload])?;
                }
                if let Some(gallery) = &update.gallery {
                    self.images.validate(&gallery.add)?;
                }

                let current = self.docs.raw_current(id).await?;
                let mut changes = FileChanges::default();
                match self.apply_update(id, &current, update, &mut changes).await {
                    Ok(doc) => {
                        self.images.commit(&changes).await;
                        Ok(doc)
                    }
                    Err(e) => {
                        self.images.rollback(&changes).await;
                        Err(e)
                    }
                }
            })
            .await
    }

    async fn apply_update(
        &self,
        id: &str,
        current: &Project,
        update: ProjectUpdate,
        changes: &mut FileChanges,
    ) -> FolioResult<Document<Project>> {
        let mut patch = Map::new();
        if let Some(name) = update.name {
            patch.insert("name".into(), json!(name.trim()));
        }
        if let Some(description) = update.description {
            patch.insert("description".into(), json!(description));
        }
        if let Some(technologies) = update.technologies {
            patch.insert("technologies".into(), json!(normalize_tags(technologies)));
        }
        if let Some(url) = update.github_url {
            patch.insert("githubUrl".into(), json!(url));
        }
        if let Some(url) = update.live_url {
            patch.insert("liveUrl".into(), json!(url));
        }
        if let Some(featured) = update.featured {
            patch.insert("featured".into(), json!(featured));
        }

        if let Some(cover) = self
            .images
            .apply_image_change(current.cover_image.as_deref(), &update.cover, changes)
            .await?
        {
            patch.insert("coverImage".into(), json!(cover));
        }
        if let Some(gallery) = update.gallery {
            let images = self.apply_gallery_change(&current.images, gallery, changes).await?;
            patch.insert("images".into(), json!(images));
        }

        self.docs.raw_update(id, Value::Object(patch)).await
    }

    /// Retained IDs keep their order; new uploads go after them. IDs in
    /// `keep` that the project never referenced are ignored.
    async fn apply_gallery_change(
        &self,
        current: &[String],
        change: GalleryChange,
        changes: &mut FileChanges,
    ) -> FolioResult<Vec<String>> {
        let mut images: Vec<String> = change
            .keep
            .into_iter()
            .filter(|id| current.contains(id))
            .collect();
        changes
            .stale
            .extend(current.iter().filter(|id| !images.contains(id)).cloned());

        let added = self.images.upload_all(&change.add).await?;
        changes.fresh.extend(added.iter().cloned());
        images.extend(added);
        Ok(images)
    }

    /// Delete the project's files (best-effort), then the record.
    pub async fn delete(&self, id: &str) -> FolioResult<()> {
        self.docs
            .track("delete", async {
                let current = self.docs.raw_current(id).await?;
                self.images.remove_best_effort(&current.file_ids()).await;
                self.docs.raw_delete(id).await?;
                tracing::info!(%id, "project deleted");
                Ok(())
            })
            .await
    }

    /// Cached projects matching `term` in name, description, or technologies.
    pub async fn search(&self, term: &str) -> Vec<Document<Project>> {
        let mut items = self.docs.items().await;
        items.retain(|p| p.matches(term));
        items
    }

    pub async fn featured(&self) -> Vec<Document<Project>> {
        let mut items = self.docs.items().await;
        items.retain(|p| p.featured);
        items
    }

    pub fn image_url(&self, file_id: &str) -> String {
        self.images.view_url(file_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Call, CallKind, MemoryBackend};
    use folio_common::error::FolioError;
    use folio_common::models::{MAX_UPLOAD_BYTES, UploadRule};
    use std::sync::Arc;

    fn context(backend: &MemoryBackend) -> ProjectContext {
        let store = Arc::new(backend.clone());
        ProjectContext::new(
            CollectionContext::new("Project", "projects", store.clone()),
            FileBucket::new(store, "images", UploadRule::image()),
        )
    }

    fn demo() -> NewProject {
        NewProject { name: "Demo".into(), description: "Desc".into(), ..Default::default() }
    }

    fn png(name: &str) -> Upload {
        Upload::new(name, "image/png", vec![137, 80, 78, 71])
    }

    #[tokio::test]
    async fn create_uploads_cover_then_creates_record() {
        let backend = MemoryBackend::new();
        let projects = context(&backend);

        let doc = projects.create(demo(), Some(png("cover.png")), vec![]).await.unwrap();

        assert_eq!(backend.count(CallKind::CreateFile), 1);
        let created: Vec<_> = backend
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateDocument { data, .. } => Some(data),
                _ => None,
            })
            .collect();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0]["technologies"], json!([]));
        assert_eq!(created[0]["coverImage"], json!(doc.cover_image));

        let items = projects.items().await;
        assert_eq!(items[0].id, doc.id);
        assert!(projects.fetch_all().await.unwrap().iter().any(|p| p.id == doc.id));
    }

    #[tokio::test]
    async fn oversized_or_non_image_upload_makes_no_calls() {
        let backend = MemoryBackend::new();
        let projects = context(&backend);

        let big = Upload::new("big.png", "image/png", vec![0; MAX_UPLOAD_BYTES as usize + 1]);
        assert!(projects.create(demo(), Some(big), vec![]).await.is_err());

        let pdf = Upload::new("cv.pdf", "application/pdf", vec![1]);
        let err = projects.create(demo(), None, vec![png("a.png"), pdf]).await.unwrap_err();
        assert!(matches!(err, FolioError::Validation { .. }));

        assert!(backend.calls().is_empty());
        assert!(projects.error().await.is_some());
    }

    #[tokio::test]
    async fn failed_create_removes_stored_files() {
        let backend = MemoryBackend::new();
        let projects = context(&backend);
        backend.fail_next(CallKind::CreateDocument);

        let result = projects.create(demo(), Some(png("c.png")), vec![png("g.png")]).await;
        assert!(result.is_err());
        assert_eq!(backend.count(CallKind::CreateFile), 2);
        assert_eq!(backend.file_count(), 0);
        assert!(projects.items().await.is_empty());
    }

    #[tokio::test]
    async fn replacing_cover_deletes_old_file_after_update() {
        let backend = MemoryBackend::new();
        let projects = context(&backend);
        let doc = projects.create(demo(), Some(png("old.png")), vec![]).await.unwrap();
        let old = doc.cover_image.clone().unwrap();

        let updated = projects
            .update(
                &doc.id,
                ProjectUpdate {
                    featured: Some(true),
                    cover: ImageChange::Replace(png("new.png")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let new = updated.cover_image.clone().unwrap();
        assert_ne!(new, old);
        assert!(updated.featured);
        assert!(!backend.has_file("images", &old));
        assert!(backend.has_file("images", &new));
        assert_eq!(projects.featured().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_update_keeps_old_cover() {
        let backend = MemoryBackend::new();
        let projects = context(&backend);
        let doc = projects.create(demo(), Some(png("old.png")), vec![]).await.unwrap();
        let old = doc.cover_image.clone().unwrap();
        backend.fail_next(CallKind::UpdateDocument);

        let update = ProjectUpdate { cover: ImageChange::Replace(png("new.png")), ..Default::default() };
        assert!(projects.update(&doc.id, update).await.is_err());
        assert!(backend.has_file("images", &old));
        assert_eq!(backend.file_count(), 1);
        assert_eq!(projects.items().await[0].cover_image.as_deref(), Some(old.as_str()));
    }

    #[tokio::test]
    async fn gallery_edit_drops_unkept_images() {
        let backend = MemoryBackend::new();
        let projects = context(&backend);
        let doc = projects
            .create(demo(), None, vec![png("1.png"), png("2.png")])
            .await
            .unwrap();
        let (first, second) = (doc.images[0].clone(), doc.images[1].clone());

        let update = ProjectUpdate {
            gallery: Some(GalleryChange {
                keep: vec![second.clone(), "unknown".into()],
                add: vec![png("3.png")],
            }),
            ..Default::default()
        };
        let updated = projects.update(&doc.id, update).await.unwrap();

        assert_eq!(updated.images.len(), 2);
        assert_eq!(updated.images[0], second);
        assert!(!backend.has_file("images", &first));
        assert_eq!(backend.file_count(), 2);
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let backend = MemoryBackend::new();
        let projects = context(&backend);
        let doc = projects
            .create(demo(), Some(png("c.png")), vec![png("g.png")])
            .await
            .unwrap();

        projects.delete(&doc.id).await.unwrap();
        assert_eq!(backend.file_count(), 0);
        assert!(projects.items().await.is_empty());

        let err = projects.delete(&doc.id).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Project not found");
    }

    #[tokio::test]
    async fn search_matches_technologies_case_insensitively() {
        let backend = MemoryBackend::new();
        let projects = context(&backend);
        let form = NewProject { technologies: vec!["Rust".into()], ..demo() };
        projects.create(form, None, vec![]).await.unwrap();
        projects
            .create(NewProject { name: "Other".into(), ..demo() }, None, vec![])
            .await
            .unwrap();

        assert_eq!(projects.search("rust").await.len(), 1);
        assert_eq!(projects.search("").await.len(), 2);
        assert_eq!(projects.image_url("f1"), "memory://images/f1/view");
    }
}
