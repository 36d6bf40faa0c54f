//! Site owner profile: a single document in the `personal` collection.

use folio_common::error::FolioResult;
use folio_common::models::{Document, ImageChange, Profile, ProfileUpdate};
use folio_common::validation::validate_request;

use crate::context::{CollectionContext, ContextState};
use crate::files::{FileBucket, FileChanges};

pub struct ProfileContext {
    docs: CollectionContext<Profile>,
    images: FileBucket,
}

impl ProfileContext {
    pub fn new(docs: CollectionContext<Profile>, images: FileBucket) -> Self {
        Self { docs: docs.with_limit(1), images }
    }

    pub async fn snapshot(&self) -> ContextState<Profile> {
        self.docs.snapshot().await
    }

    pub async fn error(&self) -> Option<String> {
        self.docs.error().await
    }

    /// The cached profile, if loaded.
    pub async fn current(&self) -> Option<Document<Profile>> {
        self.docs.items().await.into_iter().next()
    }

    /// Fetch the profile document. `None` until one has been saved.
    pub async fn load(&self) -> FolioResult<Option<Document<Profile>>> {
        let items = self.docs.fetch_all().await?;
        Ok(items.into_iter().next())
    }

    /// Save the settings form, creating the document the first time.
    pub async fn save(
        &self,
        form: ProfileUpdate,
        avatar: ImageChange,
    ) -> FolioResult<Document<Profile>> {
        self.docs
            .track("save", async {
                validate_request(&form)?;
                if let ImageChange::Replace(upload) = &avatar {
                    self.images.validate([upload])?;
                }

                let existing = match self.current().await {
                    Some(doc) => Some(doc),
                    None => self.docs.raw_fetch_all().await?.into_iter().next(),
                };
                let current_avatar = existing.as_ref().and_then(|d| d.avatar.clone());

                let mut changes = FileChanges::default();
                let result = async {
                    let avatar = self
                        .images
                        .apply_image_change(current_avatar.as_deref(), &avatar, &mut changes)
                        .await?
                        .unwrap_or(current_avatar.clone());
                    let profile = form.into_profile(avatar);
                    match &existing {
                        Some(doc) => {
                            let data = serde_json::to_value(&profile)
                                .map_err(|e| anyhow::anyhow!("Cannot encode profile: {e}"))?;
                            self.docs.raw_update(&doc.id, data).await
                        }
                        None => self.docs.raw_create(&profile).await,
                    }
                }
                .await;

                match &result {
                    Ok(doc) => {
                        self.images.commit(&changes).await;
                        tracing::info!(id = %doc.id, "profile saved");
                    }
                    Err(_) => self.images.rollback(&changes).await,
                }
                result
            })
            .await
    }

    pub async fn avatar_url(&self) -> Option<String> {
        let profile = self.current().await?;
        profile.avatar.as_deref().map(|id| self.images.view_url(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{CallKind, MemoryBackend};
    use folio_common::models::{Upload, UploadRule};
    use std::sync::Arc;

    fn context(backend: &MemoryBackend) -> ProfileContext {
        let store = Arc::new(backend.clone());
        ProfileContext::new(
            CollectionContext::new("Profile", "personal", store.clone()),
            FileBucket::new(store, "images", UploadRule::image()),
        )
    }

    fn form(title: &str) -> ProfileUpdate {
        ProfileUpdate {
            name: "Ada Lovelace".into(),
            title: title.into(),
            email: "ada@example.com".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn save_creates_then_updates() {
        let backend = MemoryBackend::new();
        let profile = context(&backend);
        assert!(profile.load().await.unwrap().is_none());

        let created = profile.save(form("Engineer"), ImageChange::Keep).await.unwrap();
        let updated = profile.save(form("Staff Engineer"), ImageChange::Keep).await.unwrap();

        assert_eq!(created.id, updated.id);
        assert_eq!(updated.title, "Staff Engineer");
        assert_eq!(backend.count(CallKind::CreateDocument), 1);
        assert_eq!(backend.count(CallKind::UpdateDocument), 1);
        assert_eq!(backend.document_count("personal"), 1);
    }

    #[tokio::test]
    async fn avatar_survives_a_text_only_save() {
        let backend = MemoryBackend::new();
        let profile = context(&backend);
        let avatar = Upload::new("me.jpg", "image/jpeg", vec![0xFF, 0xD8]);
        let first = profile.save(form("Engineer"), ImageChange::Replace(avatar)).await.unwrap();
        let avatar_id = first.avatar.clone().unwrap();

        let second = profile.save(form("Engineer"), ImageChange::Keep).await.unwrap();
        assert_eq!(second.avatar.as_deref(), Some(avatar_id.as_str()));
        assert_eq!(
            profile.avatar_url().await.unwrap(),
            format!("memory://images/{avatar_id}/view")
        );

        profile.save(form("Engineer"), ImageChange::Remove).await.unwrap();
        assert!(!backend.has_file("images", &avatar_id));
    }

    #[tokio::test]
    async fn existing_profile_is_found_when_cache_is_cold() {
        let backend = MemoryBackend::new();
        backend.seed(
            "personal",
            "me",
            serde_json::json!({ "name": "Ada", "title": "Engineer", "email": "ada@example.com" }),
        );
        let profile = context(&backend);

        let saved = profile.save(form("CTO"), ImageChange::Keep).await.unwrap();
        assert_eq!(saved.id, "me");
        assert_eq!(backend.count(CallKind::CreateDocument), 0);
    }
}
