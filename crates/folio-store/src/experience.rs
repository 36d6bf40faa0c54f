//! Work experience entries, newest position first, each with an optional
//! company logo in the image bucket.

use folio_appwrite::Query;
use folio_common::error::FolioResult;
use folio_common::models::{
    Document, Experience, ExperienceUpdate, ImageChange, NewExperience, Upload, normalize_tags,
};
use folio_common::validation::validate_request;
use serde_json::{Map, Value, json};

use crate::context::{CollectionContext, ContextState};
use crate::files::{FileBucket, FileChanges};

pub struct ExperienceContext {
    docs: CollectionContext<Experience>,
    images: FileBucket,
}

impl ExperienceContext {
    /// The list is always ordered by `startDate`, latest first.
    pub fn new(docs: CollectionContext<Experience>, images: FileBucket) -> Self {
        Self { docs: docs.with_order(Query::order_desc("startDate")), images }
    }

    pub async fn snapshot(&self) -> ContextState<Experience> {
        self.docs.snapshot().await
    }

    pub async fn items(&self) -> Vec<Document<Experience>> {
        self.docs.items().await
    }

    pub async fn error(&self) -> Option<String> {
        self.docs.error().await
    }

    pub async fn clear_error(&self) {
        self.docs.clear_error().await
    }

    pub async fn fetch_all(&self) -> FolioResult<Vec<Document<Experience>>> {
        self.docs.fetch_all().await
    }

    pub async fn get(&self, id: &str) -> FolioResult<Document<Experience>> {
        self.docs.get(id).await
    }

    pub async fn create(
        &self,
        form: NewExperience,
        logo: Option<Upload>,
    ) -> FolioResult<Document<Experience>> {
        self.docs
            .track("create", async {
                validate_request(&form)?;
                self.images.validate(logo.iter())?;

                let logo_id = match &logo {
                    Some(upload) => Some(self.images.upload(upload).await?),
                    None => None,
                };
                match self.docs.raw_create(&form.into_experience(logo_id.clone())).await {
                    Ok(doc) => {
                        tracing::info!(id = %doc.id, company = %doc.company, "experience created");
                        Ok(doc)
                    }
                    Err(e) => {
                        self.images.remove_best_effort(&logo_id.into_iter().collect::<Vec<_>>()).await;
                        Err(e)
                    }
                }
            })
            .await
    }

    pub async fn update(
        &self,
        id: &str,
        update: ExperienceUpdate,
    ) -> FolioResult<Document<Experience>> {
        self.docs
            .track("update", async {
                validate_request(&update)?;
                if let ImageChange::Replace(upload) = &update.logo {
                    self.images.validate([upload])?;
                }

                let current = self.docs.raw_current(id).await?;
                let mut changes = FileChanges::default();
                let result = async {
                    let mut patch = text_patch(update.clone());
                    if let Some(logo) = self
                        .images
                        .apply_image_change(current.company_logo.as_deref(), &update.logo, &mut changes)
                        .await?
                    {
                        patch.insert("companyLogo".into(), json!(logo));
                    }
                    self.docs.raw_update(id, Value::Object(patch)).await
                }
                .await;

                match &result {
                    Ok(_) => self.images.commit(&changes).await,
                    Err(_) => self.images.rollback(&changes).await,
                }
                result
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> FolioResult<()> {
        self.docs
            .track("delete", async {
                let current = self.docs.raw_current(id).await?;
                let logo: Vec<String> = current.company_logo.iter().cloned().collect();
                self.images.remove_best_effort(&logo).await;
                self.docs.raw_delete(id).await
            })
            .await
    }

    /// Positions still held.
    pub async fn current(&self) -> Vec<Document<Experience>> {
        let mut items = self.docs.items().await;
        items.retain(|e| e.current);
        items
    }

    pub fn logo_url(&self, file_id: &str) -> String {
        self.images.view_url(file_id)
    }
}

fn text_patch(update: ExperienceUpdate) -> Map<String, Value> {
    let mut patch = Map::new();
    if let Some(company) = update.company {
        patch.insert("company".into(), json!(company.trim()));
    }
    if let Some(position) = update.position {
        patch.insert("position".into(), json!(position.trim()));
    }
    if let Some(location) = update.location {
        patch.insert("location".into(), json!(location));
    }
    if let Some(start) = update.start_date {
        patch.insert("startDate".into(), json!(start));
    }
    if let Some(end) = update.end_date {
        patch.insert("endDate".into(), json!(end));
    }
    if let Some(current) = update.current {
        patch.insert("current".into(), json!(current));
        if current {
            patch.insert("endDate".into(), Value::Null);
        }
    }
    if let Some(description) = update.description {
        patch.insert("description".into(), json!(description));
    }
    if let Some(skills) = update.skills {
        patch.insert("skills".into(), json!(normalize_tags(skills)));
    }
    patch
}
