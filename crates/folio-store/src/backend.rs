//! Backend seams. Contexts only see these traits; [`AppwriteBackend`] talks to
//! the real service and [`crate::MemoryBackend`] stands in for it in tests.

use async_trait::async_trait;
use folio_appwrite::{AppwriteError, DocumentList, Query, RestClient, StoredFile};
use folio_common::error::{FolioError, FolioResult};
use folio_common::models::{Session, Upload, User};
use serde_json::Value;

/// Document database operations, scoped to one database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> FolioResult<DocumentList<Value>>;

    async fn get_document(&self, collection: &str, id: &str) -> FolioResult<Value>;

    async fn create_document(&self, collection: &str, id: &str, data: Value)
    -> FolioResult<Value>;

    async fn update_document(&self, collection: &str, id: &str, data: Value)
    -> FolioResult<Value>;

    async fn delete_document(&self, collection: &str, id: &str) -> FolioResult<()>;
}

/// File storage operations.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn create_file(
        &self,
        bucket: &str,
        file_id: &str,
        upload: &Upload,
    ) -> FolioResult<StoredFile>;

    async fn delete_file(&self, bucket: &str, file_id: &str) -> FolioResult<()>;

    fn view_url(&self, bucket: &str, file_id: &str) -> String;

    fn download_url(&self, bucket: &str, file_id: &str) -> String;
}

/// The signed-in account.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get_account(&self) -> FolioResult<User>;

    async fn create_session(&self, email: &str, password: &str) -> FolioResult<Session>;

    async fn delete_session(&self) -> FolioResult<()>;

    async fn update_name(&self, name: &str) -> FolioResult<User>;

    async fn update_password(&self, password: &str, old_password: &str) -> FolioResult<User>;
}

/// Map a client error onto the shared error type. `resource` names what was
/// being looked up so a 404 reads "Document not found" or "File not found".
pub fn map_appwrite_error(resource: &str, err: AppwriteError) -> FolioError {
    match err {
        AppwriteError::Api { status: 404, .. } => FolioError::not_found(resource),
        AppwriteError::Api { status: 409, .. } => FolioError::AlreadyExists {
            resource: resource.to_string(),
        },
        AppwriteError::Api { status: 401, .. } => FolioError::Unauthorized,
        AppwriteError::Api { status, message, .. } => FolioError::Backend { status, message },
        other => FolioError::Internal(anyhow::Error::new(other)),
    }
}

/// All three stores over one Appwrite client and database.
#[derive(Clone)]
pub struct AppwriteBackend {
    client: RestClient,
    database: String,
}

impl AppwriteBackend {
    pub fn new(client: RestClient, database: impl Into<String>) -> Self {
        Self { client, database: database.into() }
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

#[async_trait]
impl DocumentStore for AppwriteBackend {
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> FolioResult<DocumentList<Value>> {
        self.client
            .list_documents(&self.database, collection, queries)
            .await
            .map_err(|e| map_appwrite_error("Collection", e))
    }

    async fn get_document(&self, collection: &str, id: &str) -> FolioResult<Value> {
        self.client
            .get_document(&self.database, collection, id)
            .await
            .map_err(|e| map_appwrite_error("Document", e))
    }

    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> FolioResult<Value> {
        tracing::debug!(collection, id, "createDocument");
        self.client
            .create_document(&self.database, collection, id, &data, None)
            .await
            .map_err(|e| map_appwrite_error("Document", e))
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> FolioResult<Value> {
        tracing::debug!(collection, id, "updateDocument");
        self.client
            .update_document(&self.database, collection, id, &data)
            .await
            .map_err(|e| map_appwrite_error("Document", e))
    }

    async fn delete_document(&self, collection: &str, id: &str) -> FolioResult<()> {
        tracing::debug!(collection, id, "deleteDocument");
        self.client
            .delete_document(&self.database, collection, id)
            .await
            .map_err(|e| map_appwrite_error("Document", e))
    }
}

#[async_trait]
impl FileStore for AppwriteBackend {
    async fn create_file(
        &self,
        bucket: &str,
        file_id: &str,
        upload: &Upload,
    ) -> FolioResult<StoredFile> {
        tracing::debug!(bucket, file_id, size = upload.size(), "createFile");
        self.client
            .create_file(
                bucket,
                file_id,
                &upload.file_name,
                &upload.content_type,
                &upload.bytes,
            )
            .await
            .map_err(|e| map_appwrite_error("File", e))
    }

    async fn delete_file(&self, bucket: &str, file_id: &str) -> FolioResult<()> {
        self.client
            .delete_file(bucket, file_id)
            .await
            .map_err(|e| map_appwrite_error("File", e))
    }

    fn view_url(&self, bucket: &str, file_id: &str) -> String {
        self.client.file_view_url(bucket, file_id)
    }

    fn download_url(&self, bucket: &str, file_id: &str) -> String {
        self.client.file_download_url(bucket, file_id)
    }
}

#[async_trait]
impl AccountStore for AppwriteBackend {
    async fn get_account(&self) -> FolioResult<User> {
        self.client
            .get_account()
            .await
            .map_err(|e| map_appwrite_error("Account", e))
    }

    async fn create_session(&self, email: &str, password: &str) -> FolioResult<Session> {
        self.client
            .create_email_session(email, password)
            .await
            .map_err(|e| map_appwrite_error("Session", e))
    }

    async fn delete_session(&self) -> FolioResult<()> {
        self.client
            .delete_session("current")
            .await
            .map_err(|e| map_appwrite_error("Session", e))
    }

    async fn update_name(&self, name: &str) -> FolioResult<User> {
        self.client
            .update_name(name)
            .await
            .map_err(|e| map_appwrite_error("Account", e))
    }

    async fn update_password(&self, password: &str, old_password: &str) -> FolioResult<User> {
        self.client
            .update_password(password, old_password)
            .await
            .map_err(|e| map_appwrite_error("Account", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> AppwriteError {
        AppwriteError::Api { status, message: "m".into(), kind: "k".into() }
    }

    #[test]
    fn status_codes_map_to_error_kinds() {
        assert!(map_appwrite_error("File", api(404)).is_not_found());
        assert!(matches!(map_appwrite_error("File", api(409)), FolioError::AlreadyExists { .. }));
        assert!(matches!(map_appwrite_error("File", api(401)), FolioError::Unauthorized));
        assert!(matches!(
            map_appwrite_error("File", api(503)),
            FolioError::Backend { status: 503, .. }
        ));
    }
}
