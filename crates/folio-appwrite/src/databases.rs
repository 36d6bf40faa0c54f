//! Databases API: documents, plus the database/collection/attribute endpoints
//! used when provisioning.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::Result;
use crate::query::Query;
use crate::rest::RestClient;
use crate::types::{AttributeSpec, DocumentList};

fn documents_path(database: &str, collection: &str) -> String {
    format!("/databases/{database}/collections/{collection}/documents")
}

impl RestClient {
    // ── Documents ─────────────────────────────────────────────────────────────

    pub async fn list_documents<T: DeserializeOwned>(
        &self,
        database: &str,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList<T>> {
        self.get(&documents_path(database, collection), queries).await
    }

    pub async fn get_document<T: DeserializeOwned>(
        &self,
        database: &str,
        collection: &str,
        document_id: &str,
    ) -> Result<T> {
        self.get(&format!("{}/{document_id}", documents_path(database, collection)), &[])
            .await
    }

    pub async fn create_document<T: DeserializeOwned>(
        &self,
        database: &str,
        collection: &str,
        document_id: &str,
        data: &Value,
        permissions: Option<&[String]>,
    ) -> Result<T> {
        let mut body = json!({ "documentId": document_id, "data": data });
        if let Some(p) = permissions {
            body["permissions"] = json!(p);
        }
        self.post(&documents_path(database, collection), &body).await
    }

    pub async fn update_document<T: DeserializeOwned>(
        &self,
        database: &str,
        collection: &str,
        document_id: &str,
        data: &Value,
    ) -> Result<T> {
        self.patch(
            &format!("{}/{document_id}", documents_path(database, collection)),
            &json!({ "data": data }),
        )
        .await
    }

    pub async fn delete_document(
        &self,
        database: &str,
        collection: &str,
        document_id: &str,
    ) -> Result<()> {
        self.delete(&format!("{}/{document_id}", documents_path(database, collection)))
            .await
    }

    // ── Provisioning ──────────────────────────────────────────────────────────

    pub async fn get_database(&self, database: &str) -> Result<Value> {
        self.get(&format!("/databases/{database}"), &[]).await
    }

    pub async fn create_database(&self, database: &str, name: &str) -> Result<Value> {
        self.post("/databases", &json!({ "databaseId": database, "name": name }))
            .await
    }

    pub async fn create_collection(
        &self,
        database: &str,
        collection: &str,
        name: &str,
        permissions: &[String],
    ) -> Result<Value> {
        self.post(
            &format!("/databases/{database}/collections"),
            &json!({
                "collectionId": collection,
                "name": name,
                "permissions": permissions,
                "documentSecurity": false,
            }),
        )
        .await
    }

    pub async fn create_attribute(
        &self,
        database: &str,
        collection: &str,
        spec: &AttributeSpec,
    ) -> Result<Value> {
        self.request(
            Method::POST,
            &format!(
                "/databases/{database}/collections/{collection}/attributes/{}",
                spec.kind.path()
            ),
            Some(&spec.body()),
        )
        .await
    }
}
