//! Storage API: file upload (chunked above 5 MiB), deletion, view URLs, and
//! bucket provisioning.

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;

use crate::error::{AppwriteError, Result};
use crate::rest::RestClient;
use crate::types::{BucketSpec, StoredFile};

/// Largest body the backend accepts in one upload request.
pub const CHUNK_SIZE: usize = 5 * 1024 * 1024;

impl RestClient {
    /// Upload a file into `bucket` under `file_id`.
    ///
    /// Files larger than [`CHUNK_SIZE`] are sent in sequential chunks with a
    /// `Content-Range` header; every chunk after the first names the file
    /// through `x-appwrite-id`.
    pub async fn create_file(
        &self,
        bucket: &str,
        file_id: &str,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredFile> {
        let path = format!("/storage/buckets/{bucket}/files");
        let total = bytes.len();

        if total <= CHUNK_SIZE {
            let req = self
                .builder(Method::POST, &path)
                .multipart(upload_form(file_id, file_name, content_type, bytes.to_vec())?);
            return self.send(req).await;
        }

        let mut stored = None;
        for (index, chunk) in bytes.chunks(CHUNK_SIZE).enumerate() {
            let start = index * CHUNK_SIZE;
            let end = start + chunk.len() - 1;
            tracing::debug!(bucket, file_id, start, end, total, "uploading chunk");

            let mut req = self
                .builder(Method::POST, &path)
                .header("content-range", format!("bytes {start}-{end}/{total}"))
                .multipart(upload_form(file_id, file_name, content_type, chunk.to_vec())?);
            if index > 0 {
                req = req.header("x-appwrite-id", file_id);
            }
            stored = Some(self.send::<StoredFile>(req).await?);
        }

        stored.ok_or_else(|| AppwriteError::Other("empty upload".into()))
    }

    pub async fn get_file(&self, bucket: &str, file_id: &str) -> Result<StoredFile> {
        self.get(&format!("/storage/buckets/{bucket}/files/{file_id}"), &[])
            .await
    }

    pub async fn delete_file(&self, bucket: &str, file_id: &str) -> Result<()> {
        self.delete(&format!("/storage/buckets/{bucket}/files/{file_id}"))
            .await
    }

    /// Public URL that renders the file in a browser.
    pub fn file_view_url(&self, bucket: &str, file_id: &str) -> String {
        format!(
            "{}/storage/buckets/{bucket}/files/{file_id}/view?project={}",
            self.endpoint(),
            self.project()
        )
    }

    /// URL that serves the file as an attachment.
    pub fn file_download_url(&self, bucket: &str, file_id: &str) -> String {
        format!(
            "{}/storage/buckets/{bucket}/files/{file_id}/download?project={}",
            self.endpoint(),
            self.project()
        )
    }

    pub async fn create_bucket(&self, spec: &BucketSpec) -> Result<Value> {
        self.post("/storage/buckets", &spec.body()).await
    }
}

fn upload_form(file_id: &str, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<Form> {
    let part = Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(content_type)?;
    Ok(Form::new().text("fileId", file_id.to_string()).part("file", part))
}

#[cfg(test)]
mod tests {
    use super::CHUNK_SIZE;
    use crate::{ClientOptions, RestClient};
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn stored(id: &str) -> serde_json::Value {
        json!({ "$id": id, "bucketId": "images", "name": "shot.png", "mimeType": "image/png" })
    }

    #[tokio::test]
    async fn small_file_is_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/storage/buckets/images/files"))
            .respond_with(ResponseTemplate::new(201).set_body_json(stored("f1")))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            RestClient::new(ClientOptions::new(format!("{}/v1", server.uri()), "folio")).unwrap();
        let file = client
            .create_file("images", "f1", "shot.png", "image/png", &[1, 2, 3])
            .await
            .unwrap();
        assert_eq!(file.id, "f1");
    }

    #[tokio::test]
    async fn large_file_is_chunked() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/storage/buckets/images/files"))
            .and(header("content-range", format!("bytes 0-{}/{}", CHUNK_SIZE - 1, CHUNK_SIZE + 10).as_str()))
            .respond_with(ResponseTemplate::new(201).set_body_json(stored("big")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/storage/buckets/images/files"))
            .and(header_exists("x-appwrite-id"))
            .respond_with(ResponseTemplate::new(201).set_body_json(stored("big")))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            RestClient::new(ClientOptions::new(format!("{}/v1", server.uri()), "folio")).unwrap();
        let bytes = vec![7u8; CHUNK_SIZE + 10];
        let file = client
            .create_file("images", "big", "shot.png", "image/png", &bytes)
            .await
            .unwrap();
        assert_eq!(file.id, "big");
    }

    #[test]
    fn view_url_names_project() {
        let client = RestClient::new(ClientOptions::new("https://cloud.example/v1", "folio")).unwrap();
        assert_eq!(
            client.file_view_url("images", "f1"),
            "https://cloud.example/v1/storage/buckets/images/files/f1/view?project=folio"
        );
    }
}
