//! Async HTTP core shared by the databases, storage, and account APIs.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppwriteError, Result};
use crate::query::Query;

const PROJECT_HEADER: &str = "x-appwrite-project";
const KEY_HEADER: &str = "x-appwrite-key";
const SESSION_HEADER: &str = "x-appwrite-session";

/// Connection settings for [`RestClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    endpoint: String,
    project: String,
    api_key: Option<String>,
    session: Option<String>,
}

impl ClientOptions {
    /// `endpoint` includes the `/v1` suffix, e.g. `https://cloud.appwrite.io/v1`.
    pub fn new(endpoint: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            project: project.into(),
            api_key: None,
            session: None,
        }
    }

    /// Authenticate as the server (full access, bypasses permissions).
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Authenticate as a user through an existing session secret.
    pub fn session(mut self, secret: impl Into<String>) -> Self {
        self.session = Some(secret.into());
        self
    }
}

/// Async Appwrite REST client.
///
/// Cheap to clone; clones share one connection pool and cookie jar, so a
/// session created through [`RestClient::create_email_session`] authenticates
/// every later call.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    project: String,
}

impl RestClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        // Fail early on garbage endpoints instead of on the first request
        let parsed = url::Url::parse(&options.endpoint)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppwriteError::Other(format!(
                "Endpoint must be http(s): {}",
                options.endpoint
            )));
        }

        let mut headers = HeaderMap::new();
        insert_header(&mut headers, PROJECT_HEADER, &options.project)?;
        if let Some(key) = &options.api_key {
            insert_header(&mut headers, KEY_HEADER, key)?;
        }
        if let Some(session) = &options.session {
            insert_header(&mut headers, SESSION_HEADER, session)?;
        }

        let client = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(AppwriteError::Http)?;

        Ok(Self {
            client,
            base_url: options.endpoint.trim_end_matches('/').to_owned(),
            project: options.project,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    // ── Internal ──────────────────────────────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Send a prepared request and decode the JSON body.
    pub(crate) async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(api_error(status, resp).await);
        }
        if status == StatusCode::NO_CONTENT {
            return serde_json::from_value(Value::Null).map_err(AppwriteError::Json);
        }
        // Some endpoints answer 200 with an empty body
        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return serde_json::from_value(Value::Null).map_err(AppwriteError::Json);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        tracing::trace!(%method, path, "appwrite request");
        let mut req = self.builder(method, path);
        if let Some(b) = body {
            req = req.json(b);
        }
        self.send(req).await
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, queries: &[Query]) -> Result<T> {
        let req = self
            .builder(Method::GET, path)
            .query(&Query::encode_all(queries));
        self.send(req).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub(crate) async fn patch<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let resp = self.builder(Method::DELETE, path).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(api_error(status, resp).await);
        }
        Ok(())
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value).map_err(|e| AppwriteError::Other(e.to_string()))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

/// Turn an error response into [`AppwriteError::Api`], keeping the backend's
/// `message` and `type` when the body is JSON.
async fn api_error(status: StatusCode, resp: reqwest::Response) -> AppwriteError {
    let body = resp.json::<Value>().await.ok();
    let field = |name: &str| {
        body.as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(str::to_owned)
    };
    AppwriteError::Api {
        status: status.as_u16(),
        message: field("message").unwrap_or_else(|| status.to_string()),
        kind: field("type").unwrap_or_else(|| "unknown".to_string()),
    }
}
