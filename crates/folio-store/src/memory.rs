//! In-process backend for tests and offline runs.
//!
//! Documents, files, and one account live in memory; every call is recorded
//! so tests can assert on exactly which backend operations a context issued.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use folio_appwrite::{DocumentList, Query, StoredFile};
use folio_common::error::{FolioError, FolioResult};
use folio_common::models::{Session, Upload, User};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::{AccountStore, DocumentStore, FileStore};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListDocuments { collection: String },
    GetDocument { collection: String, id: String },
    CreateDocument { collection: String, id: String, data: Value },
    UpdateDocument { collection: String, id: String, data: Value },
    DeleteDocument { collection: String, id: String },
    CreateFile { bucket: String, file_id: String, size: u64 },
    DeleteFile { bucket: String, file_id: String },
    GetAccount,
    CreateSession { email: String },
    DeleteSession,
    UpdateName { name: String },
    UpdatePassword,
}

impl Call {
    pub fn kind(&self) -> CallKind {
        match self {
            Self::ListDocuments { .. } => CallKind::ListDocuments,
            Self::GetDocument { .. } => CallKind::GetDocument,
            Self::CreateDocument { .. } => CallKind::CreateDocument,
            Self::UpdateDocument { .. } => CallKind::UpdateDocument,
            Self::DeleteDocument { .. } => CallKind::DeleteDocument,
            Self::CreateFile { .. } => CallKind::CreateFile,
            Self::DeleteFile { .. } => CallKind::DeleteFile,
            Self::GetAccount => CallKind::GetAccount,
            Self::CreateSession { .. } => CallKind::CreateSession,
            Self::DeleteSession => CallKind::DeleteSession,
            Self::UpdateName { .. } => CallKind::UpdateName,
            Self::UpdatePassword => CallKind::UpdatePassword,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    ListDocuments,
    GetDocument,
    CreateDocument,
    UpdateDocument,
    DeleteDocument,
    CreateFile,
    DeleteFile,
    GetAccount,
    CreateSession,
    DeleteSession,
    UpdateName,
    UpdatePassword,
}

#[derive(Debug)]
struct MemoryAccount {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// Documents per collection, in insertion order
    collections: HashMap<String, Vec<Map<String, Value>>>,
    files: HashMap<(String, String), StoredFile>,
    calls: Vec<Call>,
    /// Armed failures: the call of this kind that many calls from now fails
    failing: HashMap<CallKind, usize>,
    account: Option<MemoryAccount>,
    signed_in: bool,
    /// Ticks of the fake clock used for `$createdAt` / `$updatedAt`
    ticks: i64,
}

impl MemoryState {
    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();
        epoch + Duration::seconds(self.ticks)
    }

    /// Record a call; fail it if a failure was armed for its kind.
    fn record(&mut self, call: Call) -> FolioResult<()> {
        let kind = call.kind();
        self.calls.push(call);
        if let Some(remaining) = self.failing.get_mut(&kind) {
            *remaining -= 1;
            if *remaining == 0 {
                self.failing.remove(&kind);
                return Err(FolioError::Backend {
                    status: 500,
                    message: format!("injected {kind:?} failure"),
                });
            }
        }
        Ok(())
    }
}

/// In-memory implementation of every store trait.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the single account that can sign in.
    pub fn with_account(self, name: &str, email: &str, password: &str) -> Self {
        {
            let mut state = self.lock();
            let created_at = state.now();
            state.account = Some(MemoryAccount {
                user: User {
                    id: folio_appwrite::unique_id(),
                    name: name.to_string(),
                    email: email.to_string(),
                    email_verified: true,
                    created_at,
                },
                password: password.to_string(),
            });
        }
        self
    }

    /// Insert a document directly, bypassing the call log.
    pub fn seed(&self, collection: &str, id: &str, data: Value) {
        let mut state = self.lock();
        let doc = stamp(&mut state, id, data);
        state.collections.entry(collection.to_string()).or_default().push(doc);
    }

    /// Make the next call of `kind` fail with a 500.
    pub fn fail_next(&self, kind: CallKind) {
        self.fail_nth(kind, 1);
    }

    /// Make the `n`-th next call of `kind` fail with a 500 (`n` starts at 1).
    pub fn fail_nth(&self, kind: CallKind, n: usize) {
        self.lock().failing.insert(kind, n.max(1));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, kind: CallKind) -> usize {
        self.lock().calls.iter().filter(|c| c.kind() == kind).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn has_file(&self, bucket: &str, file_id: &str) -> bool {
        self.lock()
            .files
            .contains_key(&(bucket.to_string(), file_id.to_string()))
    }

    pub fn file_count(&self) -> usize {
        self.lock().files.len()
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.lock().collections.get(collection).map_or(0, Vec::len)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test must not poison every later assertion
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn stamp(state: &mut MemoryState, id: &str, data: Value) -> Map<String, Value> {
    let now = state.now().to_rfc3339();
    let mut doc = match data {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    doc.insert("$id".into(), Value::String(id.to_string()));
    doc.insert("$createdAt".into(), Value::String(now.clone()));
    doc.insert("$updatedAt".into(), Value::String(now));
    doc
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Null) | None, Some(Value::Null) | None) => Ordering::Equal,
        (Some(Value::Null) | None, _) => Ordering::Less,
        (_, Some(Value::Null) | None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Apply `equal`, ordering, `offset`, and `limit` queries the way the
/// service does. Unknown methods are ignored.
fn apply_queries(mut docs: Vec<Map<String, Value>>, queries: &[Query]) -> Vec<Map<String, Value>> {
    for q in queries.iter().filter(|q| q.method() == "equal") {
        let attr = q.attribute().unwrap_or_default();
        docs.retain(|d| d.get(attr).is_some_and(|v| q.values().contains(v)));
    }

    // Stable sorts applied last-to-first give first-query precedence
    for q in queries.iter().rev() {
        let attr = q.attribute().unwrap_or_default();
        match q.method() {
            "orderAsc" => docs.sort_by(|a, b| compare(a.get(attr), b.get(attr))),
            "orderDesc" => docs.sort_by(|a, b| compare(b.get(attr), a.get(attr))),
            _ => {}
        }
    }

    let number = |method: &str| {
        queries
            .iter()
            .find(|q| q.method() == method)
            .and_then(|q| q.values().first())
            .and_then(Value::as_u64)
            .map(|n| n as usize)
    };
    let offset = number("offset").unwrap_or(0);
    let limit = number("limit").unwrap_or(25);
    docs.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> FolioResult<DocumentList<Value>> {
        let mut state = self.lock();
        state.record(Call::ListDocuments { collection: collection.to_string() })?;
        let all = state.collections.get(collection).cloned().unwrap_or_default();
        let total = all.len() as u64;
        let documents = apply_queries(all, queries)
            .into_iter()
            .map(Value::Object)
            .collect();
        Ok(DocumentList { total, documents })
    }

    async fn get_document(&self, collection: &str, id: &str) -> FolioResult<Value> {
        let mut state = self.lock();
        state.record(Call::GetDocument { collection: collection.to_string(), id: id.to_string() })?;
        state
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.get("$id") == Some(&Value::from(id))))
            .cloned()
            .map(Value::Object)
            .ok_or_else(|| FolioError::not_found("Document"))
    }

    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> FolioResult<Value> {
        let mut state = self.lock();
        state.record(Call::CreateDocument {
            collection: collection.to_string(),
            id: id.to_string(),
            data: data.clone(),
        })?;
        let exists = state
            .collections
            .get(collection)
            .is_some_and(|docs| docs.iter().any(|d| d.get("$id") == Some(&Value::from(id))));
        if exists {
            return Err(FolioError::AlreadyExists { resource: "Document".into() });
        }
        let doc = stamp(&mut state, id, data);
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(Value::Object(doc))
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> FolioResult<Value> {
        let mut state = self.lock();
        state.record(Call::UpdateDocument {
            collection: collection.to_string(),
            id: id.to_string(),
            data: data.clone(),
        })?;
        let now = state.now().to_rfc3339();
        let doc = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.get("$id") == Some(&Value::from(id))))
            .ok_or_else(|| FolioError::not_found("Document"))?;
        if let Value::Object(patch) = data {
            doc.extend(patch);
        }
        doc.insert("$updatedAt".into(), Value::String(now));
        Ok(Value::Object(doc.clone()))
    }

    async fn delete_document(&self, collection: &str, id: &str) -> FolioResult<()> {
        let mut state = self.lock();
        state.record(Call::DeleteDocument {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;
        let docs = state.collections.entry(collection.to_string()).or_default();
        let before = docs.len();
        docs.retain(|d| d.get("$id") != Some(&Value::from(id)));
        if docs.len() == before {
            return Err(FolioError::not_found("Document"));
        }
        Ok(())
    }
}

#[async_trait]
impl FileStore for MemoryBackend {
    async fn create_file(
        &self,
        bucket: &str,
        file_id: &str,
        upload: &Upload,
    ) -> FolioResult<StoredFile> {
        let mut state = self.lock();
        state.record(Call::CreateFile {
            bucket: bucket.to_string(),
            file_id: file_id.to_string(),
            size: upload.size(),
        })?;
        let file = StoredFile {
            id: file_id.to_string(),
            bucket_id: bucket.to_string(),
            name: upload.file_name.clone(),
            mime_type: upload.content_type.clone(),
            size_original: upload.size(),
            chunks_total: 1,
            chunks_uploaded: 1,
        };
        state
            .files
            .insert((bucket.to_string(), file_id.to_string()), file.clone());
        Ok(file)
    }

    async fn delete_file(&self, bucket: &str, file_id: &str) -> FolioResult<()> {
        let mut state = self.lock();
        state.record(Call::DeleteFile { bucket: bucket.to_string(), file_id: file_id.to_string() })?;
        state
            .files
            .remove(&(bucket.to_string(), file_id.to_string()))
            .map(|_| ())
            .ok_or_else(|| FolioError::not_found("File"))
    }

    fn view_url(&self, bucket: &str, file_id: &str) -> String {
        format!("memory://{bucket}/{file_id}/view")
    }

    fn download_url(&self, bucket: &str, file_id: &str) -> String {
        format!("memory://{bucket}/{file_id}/download")
    }
}

#[async_trait]
impl AccountStore for MemoryBackend {
    async fn get_account(&self) -> FolioResult<User> {
        let mut state = self.lock();
        state.record(Call::GetAccount)?;
        match (&state.account, state.signed_in) {
            (Some(account), true) => Ok(account.user.clone()),
            _ => Err(FolioError::Unauthorized),
        }
    }

    async fn create_session(&self, email: &str, password: &str) -> FolioResult<Session> {
        let mut state = self.lock();
        state.record(Call::CreateSession { email: email.to_string() })?;
        let user_id = match &state.account {
            Some(a) if a.user.email == email && a.password == password => a.user.id.clone(),
            _ => return Err(FolioError::Unauthorized),
        };
        state.signed_in = true;
        let expire = state.now() + Duration::days(365);
        Ok(Session {
            id: folio_appwrite::unique_id(),
            user_id,
            expire,
            secret: String::new(),
            current: true,
        })
    }

    async fn delete_session(&self) -> FolioResult<()> {
        let mut state = self.lock();
        state.record(Call::DeleteSession)?;
        if !state.signed_in {
            return Err(FolioError::Unauthorized);
        }
        state.signed_in = false;
        Ok(())
    }

    async fn update_name(&self, name: &str) -> FolioResult<User> {
        let mut state = self.lock();
        state.record(Call::UpdateName { name: name.to_string() })?;
        let signed_in = state.signed_in;
        match state.account.as_mut() {
            Some(account) if signed_in => {
                account.user.name = name.to_string();
                Ok(account.user.clone())
            }
            _ => Err(FolioError::Unauthorized),
        }
    }

    async fn update_password(&self, password: &str, old_password: &str) -> FolioResult<User> {
        let mut state = self.lock();
        state.record(Call::UpdatePassword)?;
        let signed_in = state.signed_in;
        match state.account.as_mut() {
            Some(account) if signed_in && account.password == old_password => {
                account.password = password.to_string();
                Ok(account.user.clone())
            }
            _ => Err(FolioError::Unauthorized),
        }
    }
}
