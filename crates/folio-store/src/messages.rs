//! Contact messages: the public submit path plus the admin inbox.

use folio_common::error::FolioResult;
use folio_common::models::{Document, Message, MessageFilter, NewMessage};
use folio_common::validation::validate_request;
use serde_json::json;

use crate::context::{CollectionContext, ContextState};

pub struct MessagesContext {
    docs: CollectionContext<Message>,
}

impl MessagesContext {
    pub fn new(docs: CollectionContext<Message>) -> Self {
        Self { docs }
    }

    pub async fn snapshot(&self) -> ContextState<Message> {
        self.docs.snapshot().await
    }

    pub async fn items(&self) -> Vec<Document<Message>> {
        self.docs.items().await
    }

    pub async fn is_loading(&self) -> bool {
        self.docs.is_loading().await
    }

    pub async fn error(&self) -> Option<String> {
        self.docs.error().await
    }

    pub async fn clear_error(&self) {
        self.docs.clear_error().await
    }

    pub async fn fetch_all(&self) -> FolioResult<Vec<Document<Message>>> {
        self.docs.fetch_all().await
    }

    /// Contact form submission. New messages start unread and unarchived.
    pub async fn submit(&self, form: NewMessage) -> FolioResult<Document<Message>> {
        self.docs
            .track("submit", async {
                validate_request(&form)?;
                let doc = self.docs.raw_create(&Message::from(form)).await?;
                tracing::info!(id = %doc.id, from = %doc.email, "message received");
                Ok(doc)
            })
            .await
    }

    pub async fn set_read(&self, id: &str, read: bool) -> FolioResult<Document<Message>> {
        self.docs.update(id, json!({ "read": read })).await
    }

    /// Flip the read flag of a message, reading it from the backend when it
    /// is not cached.
    pub async fn toggle_read(&self, id: &str) -> FolioResult<Document<Message>> {
        self.docs
            .track("toggle read", async {
                let current = self.docs.raw_current(id).await?;
                self.docs.raw_update(id, json!({ "read": !current.read })).await
            })
            .await
    }

    pub async fn set_archived(&self, id: &str, archived: bool) -> FolioResult<Document<Message>> {
        self.docs.update(id, json!({ "archived": archived })).await
    }

    /// Mark every cached unread message as read. Stops at the first failure;
    /// messages updated before it stay updated.
    pub async fn mark_all_read(&self) -> FolioResult<usize> {
        self.docs
            .track("mark all read", async {
                let unread: Vec<String> = self
                    .docs
                    .items()
                    .await
                    .into_iter()
                    .filter(|m| MessageFilter::Unread.matches(m))
                    .map(|m| m.id)
                    .collect();
                for id in &unread {
                    self.docs.raw_update(id, json!({ "read": true })).await?;
                }
                Ok(unread.len())
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> FolioResult<()> {
        self.docs.delete(id).await
    }

    /// Cached messages in one inbox view, newest first.
    pub async fn view(&self, filter: MessageFilter) -> Vec<Document<Message>> {
        let mut items = self.docs.items().await;
        items.retain(|m| filter.matches(m));
        items
    }

    pub async fn unread_count(&self) -> usize {
        self.view(MessageFilter::Unread).await.len()
    }

    /// Messages in `filter` whose sender, subject, or body contains `term`.
    pub async fn search(&self, filter: MessageFilter, term: &str) -> Vec<Document<Message>> {
        let mut items = self.view(filter).await;
        items.retain(|m| m.matches(term));
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{CallKind, MemoryBackend};
    use std::sync::Arc;

    fn context(backend: &MemoryBackend) -> MessagesContext {
        MessagesContext::new(CollectionContext::new("Message", "messages", Arc::new(backend.clone())))
    }

    fn form(name: &str, body: &str) -> NewMessage {
        NewMessage {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            subject: None,
            message: body.into(),
        }
    }

    #[tokio::test]
    async fn read_and_archive_move_between_views() {
        let backend = MemoryBackend::new();
        let inbox = context(&backend);
        let msg = inbox.submit(form("Ada", "Hello")).await.unwrap();
        assert_eq!(inbox.view(MessageFilter::Unread).await.len(), 1);

        inbox.set_read(&msg.id, true).await.unwrap();
        assert!(inbox.view(MessageFilter::Unread).await.is_empty());
        assert_eq!(inbox.view(MessageFilter::Read).await.len(), 1);

        inbox.set_archived(&msg.id, true).await.unwrap();
        assert!(inbox.view(MessageFilter::All).await.is_empty());
        assert_eq!(inbox.view(MessageFilter::Archived).await.len(), 1);
    }

    #[tokio::test]
    async fn invalid_submission_makes_no_call() {
        let backend = MemoryBackend::new();
        let inbox = context(&backend);
        let bad = NewMessage { email: "not-an-email".into(), ..form("Ada", "Hi") };

        assert!(inbox.submit(bad).await.is_err());
        assert_eq!(backend.count(CallKind::CreateDocument), 0);
    }

    #[tokio::test]
    async fn toggle_and_mark_all_read() {
        let backend = MemoryBackend::new();
        let inbox = context(&backend);
        let first = inbox.submit(form("Ada", "one")).await.unwrap();
        inbox.submit(form("Grace", "two")).await.unwrap();
        inbox.submit(form("Linus", "three")).await.unwrap();

        let toggled = inbox.toggle_read(&first.id).await.unwrap();
        assert!(toggled.read);
        assert_eq!(inbox.unread_count().await, 2);

        assert_eq!(inbox.mark_all_read().await.unwrap(), 2);
        assert_eq!(inbox.unread_count().await, 0);
    }

    #[tokio::test]
    async fn search_within_view() {
        let backend = MemoryBackend::new();
        let inbox = context(&backend);
        inbox.submit(form("Ada", "About the Rust role")).await.unwrap();
        inbox.submit(form("Grace", "Coffee?")).await.unwrap();

        assert_eq!(inbox.search(MessageFilter::All, "rust").await.len(), 1);
        assert_eq!(inbox.search(MessageFilter::All, "grace").await.len(), 1);
        assert!(inbox.search(MessageFilter::Read, "rust").await.is_empty());
    }
}
