//! Per-entity client caches.
//!
//! An [`EntityStore`] owns one collection fetched from the backend and
//! keeps it in step with its own mutations. Nothing is re-fetched after
//! add, update or remove; the server response is merged locally.

pub mod notify;

use crate::api::{self, ApiError, ApiRequest, MessageTable, Transport};
use crate::models::{Resource, Validate};
use notify::{Notice, Notifier};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("missing required fields: {}", .0.join(", "))]
    Validation(Vec<&'static str>),

    #[error("changes are disabled in demo mode")]
    DemoMode,
}

/// Everything a store or view needs to reach the backend and report back
#[derive(Clone)]
pub struct Session {
    pub transport: Arc<dyn Transport>,
    pub notifier: Arc<dyn Notifier>,
    pub messages: Arc<MessageTable>,
    pub demo_mode: bool,
}

impl Session {
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            notifier,
            messages: Arc::new(MessageTable::default()),
            demo_mode: false,
        }
    }

    pub fn with_demo_mode(mut self, demo_mode: bool) -> Self {
        self.demo_mode = demo_mode;
        self
    }

    pub fn with_messages(mut self, messages: MessageTable) -> Self {
        self.messages = Arc::new(messages);
        self
    }

    pub fn store<T: Resource + Validate>(&self) -> EntityStore<T> {
        EntityStore::new(self.clone())
    }

    /// Show the classified message for `error` and hand the error back
    pub(crate) fn report(&self, error: ApiError) -> ApiError {
        self.notifier
            .notify(Notice::error(self.messages.user_message(&error)));
        error
    }
}

/// Cached collection of one entity type plus its CRUD operations
pub struct EntityStore<T: Resource> {
    session: Session,
    items: Vec<T>,
    count: Option<u64>,
    loading: bool,
}

impl<T: Resource + Validate> EntityStore<T> {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            items: Vec::new(),
            count: None,
            loading: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Total reported by the backend on the last fetch, if any
    pub fn count(&self) -> Option<u64> {
        self.count
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == Some(id))
    }

    /// Replace the cached collection with the backend's
    pub async fn get_all(&mut self) -> Result<&[T], StoreError> {
        self.loading = true;
        let result =
            api::fetch::<Vec<T>>(self.session.transport.as_ref(), ApiRequest::get(T::PATH)).await;
        self.loading = false;

        let envelope = result.map_err(|e| self.session.report(e))?;
        self.items = envelope.data.unwrap_or_default();
        self.count = envelope.count;
        debug!("Loaded {} records from {}", self.items.len(), T::PATH);
        Ok(&self.items)
    }

    pub async fn add(&mut self, draft: T) -> Result<T, StoreError> {
        self.guard(&draft)?;

        let body = self.encode(&draft)?;
        let envelope = api::fetch::<T>(self.session.transport.as_ref(), ApiRequest::post(T::PATH, body))
            .await
            .map_err(|e| self.session.report(e))?;

        let record = envelope.data.unwrap_or(draft);
        self.items.push(record.clone());
        self.succeed(envelope.message, "added");
        Ok(record)
    }

    pub async fn update(&mut self, id: &str, draft: T) -> Result<T, StoreError> {
        self.guard(&draft)?;

        let body = self.encode(&draft)?;
        let request = ApiRequest::put(format!("{}/{}", T::PATH, id), body);
        let envelope = api::fetch::<T>(self.session.transport.as_ref(), request)
            .await
            .map_err(|e| self.session.report(e))?;

        let mut record = envelope.data.unwrap_or(draft);
        if record.id().is_none() {
            record.set_id(id.to_string());
        }
        match self.items.iter_mut().find(|item| item.id() == Some(id)) {
            Some(slot) => *slot = record.clone(),
            None => self.items.push(record.clone()),
        }
        self.succeed(envelope.message, "updated");
        Ok(record)
    }

    pub async fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        if self.session.demo_mode {
            return Err(self.refuse_in_demo());
        }

        let request = ApiRequest::delete(format!("{}/{}", T::PATH, id));
        let envelope = api::fetch::<serde_json::Value>(self.session.transport.as_ref(), request)
            .await
            .map_err(|e| self.session.report(e))?;

        self.items.retain(|item| item.id() != Some(id));
        self.succeed(envelope.message, "deleted");
        Ok(())
    }

    fn guard(&self, draft: &T) -> Result<(), StoreError> {
        if self.session.demo_mode {
            return Err(self.refuse_in_demo());
        }

        let missing = draft.missing_fields();
        if !missing.is_empty() {
            self.session.notifier.notify(Notice::error(format!(
                "Please fill in the required fields: {}",
                missing.join(", ")
            )));
            return Err(StoreError::Validation(missing));
        }
        Ok(())
    }

    fn encode(&self, draft: &T) -> Result<serde_json::Value, StoreError> {
        serde_json::to_value(draft)
            .map_err(|e| StoreError::Api(self.session.report(ApiError::Decode(e.to_string()))))
    }

    fn refuse_in_demo(&self) -> StoreError {
        self.session
            .notifier
            .notify(Notice::info("Demo mode is on. Changes are not saved."));
        StoreError::DemoMode
    }

    fn succeed(&self, message: Option<String>, verb: &str) {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("{} {} successfully", T::LABEL, verb));
        info!("{} {} on {}", T::LABEL, verb, T::PATH);
        self.session.notifier.notify(Notice::success(message));
    }
}

#[cfg(test)]
mod tests {
    use super::notify::{NoticeLevel, RecordingNotifier};
    use super::*;
    use crate::api::Method;
    use crate::models::entities::{Lead, ReferenceSource};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and remembers what was asked
    #[derive(Default)]
    struct FakeTransport {
        replies: Mutex<VecDeque<Result<Value, ApiError>>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl FakeTransport {
        fn replying(replies: Vec<Result<Value, ApiError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::default(),
            })
        }

        fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(Value::Null))
        }
    }

    fn session(transport: Arc<FakeTransport>) -> (Session, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        (Session::new(transport, notifier.clone()), notifier)
    }

    fn lead(id: &str, name: &str) -> Value {
        json!({"_id": id, "name": name, "phone": "555"})
    }

    fn draft(name: &str) -> Lead {
        Lead {
            name: name.to_string(),
            phone: "555".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn get_all_replaces_items_and_count() {
        let transport = FakeTransport::replying(vec![Ok(json!({
            "message": "ok",
            "data": [lead("l1", "Asha"), lead("l2", "Ravi")],
            "count": 2
        }))]);
        let (session, notifier) = session(transport.clone());
        let mut store = session.store::<Lead>();

        let items = store.get_all().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(store.count(), Some(2));
        assert!(!store.is_loading());
        assert!(notifier.notices().is_empty());

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].path, "/leads");
    }

    #[tokio::test]
    async fn get_all_without_data_yields_empty_collection() {
        let transport = FakeTransport::replying(vec![
            Ok(json!({"data": [lead("l1", "Asha")]})),
            Ok(json!({"message": "nothing here", "data": null})),
        ]);
        let (session, _) = session(transport);
        let mut store = session.store::<Lead>();

        store.get_all().await.unwrap();
        assert_eq!(store.items().len(), 1);
        store.get_all().await.unwrap();
        assert!(store.items().is_empty());
    }

    #[tokio::test]
    async fn get_all_failure_notifies_and_clears_loading() {
        let transport = FakeTransport::replying(vec![Err(ApiError::Http {
            status: 500,
            body: Some(json!({"error": "Database unavailable"})),
        })]);
        let (session, notifier) = session(transport);
        let mut store = session.store::<Lead>();

        let err = store.get_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Api(ApiError::Http { status: 500, .. })));
        assert!(!store.is_loading());
        assert_eq!(
            notifier.last(),
            Some(Notice::error("Database unavailable"))
        );
    }

    #[tokio::test]
    async fn add_merges_server_record_without_refetch() {
        let transport = FakeTransport::replying(vec![
            Ok(json!({"data": [lead("l1", "Asha")]})),
            Ok(json!({"message": "Lead created", "data": lead("l2", "Ravi")})),
        ]);
        let (session, notifier) = session(transport.clone());
        let mut store = session.store::<Lead>();
        store.get_all().await.unwrap();

        let created = store.add(draft("Ravi")).await.unwrap();
        assert_eq!(created.id(), Some("l2"));
        assert_eq!(store.items().len(), 2);
        assert_eq!(notifier.last(), Some(Notice::success("Lead created")));

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].method, Method::Post);
        assert_eq!(requests[1].body.as_ref().unwrap()["name"], "Ravi");
    }

    #[tokio::test]
    async fn update_replaces_matching_record() {
        let transport = FakeTransport::replying(vec![
            Ok(json!({"data": [lead("l1", "Asha"), lead("l2", "Ravi")]})),
            Ok(json!({"data": lead("l2", "Ravi Kumar")})),
        ]);
        let (session, notifier) = session(transport.clone());
        let mut store = session.store::<Lead>();
        store.get_all().await.unwrap();

        store.update("l2", draft("Ravi Kumar")).await.unwrap();
        assert_eq!(store.items().len(), 2);
        assert_eq!(store.find("l2").unwrap().name, "Ravi Kumar");
        assert_eq!(store.find("l1").unwrap().name, "Asha");
        assert_eq!(notifier.last(), Some(Notice::success("Lead updated successfully")));
        assert_eq!(transport.requests()[1].path, "/leads/l2");
    }

    #[tokio::test]
    async fn update_reply_without_data_keeps_the_id() {
        let transport = FakeTransport::replying(vec![
            Ok(json!({"data": [lead("l1", "Asha")]})),
            Ok(json!({"message": "Lead updated"})),
        ]);
        let (session, notifier) = session(transport);
        let mut store = session.store::<Lead>();
        store.get_all().await.unwrap();

        let record = store.update("l1", draft("Asha K")).await.unwrap();
        assert_eq!(record.id(), Some("l1"));
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.find("l1").unwrap().name, "Asha K");
        assert_eq!(notifier.last(), Some(Notice::success("Lead updated")));

        store.remove("l1").await.unwrap();
        assert!(store.items().is_empty());
    }

    #[tokio::test]
    async fn update_of_uncached_id_appends() {
        let transport = FakeTransport::replying(vec![
            Ok(json!({"data": [lead("l1", "Asha")]})),
            Ok(json!({"data": lead("l9", "Nikhil")})),
        ]);
        let (session, _) = session(transport);
        let mut store = session.store::<Lead>();
        store.get_all().await.unwrap();

        store.update("l9", draft("Nikhil")).await.unwrap();
        assert_eq!(store.items().len(), 2);
        assert_eq!(store.items()[1].id(), Some("l9"));
        assert_eq!(store.find("l1").unwrap().name, "Asha");
    }

    #[tokio::test]
    async fn add_reply_without_data_merges_the_draft() {
        let transport = FakeTransport::replying(vec![Ok(json!({"message": "Saved"}))]);
        let (session, notifier) = session(transport);
        let mut store = session.store::<Lead>();

        let record = store.add(draft("Ravi")).await.unwrap();
        assert_eq!(record, draft("Ravi"));
        assert_eq!(store.items(), &[draft("Ravi")]);
        assert_eq!(notifier.last(), Some(Notice::success("Saved")));
    }

    #[tokio::test]
    async fn remove_drops_record_locally() {
        let transport = FakeTransport::replying(vec![
            Ok(json!({"data": [lead("l1", "Asha"), lead("l2", "Ravi")]})),
            Ok(json!({"message": "Deleted"})),
        ]);
        let (session, notifier) = session(transport.clone());
        let mut store = session.store::<Lead>();
        store.get_all().await.unwrap();

        store.remove("l1").await.unwrap();
        assert!(store.find("l1").is_none());
        assert_eq!(store.items().len(), 1);
        assert_eq!(notifier.last(), Some(Notice::success("Deleted")));
        assert_eq!(transport.requests()[1].method, Method::Delete);
    }

    #[tokio::test]
    async fn failed_remove_keeps_record() {
        let transport = FakeTransport::replying(vec![
            Ok(json!({"data": [lead("l1", "Asha")]})),
            Err(ApiError::Http { status: 403, body: None }),
        ]);
        let (session, notifier) = session(transport);
        let mut store = session.store::<Lead>();
        store.get_all().await.unwrap();

        assert!(store.remove("l1").await.is_err());
        assert!(store.find("l1").is_some());
        assert_eq!(notifier.last().unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_backend() {
        let transport = FakeTransport::replying(vec![]);
        let (session, notifier) = session(transport.clone());
        let mut store = session.store::<ReferenceSource>();

        let err = store.add(ReferenceSource::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref fields) if fields == &vec!["name"]));
        assert!(transport.requests().is_empty());
        assert_eq!(notifier.last().unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn demo_mode_refuses_mutations() {
        let transport = FakeTransport::replying(vec![]);
        let (session, notifier) = session(transport.clone());
        let mut store = session.with_demo_mode(true).store::<Lead>();

        assert!(matches!(store.add(draft("Asha")).await, Err(StoreError::DemoMode)));
        assert!(matches!(store.remove("l1").await, Err(StoreError::DemoMode)));
        assert!(transport.requests().is_empty());
        assert_eq!(notifier.last().unwrap().level, NoticeLevel::Info);
    }
}
