use std::collections::HashSet;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use newsdesk_core::domain::{
    ActionType, Author, DateWindow, EditorialEvent, NoteId, SessionRecord, TrafficRecord,
};

use super::{AuthorDirectory, EventStore, StoreError, TrafficStore};

/// In-memory event log for tests; holds the full log so the CREATE-existence
/// scan behaves like the SQL store's.
#[derive(Default)]
pub struct InMemoryEventStore {
    events: RwLock<Vec<EditorialEvent>>,
}

impl InMemoryEventStore {
    pub fn with_events(events: Vec<EditorialEvent>) -> Self {
        Self { events: RwLock::new(events) }
    }

    pub async fn push(&self, event: EditorialEvent) {
        self.events.write().await.push(event);
    }
}

#[async_trait::async_trait]
impl EventStore for InMemoryEventStore {
    async fn events_in_window(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<EditorialEvent>, StoreError> {
        let events = self.events.read().await;
        let mut in_window: Vec<EditorialEvent> =
            events.iter().filter(|event| window.contains(event.day())).cloned().collect();
        in_window.sort_by_key(|event| event.event_timestamp);
        Ok(in_window)
    }

    async fn note_ids_with_create(&self) -> Result<HashSet<NoteId>, StoreError> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|event| event.action_type == ActionType::Create)
            .map(|event| event.note_id.clone())
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryTrafficStore {
    daily: RwLock<Vec<TrafficRecord>>,
    sessions: RwLock<Vec<SessionRecord>>,
}

impl InMemoryTrafficStore {
    pub fn with_records(daily: Vec<TrafficRecord>, sessions: Vec<SessionRecord>) -> Self {
        Self { daily: RwLock::new(daily), sessions: RwLock::new(sessions) }
    }
}

#[async_trait::async_trait]
impl TrafficStore for InMemoryTrafficStore {
    async fn daily_in_window(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<TrafficRecord>, StoreError> {
        let daily = self.daily.read().await;
        Ok(daily.iter().filter(|record| window.contains(record.day)).cloned().collect())
    }

    async fn sessions_in_window(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<SessionRecord>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.iter().filter(|record| window.contains(record.day)).cloned().collect())
    }

    async fn latest_date(&self) -> Result<Option<NaiveDate>, StoreError> {
        let daily = self.daily.read().await;
        Ok(daily.iter().map(|record| record.day).max())
    }
}

#[derive(Default)]
pub struct InMemoryAuthorDirectory {
    authors: RwLock<Vec<Author>>,
}

impl InMemoryAuthorDirectory {
    pub fn with_authors(authors: Vec<Author>) -> Self {
        Self { authors: RwLock::new(authors) }
    }
}

#[async_trait::async_trait]
impl AuthorDirectory for InMemoryAuthorDirectory {
    async fn all_authors(&self) -> Result<Vec<Author>, StoreError> {
        let authors = self.authors.read().await;
        Ok(authors.clone())
    }
}
