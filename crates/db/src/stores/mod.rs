use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use newsdesk_core::domain::{Author, DateWindow, EditorialEvent, NoteId, SessionRecord, TrafficRecord};

pub mod authors;
pub mod events;
pub mod memory;
pub mod traffic;

pub use authors::SqlAuthorDirectory;
pub use events::SqlEventStore;
pub use memory::{InMemoryAuthorDirectory, InMemoryEventStore, InMemoryTrafficStore};
pub use traffic::SqlTrafficStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read access to the editorial event log.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events whose timestamp falls inside the window, ordered by timestamp.
    async fn events_in_window(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<EditorialEvent>, StoreError>;

    /// Note ids with at least one CREATE event anywhere in the log. The
    /// fallback-creator rule needs the full-log view, not the window's.
    async fn note_ids_with_create(&self) -> Result<HashSet<NoteId>, StoreError>;
}

/// Read access to the two traffic grains.
#[async_trait]
pub trait TrafficStore: Send + Sync {
    async fn daily_in_window(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<TrafficRecord>, StoreError>;

    async fn sessions_in_window(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<SessionRecord>, StoreError>;

    /// Max day present on the daily grain; callers default windows from it.
    async fn latest_date(&self) -> Result<Option<NaiveDate>, StoreError>;
}

#[async_trait]
pub trait AuthorDirectory: Send + Sync {
    async fn all_authors(&self) -> Result<Vec<Author>, StoreError>;
}
