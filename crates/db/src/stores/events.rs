use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::Row;

use newsdesk_core::domain::{ActionType, DateWindow, EditorialEvent, NoteId};

use super::{EventStore, StoreError};
use crate::DbPool;

pub struct SqlEventStore {
    pool: DbPool,
}

impl SqlEventStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<EditorialEvent, StoreError> {
    let note_id: String =
        row.try_get("note_id").map_err(|e| StoreError::Decode(e.to_string()))?;
    let editor_email: Option<String> =
        row.try_get("editor_email").map_err(|e| StoreError::Decode(e.to_string()))?;
    let action_type_str: String =
        row.try_get("action_type").map_err(|e| StoreError::Decode(e.to_string()))?;
    let event_timestamp_str: String =
        row.try_get("event_timestamp").map_err(|e| StoreError::Decode(e.to_string()))?;
    let story_url: Option<String> =
        row.try_get("story_url").map_err(|e| StoreError::Decode(e.to_string()))?;
    let segment: Option<String> =
        row.try_get("segment").map_err(|e| StoreError::Decode(e.to_string()))?;
    let source: Option<String> =
        row.try_get("source").map_err(|e| StoreError::Decode(e.to_string()))?;
    let title_word_count: Option<i64> =
        row.try_get("title_word_count").map_err(|e| StoreError::Decode(e.to_string()))?;
    let body_word_count: Option<i64> =
        row.try_get("body_word_count").map_err(|e| StoreError::Decode(e.to_string()))?;

    let action_type = ActionType::from_str(&action_type_str)
        .map_err(|_| StoreError::Decode(format!("unknown action type `{action_type_str}`")))?;
    let event_timestamp = DateTime::parse_from_rfc3339(&event_timestamp_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Decode(format!("bad event timestamp: {e}")))?;

    Ok(EditorialEvent {
        note_id: NoteId(note_id),
        editor_email,
        action_type,
        event_timestamp,
        story_url,
        segment,
        source,
        title_word_count,
        body_word_count,
    })
}

#[async_trait::async_trait]
impl EventStore for SqlEventStore {
    async fn events_in_window(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<EditorialEvent>, StoreError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT note_id, editor_email, action_type, event_timestamp, story_url,
                    segment, source, title_word_count, body_word_count
             FROM editorial_activity
             WHERE DATE(event_timestamp) BETWEEN ? AND ?
             ORDER BY event_timestamp ASC",
        )
        .bind(window.start().to_string())
        .bind(window.end().to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_event).collect::<Result<Vec<_>, _>>()
    }

    async fn note_ids_with_create(&self) -> Result<HashSet<NoteId>, StoreError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT DISTINCT note_id FROM editorial_activity WHERE action_type = 'CREATE'",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("note_id")
                    .map(NoteId)
                    .map_err(|e| StoreError::Decode(e.to_string()))
            })
            .collect()
    }
}

/// Insert one event row; used by fixtures and tests.
pub async fn insert_event(pool: &DbPool, event: &EditorialEvent) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO editorial_activity (note_id, editor_email, action_type, event_timestamp,
                                         story_url, segment, source, title_word_count,
                                         body_word_count)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&event.note_id.0)
    .bind(&event.editor_email)
    .bind(event.action_type.as_str())
    .bind(event.event_timestamp.to_rfc3339())
    .bind(&event.story_url)
    .bind(&event.segment)
    .bind(&event.source)
    .bind(event.title_word_count)
    .bind(event.body_word_count)
    .execute(pool)
    .await?;

    Ok(())
}
