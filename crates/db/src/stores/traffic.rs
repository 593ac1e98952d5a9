use chrono::NaiveDate;
use sqlx::Row;

use newsdesk_core::domain::{DateWindow, SessionRecord, TrafficRecord};

use super::{StoreError, TrafficStore};
use crate::DbPool;

pub struct SqlTrafficStore {
    pool: DbPool,
}

impl SqlTrafficStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| StoreError::Decode(format!("bad date `{value}`: {e}")))
}

fn row_to_daily(row: &sqlx::sqlite::SqliteRow) -> Result<TrafficRecord, StoreError> {
    let article_url: String =
        row.try_get("article_url").map_err(|e| StoreError::Decode(e.to_string()))?;
    let event_date: String =
        row.try_get("event_date").map_err(|e| StoreError::Decode(e.to_string()))?;
    let visits: i64 = row.try_get("visits").map_err(|e| StoreError::Decode(e.to_string()))?;
    let pageviews: i64 =
        row.try_get("pageviews").map_err(|e| StoreError::Decode(e.to_string()))?;
    let total_time_seconds: i64 =
        row.try_get("total_time_seconds").map_err(|e| StoreError::Decode(e.to_string()))?;
    let scrolls: i64 = row.try_get("scrolls").map_err(|e| StoreError::Decode(e.to_string()))?;
    let section: Option<String> =
        row.try_get("section").map_err(|e| StoreError::Decode(e.to_string()))?;
    let creator_email: Option<String> =
        row.try_get("creator_email").map_err(|e| StoreError::Decode(e.to_string()))?;
    let publish_date: Option<String> =
        row.try_get("publish_date").map_err(|e| StoreError::Decode(e.to_string()))?;
    let title: Option<String> =
        row.try_get("title").map_err(|e| StoreError::Decode(e.to_string()))?;

    Ok(TrafficRecord {
        article_url,
        day: parse_date(&event_date)?,
        visits,
        pageviews,
        total_time_seconds,
        scrolls,
        section,
        creator_email,
        publish_date: publish_date.as_deref().map(parse_date).transpose()?,
        title,
    })
}

fn row_to_sessions(row: &sqlx::sqlite::SqliteRow) -> Result<SessionRecord, StoreError> {
    let article_url: String =
        row.try_get("article_url").map_err(|e| StoreError::Decode(e.to_string()))?;
    let event_date: String =
        row.try_get("event_date").map_err(|e| StoreError::Decode(e.to_string()))?;
    let daily_users: i64 =
        row.try_get("daily_users").map_err(|e| StoreError::Decode(e.to_string()))?;
    let daily_sessions: i64 =
        row.try_get("daily_sessions").map_err(|e| StoreError::Decode(e.to_string()))?;
    let daily_pageviews: i64 =
        row.try_get("daily_pageviews").map_err(|e| StoreError::Decode(e.to_string()))?;
    let sessions_with_scroll: i64 =
        row.try_get("sessions_with_scroll").map_err(|e| StoreError::Decode(e.to_string()))?;
    let total_engagement_seconds: i64 =
        row.try_get("total_engagement_seconds").map_err(|e| StoreError::Decode(e.to_string()))?;

    Ok(SessionRecord {
        article_url,
        day: parse_date(&event_date)?,
        daily_users,
        daily_sessions,
        daily_pageviews,
        sessions_with_scroll,
        total_engagement_seconds,
    })
}

#[async_trait::async_trait]
impl TrafficStore for SqlTrafficStore {
    async fn daily_in_window(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<TrafficRecord>, StoreError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT article_url, event_date, visits, pageviews, total_time_seconds, scrolls,
                    section, creator_email, publish_date, title
             FROM traffic_daily
             WHERE event_date BETWEEN ? AND ?
             ORDER BY event_date ASC, article_url ASC",
        )
        .bind(window.start().to_string())
        .bind(window.end().to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_daily).collect::<Result<Vec<_>, _>>()
    }

    async fn sessions_in_window(
        &self,
        window: &DateWindow,
    ) -> Result<Vec<SessionRecord>, StoreError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT article_url, event_date, daily_users, daily_sessions, daily_pageviews,
                    sessions_with_scroll, total_engagement_seconds
             FROM traffic_sessions
             WHERE event_date BETWEEN ? AND ?
             ORDER BY event_date ASC, article_url ASC",
        )
        .bind(window.start().to_string())
        .bind(window.end().to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_sessions).collect::<Result<Vec<_>, _>>()
    }

    async fn latest_date(&self) -> Result<Option<NaiveDate>, StoreError> {
        let row = sqlx::query("SELECT MAX(event_date) AS latest FROM traffic_daily")
            .fetch_one(&self.pool)
            .await?;

        let latest: Option<String> =
            row.try_get("latest").map_err(|e| StoreError::Decode(e.to_string()))?;
        latest.as_deref().map(parse_date).transpose()
    }
}

/// Insert helpers used by fixtures and tests.
pub async fn insert_daily(pool: &DbPool, record: &TrafficRecord) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO traffic_daily (article_url, event_date, visits, pageviews,
                                    total_time_seconds, scrolls, section, creator_email,
                                    publish_date, title)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(article_url, event_date) DO UPDATE SET
             visits = excluded.visits,
             pageviews = excluded.pageviews,
             total_time_seconds = excluded.total_time_seconds,
             scrolls = excluded.scrolls,
             section = excluded.section,
             creator_email = excluded.creator_email,
             publish_date = excluded.publish_date,
             title = excluded.title",
    )
    .bind(&record.article_url)
    .bind(record.day.to_string())
    .bind(record.visits)
    .bind(record.pageviews)
    .bind(record.total_time_seconds)
    .bind(record.scrolls)
    .bind(&record.section)
    .bind(&record.creator_email)
    .bind(record.publish_date.map(|d| d.to_string()))
    .bind(&record.title)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn insert_sessions(pool: &DbPool, record: &SessionRecord) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO traffic_sessions (article_url, event_date, daily_users, daily_sessions,
                                       daily_pageviews, sessions_with_scroll,
                                       total_engagement_seconds)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(article_url, event_date) DO UPDATE SET
             daily_users = excluded.daily_users,
             daily_sessions = excluded.daily_sessions,
             daily_pageviews = excluded.daily_pageviews,
             sessions_with_scroll = excluded.sessions_with_scroll,
             total_engagement_seconds = excluded.total_engagement_seconds",
    )
    .bind(&record.article_url)
    .bind(record.day.to_string())
    .bind(record.daily_users)
    .bind(record.daily_sessions)
    .bind(record.daily_pageviews)
    .bind(record.sessions_with_scroll)
    .bind(record.total_engagement_seconds)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use newsdesk_core::domain::{DateWindow, SessionRecord, TrafficRecord};

    use super::{insert_daily, insert_sessions, SqlTrafficStore};
    use crate::stores::TrafficStore;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).expect("date")
    }

    fn daily(url: &str, d: u32, visits: i64) -> TrafficRecord {
        TrafficRecord {
            article_url: url.to_string(),
            day: day(d),
            visits,
            pageviews: visits * 2,
            total_time_seconds: visits * 30,
            scrolls: visits / 2,
            section: Some("politics".to_string()),
            creator_email: Some("alice@x".to_string()),
            publish_date: Some(day(d)),
            title: Some("A headline".to_string()),
        }
    }

    fn sessions(url: &str, d: u32, users: i64) -> SessionRecord {
        SessionRecord {
            article_url: url.to_string(),
            day: day(d),
            daily_users: users,
            daily_sessions: users + 2,
            daily_pageviews: users * 2,
            sessions_with_scroll: users / 2,
            total_engagement_seconds: users * 45,
        }
    }

    #[tokio::test]
    async fn daily_round_trips_through_both_date_columns() {
        let pool = setup().await;
        insert_daily(&pool, &daily("https://news.example/a", 2, 100)).await.expect("insert");
        insert_daily(&pool, &daily("https://news.example/b", 9, 50)).await.expect("insert");

        let store = SqlTrafficStore::new(pool);
        let window = DateWindow::new(day(1), day(5)).expect("window");
        let records = store.daily_in_window(&window).await.expect("load");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].article_url, "https://news.example/a");
        assert_eq!(records[0].visits, 100);
        assert_eq!(records[0].publish_date, Some(day(2)));
    }

    #[tokio::test]
    async fn sessions_grain_filters_by_window() {
        let pool = setup().await;
        insert_sessions(&pool, &sessions("https://news.example/a", 2, 40)).await.expect("insert");
        insert_sessions(&pool, &sessions("https://news.example/a", 9, 99)).await.expect("insert");

        let store = SqlTrafficStore::new(pool);
        let window = DateWindow::new(day(1), day(5)).expect("window");
        let records = store.sessions_in_window(&window).await.expect("load");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].daily_users, 40);
        assert_eq!(records[0].total_engagement_seconds, 1800);
    }

    #[tokio::test]
    async fn latest_date_is_none_on_empty_store_and_max_otherwise() {
        let pool = setup().await;
        let store = SqlTrafficStore::new(pool.clone());

        assert_eq!(store.latest_date().await.expect("empty"), None);

        insert_daily(&pool, &daily("https://news.example/a", 2, 10)).await.expect("insert");
        insert_daily(&pool, &daily("https://news.example/a", 7, 10)).await.expect("insert");
        assert_eq!(store.latest_date().await.expect("load"), Some(day(7)));
    }
}
