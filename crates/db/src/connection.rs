use std::time::Duration;

use newsdesk_core::config::DatabaseConfig;
use sqlx::sqlite::SqlitePoolOptions;

pub type DbPool = sqlx::SqlitePool;

/// Open a pool sized and timed out from the loaded configuration.
pub async fn connect(database: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&database.url, database.max_connections, database.timeout_secs).await
}

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                // Read-mostly aggregation workload with occasional
                // migrate/seed writes: WAL with NORMAL sync, and the
                // scratch space for large GROUP BY sorts stays in memory.
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA synchronous = NORMAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA temp_store = MEMORY").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

#[cfg(test)]
mod tests {
    use newsdesk_core::config::DatabaseConfig;

    use super::connect;

    #[tokio::test]
    async fn connect_applies_config_and_session_pragmas() {
        let database = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            timeout_secs: 5,
        };
        let pool = connect(&database).await.expect("connect");

        let foreign_keys: i64 =
            sqlx::query_scalar("PRAGMA foreign_keys").fetch_one(&pool).await.expect("pragma");
        assert_eq!(foreign_keys, 1);

        // 2 is SQLite's code for MEMORY.
        let temp_store: i64 =
            sqlx::query_scalar("PRAGMA temp_store").fetch_one(&pool).await.expect("pragma");
        assert_eq!(temp_store, 2);
    }
}
