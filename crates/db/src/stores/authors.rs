use sqlx::Row;

use newsdesk_core::domain::Author;

use super::{AuthorDirectory, StoreError};
use crate::DbPool;

pub struct SqlAuthorDirectory {
    pool: DbPool,
}

impl SqlAuthorDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AuthorDirectory for SqlAuthorDirectory {
    async fn all_authors(&self) -> Result<Vec<Author>, StoreError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> =
            sqlx::query("SELECT email, display_name, country FROM authors ORDER BY email ASC")
                .fetch_all(&self.pool)
                .await?;

        rows.iter()
            .map(|row| {
                Ok(Author {
                    email: row
                        .try_get("email")
                        .map_err(|e| StoreError::Decode(e.to_string()))?,
                    display_name: row
                        .try_get("display_name")
                        .map_err(|e| StoreError::Decode(e.to_string()))?,
                    country: row
                        .try_get("country")
                        .map_err(|e| StoreError::Decode(e.to_string()))?,
                })
            })
            .collect()
    }
}

pub async fn insert_author(pool: &DbPool, author: &Author) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO authors (email, display_name, country)
         VALUES (?, ?, ?)
         ON CONFLICT(email) DO UPDATE SET
             display_name = excluded.display_name,
             country = excluded.country",
    )
    .bind(&author.email)
    .bind(&author.display_name)
    .bind(&author.country)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use newsdesk_core::domain::Author;

    use super::{insert_author, SqlAuthorDirectory};
    use crate::stores::AuthorDirectory;
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn upsert_and_list_authors() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let alice = Author {
            email: "alice@x".to_string(),
            display_name: Some("Alice Anders".to_string()),
            country: Some("Argentina".to_string()),
        };
        insert_author(&pool, &alice).await.expect("insert");
        insert_author(
            &pool,
            &Author { country: Some("Chile".to_string()), ..alice.clone() },
        )
        .await
        .expect("upsert");

        let directory = SqlAuthorDirectory::new(pool);
        let authors = directory.all_authors().await.expect("load");

        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].country.as_deref(), Some("Chile"));
    }
}
