use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies pending schema changes. Tables that already exist are left alone.
pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::run_pending;
    use crate::{connect_with_settings, migrations::MIGRATOR};

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &[
        "repliedcomments",
        "thankedcomments",
        "idx_repliedcomments_comment_id",
        "idx_thankedcomments_comment_id",
    ];

    async fn table_count(pool: &sqlx::SqlitePool, name: &str) -> i64 {
        sqlx::query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("check table")
        .get::<i64, _>("count")
    }

    #[tokio::test]
    async fn migrations_create_both_dedup_tables() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        assert_eq!(table_count(&pool, "repliedcomments").await, 1);
        assert_eq!(table_count(&pool, "thankedcomments").await, 1);
    }

    #[tokio::test]
    async fn running_twice_is_not_an_error() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run");

        assert_eq!(table_count(&pool, "repliedcomments").await, 1);
    }

    #[tokio::test]
    async fn adopts_tables_created_by_an_earlier_deployment() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        sqlx::query(
            "CREATE TABLE repliedcomments (
                id INTEGER NOT NULL PRIMARY KEY,
                comment_id VARCHAR(255) NOT NULL,
                author VARCHAR(255) NOT NULL,
                subreddit VARCHAR(255) NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .expect("create legacy table");
        sqlx::query(
            "INSERT INTO repliedcomments (comment_id, author, subreddit)
             VALUES ('legacy1', 'human_bob', 'pics')",
        )
        .execute(&pool)
        .await
        .expect("insert legacy row");

        run_pending(&pool).await.expect("migrations should tolerate existing tables");

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM repliedcomments WHERE comment_id = 'legacy1'")
                .fetch_one(&pool)
                .await
                .expect("count legacy rows");
        assert_eq!(count, 1, "existing records must survive migration");
        assert_eq!(table_count(&pool, "thankedcomments").await, 1);
    }

    #[tokio::test]
    async fn migrations_up_down_up_preserves_schema_signature() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let initial_signature = managed_schema_signature(&pool).await;
        assert_eq!(
            initial_signature.len(),
            MANAGED_SCHEMA_OBJECTS.len(),
            "initial migration pass should create all managed schema objects",
        );

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");

        let after_down_signature = managed_schema_signature(&pool).await;
        assert!(
            after_down_signature.is_empty(),
            "managed schema objects should be removed after full undo",
        );

        run_pending(&pool).await.expect("re-run migrations");

        let after_second_up_signature = managed_schema_signature(&pool).await;
        assert_eq!(
            after_second_up_signature, initial_signature,
            "up/down/up should preserve migration-managed schema signature",
        );
    }

    async fn managed_schema_signature(pool: &sqlx::SqlitePool) -> Vec<(String, String, String)> {
        let mut signature: Vec<(String, String, String)> = sqlx::query(
            "SELECT type, name, IFNULL(sql, '') AS sql
             FROM sqlite_master
             WHERE type IN ('table', 'index')",
        )
        .fetch_all(pool)
        .await
        .expect("load schema objects")
        .into_iter()
        .filter_map(|row| {
            let name = row.get::<String, _>("name");
            if MANAGED_SCHEMA_OBJECTS.contains(&name.as_str()) {
                Some((row.get::<String, _>("type"), name, row.get::<String, _>("sql")))
            } else {
                None
            }
        })
        .collect();
        signature.sort();
        signature
    }
}
