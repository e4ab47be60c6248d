use sqlx::{sqlite::SqliteRow, Row};

use goodhuman_core::domain::comment::CommentId;
use goodhuman_core::domain::dedup::{DedupKind, DedupRecord};

use super::{DedupRepository, RepositoryError};
use crate::DbPool;

pub struct SqlDedupRepository {
    pool: DbPool,
}

impl SqlDedupRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &SqliteRow, kind: DedupKind) -> Result<DedupRecord, RepositoryError> {
    let comment_id: String =
        row.try_get("comment_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let author: String =
        row.try_get("author").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let subreddit: String =
        row.try_get("subreddit").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(DedupRecord { comment_id: CommentId(comment_id), author, subreddit, kind })
}

#[async_trait::async_trait]
impl DedupRepository for SqlDedupRepository {
    async fn find(
        &self,
        kind: DedupKind,
        comment_id: &CommentId,
    ) -> Result<Option<DedupRecord>, RepositoryError> {
        let sql = format!(
            "SELECT comment_id, author, subreddit FROM {} WHERE comment_id = ? ORDER BY id LIMIT 1",
            kind.table()
        );
        let row = sqlx::query(&sql).bind(comment_id.as_str()).fetch_optional(&self.pool).await?;

        row.map(|row| record_from_row(&row, kind)).transpose()
    }

    async fn exists(
        &self,
        kind: DedupKind,
        comment_id: &CommentId,
    ) -> Result<bool, RepositoryError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE comment_id = ?)", kind.table());
        let found: i64 =
            sqlx::query_scalar(&sql).bind(comment_id.as_str()).fetch_one(&self.pool).await?;
        Ok(found != 0)
    }

    async fn insert(&self, record: &DedupRecord) -> Result<bool, RepositoryError> {
        let table = record.kind.table();
        let sql = format!(
            "INSERT INTO {table} (comment_id, author, subreddit)
             SELECT ?, ?, ?
             WHERE NOT EXISTS (SELECT 1 FROM {table} WHERE comment_id = ?)"
        );
        let result = sqlx::query(&sql)
            .bind(record.comment_id.as_str())
            .bind(&record.author)
            .bind(&record.subreddit)
            .bind(record.comment_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn count(&self, kind: DedupKind) -> Result<u64, RepositoryError> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        u64::try_from(count).map_err(|e| RepositoryError::Decode(e.to_string()))
    }
}
