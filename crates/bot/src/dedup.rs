use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use goodhuman_core::config::DatabaseConfig;
use goodhuman_core::domain::comment::{Comment, CommentId, InboxReply};
use goodhuman_core::domain::dedup::{DedupKind, DedupRecord};
use goodhuman_db::{
    connect_with_settings, migrations, DbPool, DedupRepository, RepositoryError,
    SqlDedupRepository,
};

#[derive(Debug, Error)]
pub enum StoreInitError {
    #[error("database connection failed: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

/// Remembers which comments the bot has already answered.
///
/// Every acted-on comment is written to the durable table and to a
/// process-local cache. `is_replied` consults both; `is_thanked` only the
/// cache, so a restarted bot forgets which inbox replies it thanked until the
/// inbox read flag catches them.
pub struct DedupStore {
    repository: Arc<dyn DedupRepository>,
    pool: Option<DbPool>,
    replied: HashSet<CommentId>,
    thanked: HashSet<CommentId>,
}

impl DedupStore {
    /// Opens the database, creating the file and tables when missing.
    pub async fn initialize(database: &DatabaseConfig) -> Result<Self, StoreInitError> {
        let pool = connect_with_settings(
            &database.url,
            database.max_connections,
            database.timeout_secs,
        )
        .await
        .map_err(StoreInitError::Connect)?;
        migrations::run_pending(&pool).await.map_err(StoreInitError::Migration)?;

        info!(
            event_name = "system.store.initialized",
            correlation_id = "bootstrap",
            database_url = %database.url,
            "dedup store ready"
        );
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: DbPool) -> Self {
        let repository = Arc::new(SqlDedupRepository::new(pool.clone()));
        Self { repository, pool: Some(pool), replied: HashSet::new(), thanked: HashSet::new() }
    }

    pub fn with_repository(repository: Arc<dyn DedupRepository>) -> Self {
        Self { repository, pool: None, replied: HashSet::new(), thanked: HashSet::new() }
    }

    pub fn pool(&self) -> Option<&DbPool> {
        self.pool.as_ref()
    }

    pub async fn is_replied(&self, id: &CommentId) -> Result<bool, RepositoryError> {
        if self.replied.contains(id) {
            return Ok(true);
        }
        self.repository.exists(DedupKind::Replied, id).await
    }

    pub fn is_thanked(&self, id: &CommentId) -> bool {
        self.thanked.contains(id)
    }

    pub async fn record_comment(
        &mut self,
        comment: &Comment,
        kind: DedupKind,
    ) -> Result<(), RepositoryError> {
        self.record(DedupRecord::for_comment(comment, kind)).await
    }

    pub async fn record_reply(
        &mut self,
        reply: &InboxReply,
        kind: DedupKind,
    ) -> Result<(), RepositoryError> {
        self.record(DedupRecord::for_reply(reply, kind)).await
    }

    /// Persists first; the cache is only updated once the row is durable.
    pub async fn record(&mut self, record: DedupRecord) -> Result<(), RepositoryError> {
        let inserted = self.repository.insert(&record).await?;
        if !inserted {
            debug!(
                event_name = "system.store.duplicate_record",
                comment_id = %record.comment_id,
                kind = record.kind.as_str(),
                "record already present"
            );
        }

        let cache = match record.kind {
            DedupKind::Replied => &mut self.replied,
            DedupKind::Thanked => &mut self.thanked,
        };
        cache.insert(record.comment_id);
        Ok(())
    }

    pub fn cached(&self, kind: DedupKind) -> usize {
        match kind {
            DedupKind::Replied => self.replied.len(),
            DedupKind::Thanked => self.thanked.len(),
        }
    }

    pub async fn teardown(self) {
        if let Some(pool) = self.pool {
            pool.close().await;
            info!(
                event_name = "system.store.closed",
                correlation_id = "shutdown",
                "dedup store closed"
            );
        }
    }
}
