use async_trait::async_trait;
use thiserror::Error;

use goodhuman_core::domain::comment::CommentId;
use goodhuman_core::domain::dedup::{DedupKind, DedupRecord};

pub mod dedup;
pub mod memory;

pub use dedup::SqlDedupRepository;
pub use memory::InMemoryDedupRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Append-only record of comments the bot has acted on, one namespace per kind.
#[async_trait]
pub trait DedupRepository: Send + Sync {
    /// A miss is `Ok(None)`, never an error.
    async fn find(
        &self,
        kind: DedupKind,
        comment_id: &CommentId,
    ) -> Result<Option<DedupRecord>, RepositoryError>;

    async fn exists(&self, kind: DedupKind, comment_id: &CommentId)
        -> Result<bool, RepositoryError>;

    /// Returns `false` when a record for `(comment_id, kind)` was already present.
    async fn insert(&self, record: &DedupRecord) -> Result<bool, RepositoryError>;

    async fn count(&self, kind: DedupKind) -> Result<u64, RepositoryError>;
}
