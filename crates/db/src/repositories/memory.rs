use std::collections::HashMap;

use tokio::sync::RwLock;

use goodhuman_core::domain::comment::CommentId;
use goodhuman_core::domain::dedup::{DedupKind, DedupRecord};

use super::{DedupRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryDedupRepository {
    records: RwLock<HashMap<(DedupKind, String), DedupRecord>>,
}

#[async_trait::async_trait]
impl DedupRepository for InMemoryDedupRepository {
    async fn find(
        &self,
        kind: DedupKind,
        comment_id: &CommentId,
    ) -> Result<Option<DedupRecord>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.get(&(kind, comment_id.0.clone())).cloned())
    }

    async fn exists(
        &self,
        kind: DedupKind,
        comment_id: &CommentId,
    ) -> Result<bool, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.contains_key(&(kind, comment_id.0.clone())))
    }

    async fn insert(&self, record: &DedupRecord) -> Result<bool, RepositoryError> {
        let mut records = self.records.write().await;
        let key = (record.kind, record.comment_id.0.clone());
        if records.contains_key(&key) {
            return Ok(false);
        }
        records.insert(key, record.clone());
        Ok(true)
    }

    async fn count(&self, kind: DedupKind) -> Result<u64, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.keys().filter(|(record_kind, _)| *record_kind == kind).count() as u64)
    }
}
