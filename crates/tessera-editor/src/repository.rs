//! Block storage seam.
//!
//! The editor only ever talks to [`BlockRepository`]; hosts back it with
//! whatever they persist to. [`MemoryBlockRepository`] keeps insertion order,
//! which is the order blocks come back from [`BlockRepository::get_all`].

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use tessera_types::{BlockId, BlockRecord};
use tracing::trace;

use crate::error::RepositoryError;

#[async_trait]
pub trait BlockRepository: Send + Sync {
    /// Store a new record. Fails if the id is taken.
    async fn create(&self, record: BlockRecord) -> Result<(), RepositoryError>;

    /// Every record, in a stable order.
    async fn get_all(&self) -> Result<Vec<BlockRecord>, RepositoryError>;

    async fn get(&self, id: &BlockId) -> Result<Option<BlockRecord>, RepositoryError>;

    /// Replace an existing record. Fails if the id is unknown.
    async fn update(&self, record: BlockRecord) -> Result<(), RepositoryError>;

    /// Remove a record. Returns whether it existed.
    async fn delete(&self, id: &BlockId) -> Result<bool, RepositoryError>;

    async fn clear(&self) -> Result<(), RepositoryError>;
}

/// In-process repository for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryBlockRepository {
    blocks: RwLock<IndexMap<BlockId, BlockRecord>>,
}

impl MemoryBlockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with records, keeping the last of any duplicate ids.
    pub fn with_blocks(records: impl IntoIterator<Item = BlockRecord>) -> Self {
        let blocks = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            blocks: RwLock::new(blocks),
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

#[async_trait]
impl BlockRepository for MemoryBlockRepository {
    async fn create(&self, record: BlockRecord) -> Result<(), RepositoryError> {
        let mut blocks = self.blocks.write();
        if blocks.contains_key(&record.id) {
            return Err(RepositoryError::Duplicate(record.id));
        }
        trace!(id = %record.id, block_type = %record.block_type, "create");
        blocks.insert(record.id.clone(), record);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<BlockRecord>, RepositoryError> {
        Ok(self.blocks.read().values().cloned().collect())
    }

    async fn get(&self, id: &BlockId) -> Result<Option<BlockRecord>, RepositoryError> {
        Ok(self.blocks.read().get(id).cloned())
    }

    async fn update(&self, record: BlockRecord) -> Result<(), RepositoryError> {
        let mut blocks = self.blocks.write();
        match blocks.get_mut(&record.id) {
            Some(slot) => {
                trace!(id = %record.id, "update");
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(record.id)),
        }
    }

    async fn delete(&self, id: &BlockId) -> Result<bool, RepositoryError> {
        Ok(self.blocks.write().shift_remove(id).is_some())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        self.blocks.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_crud() {
        let repo = MemoryBlockRepository::new();
        let id = BlockId::new("a");
        repo.create(BlockRecord::new("a", "text")).await.unwrap();
        repo.create(BlockRecord::new("b", "image")).await.unwrap();

        assert_eq!(
            repo.create(BlockRecord::new("a", "text")).await,
            Err(RepositoryError::Duplicate(id.clone()))
        );

        let mut record = repo.get(&id).await.unwrap().unwrap();
        record.locked = true;
        repo.update(record).await.unwrap();
        assert!(repo.get(&id).await.unwrap().unwrap().locked);

        assert!(repo.delete(&id).await.unwrap());
        assert!(!repo.delete(&id).await.unwrap());
        assert_eq!(repo.len(), 1);

        assert_eq!(
            repo.update(BlockRecord::new("a", "text")).await,
            Err(RepositoryError::NotFound(id))
        );

        repo.clear().await.unwrap();
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_get_all_keeps_insertion_order() {
        let repo = MemoryBlockRepository::with_blocks(["c", "a", "b"].map(|id| BlockRecord::new(id, "text")));
        repo.delete(&BlockId::new("a")).await.unwrap();
        let ids: Vec<_> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id.into_string())
            .collect();
        assert_eq!(ids, vec!["c", "b"]);
    }
}
