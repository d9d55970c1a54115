//! In-memory chain store.

use crate::{ChainStore, StoreError, StoreResult};
use argentum_types::Block;
use async_trait::async_trait;
use parking_lot::RwLock;

/// Height-indexed in-memory chain.
///
/// Backs tests and the mining driver; the vector index is the block
/// height, so the store only ever holds the best chain.
#[derive(Default)]
pub struct MemoryChain {
    blocks: RwLock<Vec<Block>>,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing chain prefix, index = height.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks: RwLock::new(blocks),
        }
    }

    /// Append a block at the next height.
    pub fn push(&self, block: Block) {
        self.blocks.write().push(block);
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

#[async_trait]
impl ChainStore for MemoryChain {
    async fn block_by_height(&self, height: u32) -> StoreResult<Option<Block>> {
        Ok(self.blocks.read().get(height as usize).cloned())
    }

    async fn top_block(&self) -> StoreResult<Block> {
        self.blocks.read().last().cloned().ok_or(StoreError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_at(timestamp: u32) -> Block {
        Block {
            version: 1,
            timestamp,
            ..Block::default()
        }
    }

    #[tokio::test]
    async fn lookup_by_height() {
        let chain = MemoryChain::with_blocks(vec![block_at(10), block_at(20)]);
        assert_eq!(chain.len(), 2);

        let found = chain.block_by_height(1).await.unwrap().unwrap();
        assert_eq!(found.timestamp, 20);
        assert!(chain.block_by_height(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn top_block_is_last_pushed() {
        let chain = MemoryChain::new();
        assert_eq!(chain.top_block().await.unwrap_err(), StoreError::Empty);

        chain.push(block_at(10));
        chain.push(block_at(20));
        assert_eq!(chain.top_block().await.unwrap().timestamp, 20);
    }

    #[tokio::test]
    async fn batch_lookup_requires_every_height() {
        let chain = MemoryChain::with_blocks(vec![block_at(10), block_at(20)]);

        let blocks = chain.blocks_by_heights(&[0, 1]).await.unwrap();
        assert_eq!(blocks.len(), 2);

        let missing = chain.blocks_by_heights(&[0, 5]).await.unwrap_err();
        assert_eq!(missing, StoreError::NotFound(5));
    }
}
