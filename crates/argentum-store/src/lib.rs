//! # argentum-store
//!
//! Chain lookup contract for the Argentum core.
//!
//! Consensus and mining consume the block store exclusively through the
//! narrow [`ChainStore`] interface. Lookups are asynchronous; every
//! lookup completes before the dependent computation observes its
//! result, and the first store error aborts the whole operation.

mod error;
mod memory;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryChain;

use argentum_types::Block;
use async_trait::async_trait;

/// Narrow lookup interface over the block store.
#[async_trait]
pub trait ChainStore: Send + Sync {
    /// The block at `height` on the best chain.
    async fn block_by_height(&self, height: u32) -> StoreResult<Option<Block>>;

    /// Several blocks at once. A missing entry is an error.
    async fn blocks_by_heights(&self, heights: &[u32]) -> StoreResult<Vec<Block>> {
        let mut blocks = Vec::with_capacity(heights.len());
        for &height in heights {
            blocks.push(
                self.block_by_height(height)
                    .await?
                    .ok_or(StoreError::NotFound(height))?,
            );
        }
        Ok(blocks)
    }

    /// The tip of the best chain.
    async fn top_block(&self) -> StoreResult<Block>;
}
