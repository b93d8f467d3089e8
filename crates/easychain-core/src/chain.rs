//! Blockchain: an ordered, append-only sequence of linked blocks.
//!
//! A blockchain has no hash of its own. Its integrity is a predicate over its
//! blocks, checked by [`Blockchain::validate`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::encoder::{Encoder, HashAlgorithm};
use crate::error::{InvalidBlock, InvalidBlockchain};
use crate::linked::HashLinked;
use crate::types::ContentHash;

/// The root of the hierarchy and the validation entry point.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blockchain {
    blocks: Vec<Block>,
}

impl Blockchain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Rebuild a chain from blocks exactly as they were stored.
    ///
    /// Nothing is linked, sealed or checked. Call [`Blockchain::validate`]
    /// before trusting the result.
    pub fn from_blocks_unchecked(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Append a block, linking it to the current tail and sealing it.
    pub fn add_block(&mut self, block: Block) -> Result<(), InvalidBlock> {
        self.add_block_with(block, &HashAlgorithm::default())
    }

    /// [`Blockchain::add_block`] with an explicit encoder.
    ///
    /// Empty blocks and blocks that fail their own validation are rejected
    /// before anything is linked.
    pub fn add_block_with(
        &mut self,
        mut block: Block,
        encoder: &dyn Encoder,
    ) -> Result<(), InvalidBlock> {
        if block.is_empty() {
            return Err(InvalidBlock::Empty);
        }
        block.validate_with(encoder)?;

        if let Some(tail) = self.blocks.last() {
            block.link_with(tail, encoder);
        }
        block.seal_with(encoder);
        self.blocks.push(block);
        Ok(())
    }

    /// The blocks, in append order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Mutable access to a stored block.
    ///
    /// Changes are not prevented, only made detectable by [`Blockchain::validate`].
    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    /// The most recently appended block.
    pub fn head(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Live hash of the head block.
    pub fn head_hash(&self) -> Option<ContentHash> {
        self.head_hash_with(&HashAlgorithm::default())
    }

    /// [`Blockchain::head_hash`] with an explicit encoder.
    pub fn head_hash_with(&self, encoder: &dyn Encoder) -> Option<ContentHash> {
        self.blocks.last()?.hash_with(encoder)
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the chain has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total number of messages across all blocks.
    pub fn message_count(&self) -> usize {
        self.blocks.iter().map(Block::len).sum()
    }

    /// Validate every block and every inter-block link.
    pub fn validate(&self) -> Result<(), InvalidBlockchain> {
        self.validate_with(&HashAlgorithm::default())
    }

    /// [`Blockchain::validate`] with an explicit encoder.
    ///
    /// Fail-fast: blocks after the first failure are not examined.
    pub fn validate_with(&self, encoder: &dyn Encoder) -> Result<(), InvalidBlockchain> {
        for (index, block) in self.blocks.iter().enumerate() {
            block
                .validate_with(encoder)
                .map_err(|source| InvalidBlockchain::Block { index, source })?;

            if index > 0 {
                let prev = &self.blocks[index - 1];
                if !block.links_to(prev, encoder) {
                    return Err(InvalidBlockchain::BrokenLink {
                        index,
                        expected: prev.hash_with(encoder),
                        actual: block.prev_hash,
                    });
                }
            }
        }
        Ok(())
    }
}

/// A chain's content hash is its head block's hash; its back-reference is
/// the first block's, which lets one chain segment continue another.
impl HashLinked for Blockchain {
    fn content_hash(&self, encoder: &dyn Encoder) -> Option<ContentHash> {
        self.head_hash_with(encoder)
    }

    fn previous_hash(&self) -> Option<ContentHash> {
        self.blocks.first().and_then(|b| b.prev_hash)
    }
}

impl fmt::Debug for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blockchain<blocks: {}>", self.blocks.len())
    }
}
