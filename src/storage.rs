//! Block storage collaborator.
//!
//! The pipeline reads its input as one whole block and writes its result as
//! one whole block; partial reads are rejected.

use hashbrown::HashMap;

use crate::error::{BlockId, StorageError};
use crate::num::SplitSignal;

pub trait BlockStore {
    /// Read the block `id`, which must hold exactly `len` samples.
    fn read_block(&self, id: BlockId, len: usize) -> Result<SplitSignal, StorageError>;

    /// Store `signal` under `id`, replacing any previous block.
    fn write_block(&mut self, id: BlockId, signal: &SplitSignal) -> Result<(), StorageError>;
}

/// In-memory [`BlockStore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    blocks: HashMap<BlockId, SplitSignal>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: BlockId, signal: SplitSignal) -> Option<SplitSignal> {
        self.blocks.insert(id, signal)
    }

    pub fn get(&self, id: BlockId) -> Option<&SplitSignal> {
        self.blocks.get(&id)
    }

    pub fn remove(&mut self, id: BlockId) -> Option<SplitSignal> {
        self.blocks.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockStore for MemoryStore {
    fn read_block(&self, id: BlockId, len: usize) -> Result<SplitSignal, StorageError> {
        let block = self.blocks.get(&id).ok_or(StorageError::MissingBlock(id))?;
        if block.len() != len {
            return Err(StorageError::ShapeMismatch {
                block: id,
                expected: len,
                actual: block.len(),
            });
        }
        Ok(block.clone())
    }

    fn write_block(&mut self, id: BlockId, signal: &SplitSignal) -> Result<(), StorageError> {
        match self.blocks.get_mut(&id) {
            Some(existing) if existing.len() == signal.len() => {
                let (re, im) = signal.as_slices();
                existing
                    .copy_from_slices(re, im)
                    .map_err(|_| StorageError::Io(format!("failed to overwrite {}", id)))?;
            }
            _ => {
                self.blocks.insert(id, signal.clone());
            }
        }
        log::debug!("stored {} ({} samples)", id, signal.len());
        Ok(())
    }
}
