use std::sync::{Arc, RwLock};

use ledger_api::{CommittedBlock, Journal, StateError};

// ═══════════════════════════════════════════════════════════════
//  MemoryJournal
// ═══════════════════════════════════════════════════════════════

/// Volatile journal. Cloning yields another handle to the same blocks, so a
/// ledger can be reopened over it (tests, ephemeral CLI runs).
#[derive(Clone, Default)]
pub struct MemoryJournal {
    blocks: Arc<RwLock<Vec<CommittedBlock>>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of appended blocks.
    pub fn len(&self) -> usize {
        self.blocks.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Journal for MemoryJournal {
    fn load(&self) -> Result<Vec<CommittedBlock>, StateError> {
        let blocks = self
            .blocks
            .read()
            .map_err(|_| StateError::logic("memory journal lock poisoned"))?;
        Ok(blocks.clone())
    }

    fn append(&self, block: &CommittedBlock) -> Result<(), StateError> {
        let mut blocks = self
            .blocks
            .write()
            .map_err(|_| StateError::logic("memory journal lock poisoned"))?;
        blocks.push(block.clone());
        Ok(())
    }
}
