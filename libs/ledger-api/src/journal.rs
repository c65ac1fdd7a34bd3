use crate::error::StateError;
use crate::event::ChaincodeEvent;

/// One write of a committed transaction. `value: None` is a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteEntry {
    pub key: String,
    pub value: Option<Vec<u8>>,
}

/// The durable unit of the ledger: everything one transaction changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedBlock {
    pub tx_id: u64,
    /// Writes in key order, at most one per key.
    pub writes: Vec<WriteEntry>,
    pub event: Option<ChaincodeEvent>,
}

/// Journal plugin trait.
///
/// The engine doesn't know concrete implementations. It replays `load()` once at
/// open and calls `append()` for every committed block before applying it to the
/// world state, so a failed append never leaves a half-applied transaction.
pub trait Journal: Send + Sync {
    /// All previously appended blocks, oldest first.
    fn load(&self) -> Result<Vec<CommittedBlock>, StateError>;

    /// Durably record a block.
    fn append(&self, block: &CommittedBlock) -> Result<(), StateError>;

    /// Flush buffered data. Default: no-op.
    fn flush(&self) -> Result<(), StateError> {
        Ok(())
    }
}
