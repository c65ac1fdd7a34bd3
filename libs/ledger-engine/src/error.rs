use ledger_api::StateError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("journal error: {0}")]
    Journal(#[from] StateError),

    #[error("replay of block {tx_id} failed: {source}")]
    Replay { tx_id: u64, source: StateError },
}
