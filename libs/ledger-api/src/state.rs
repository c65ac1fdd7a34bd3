use crate::error::StateError;

/// One entry of a range scan: a key and its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// One committed write to a key, as returned by history scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyModification {
    /// Per-key sequence number, starting at 1.
    pub seq: u64,
    /// Ledger-wide id of the transaction that wrote this value.
    pub tx_id: u64,
    pub value: Vec<u8>,
}

/// Cursor over a range or history query.
///
/// Holds a platform-level resource until `close` is called. `close` must be
/// idempotent; calling `next` after `close` yields a `Closed` error.
pub trait StateQueryIterator<T>: Iterator<Item = Result<T, StateError>> {
    fn close(&mut self) -> Result<(), StateError>;
}

/// Ledger State Interface.
///
/// The contract core sees the ledger only through this trait. Reads observe a
/// consistent snapshot for the lifetime of the handle; writes are applied by the
/// platform atomically when the surrounding transaction commits.
pub trait LedgerState {
    /// Current value of `key`, or `None` if no entry exists.
    ///
    /// An empty `Vec` is a stored value, not an absent one.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StateError>;

    /// Set the current value of `key`.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StateError>;

    /// Remove the current value of `key`. History is retained.
    fn del_state(&mut self, key: &str) -> Result<(), StateError>;

    /// Keys in `[start, end)` with their current values, ascending byte order.
    ///
    /// An empty string on either side means unbounded.
    fn get_state_by_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Box<dyn StateQueryIterator<KeyValue> + '_>, StateError>;

    /// Committed writes to `key`, newest first.
    fn get_history_for_key(
        &self,
        key: &str,
    ) -> Result<Box<dyn StateQueryIterator<KeyModification> + '_>, StateError>;

    /// Attach an event to the transaction. A later call replaces an earlier one.
    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), StateError>;
}
