//! Versioned store primitives over an explicit [`LedgerState`] handle.
//!
//! Current values live under their key; every put also becomes a history entry
//! kept by the platform. Deleting removes the current value only.

use ledger_api::{KeyModification, KeyValue, LedgerState, StateQueryIterator};

use crate::error::ContractError;

/// True iff `key` has a current value.
pub fn has<S: LedgerState + ?Sized>(state: &S, key: &str) -> Result<bool, ContractError> {
    Ok(state.get_state(key)?.is_some())
}

/// Current payload of `key`. An empty payload is returned as such; only a missing
/// entry is `NotFound`.
pub fn get<S: LedgerState + ?Sized>(state: &S, key: &str) -> Result<Vec<u8>, ContractError> {
    state
        .get_state(key)?
        .ok_or_else(|| ContractError::NotFound(key.to_string()))
}

/// Replace the current value of `key`, adding a history entry at commit.
pub fn put<S: LedgerState + ?Sized>(
    state: &mut S,
    key: &str,
    bytes: Vec<u8>,
) -> Result<(), ContractError> {
    tracing::debug!(key, len = bytes.len(), "put");
    state.put_state(key, bytes)?;
    Ok(())
}

/// Remove the current value of `key`; its history stays.
///
/// Check-then-delete: only safe because the platform runs the whole operation
/// in one single-writer transaction.
pub fn delete<S: LedgerState + ?Sized>(state: &mut S, key: &str) -> Result<(), ContractError> {
    if !has(&*state, key)? {
        return Err(ContractError::NotFound(key.to_string()));
    }
    tracing::debug!(key, "delete");
    state.del_state(key)?;
    Ok(())
}

/// Every key with a current value, ascending byte order.
pub fn scan_all<S: LedgerState + ?Sized>(state: &S) -> Result<Cursor<'_, KeyValue>, ContractError> {
    let inner = state.get_state_by_range("", "")?;
    Ok(Cursor::new(inner, "range"))
}

/// Committed writes to `key`, most recent first.
pub fn scan_history<'a, S: LedgerState + ?Sized>(
    state: &'a S,
    key: &str,
) -> Result<Cursor<'a, KeyModification>, ContractError> {
    let inner = state.get_history_for_key(key)?;
    Ok(Cursor::new(inner, "history"))
}

// ═══════════════════════════════════════════════════════════════
//  Cursor
// ═══════════════════════════════════════════════════════════════

/// Owns a platform cursor and closes it exactly once: on exhaustion, on the
/// first error, or on drop, whichever comes first.
///
/// Close failures happen after the result is settled; they are logged and ignored.
pub struct Cursor<'a, T> {
    inner: Box<dyn StateQueryIterator<T> + 'a>,
    label: &'static str,
    closed: bool,
}

impl<'a, T> Cursor<'a, T> {
    fn new(inner: Box<dyn StateQueryIterator<T> + 'a>, label: &'static str) -> Self {
        Self {
            inner,
            label,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn release(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.inner.close() {
            tracing::warn!(cursor = self.label, error = %e, "failed to close cursor");
        }
    }
}

impl<T> Iterator for Cursor<'_, T> {
    type Item = Result<T, ContractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        match self.inner.next() {
            Some(Ok(item)) => Some(Ok(item)),
            Some(Err(e)) => {
                self.release();
                Some(Err(ContractError::StorageFault(e)))
            }
            None => {
                self.release();
                None
            }
        }
    }
}

impl<T> Drop for Cursor<'_, T> {
    fn drop(&mut self) {
        self.release();
    }
}
