use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::{BTreeMap, btree_map};
use std::iter::{Peekable, Rev};
use std::ops::Bound;
use std::rc::Rc;

use ledger_api::{
    ChaincodeEvent, KeyModification, KeyValue, LedgerState, StateError, StateQueryIterator,
    WriteEntry,
};

use crate::world::WorldState;

/// One transaction against a committed `WorldState` snapshot.
///
/// Writes are buffered in a write set and are visible to later reads of the same
/// transaction. History only reflects committed blocks. Nothing reaches the world
/// state until the owning `Ledger` commits the write set.
pub struct Transaction<'w> {
    world: &'w WorldState,
    writes: BTreeMap<String, Option<Vec<u8>>>,
    event: Option<ChaincodeEvent>,
    open_cursors: Rc<Cell<usize>>,
}

impl<'w> Transaction<'w> {
    pub fn new(world: &'w WorldState) -> Self {
        Self {
            world,
            writes: BTreeMap::new(),
            event: None,
            open_cursors: Rc::new(Cell::new(0)),
        }
    }

    /// Range and history cursors handed out and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.get()
    }

    /// Event set by the running transaction, if any.
    pub fn event(&self) -> Option<&ChaincodeEvent> {
        self.event.as_ref()
    }

    /// True if committing would change nothing.
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty() && self.event.is_none()
    }

    /// Consume into (writes in key order, event).
    pub(crate) fn into_parts(self) -> (Vec<WriteEntry>, Option<ChaincodeEvent>) {
        let leaked = self.open_cursors.get();
        if leaked > 0 {
            tracing::warn!(cursors = leaked, "transaction finished with open cursors");
        }
        let writes = self
            .writes
            .into_iter()
            .map(|(key, value)| WriteEntry { key, value })
            .collect();
        (writes, self.event)
    }
}

/// `""` on either side means unbounded. An inverted range maps to an empty one.
fn key_bounds<'a>(start: &'a str, end: &'a str) -> (Bound<&'a str>, Bound<&'a str>) {
    let lower = if start.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(start)
    };
    let upper = if end.is_empty() {
        Bound::Unbounded
    } else if !start.is_empty() && start > end {
        Bound::Excluded(start)
    } else {
        Bound::Excluded(end)
    };
    (lower, upper)
}

impl LedgerState for Transaction<'_> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StateError> {
        if let Some(pending) = self.writes.get(key) {
            return Ok(pending.clone());
        }
        Ok(self.world.get(key).map(<[u8]>::to_vec))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StateError> {
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<(), StateError> {
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    fn get_state_by_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Box<dyn StateQueryIterator<KeyValue> + '_>, StateError> {
        let bounds = key_bounds(start, end);
        Ok(Box::new(RangeIter {
            committed: self.world.range(bounds).peekable(),
            pending: self.writes.range::<str, _>(bounds).peekable(),
            cursor: OpenCursor::new(&self.open_cursors),
        }))
    }

    fn get_history_for_key(
        &self,
        key: &str,
    ) -> Result<Box<dyn StateQueryIterator<KeyModification> + '_>, StateError> {
        Ok(Box::new(HistoryIter {
            entries: self.world.history(key).iter().rev(),
            cursor: OpenCursor::new(&self.open_cursors),
        }))
    }

    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), StateError> {
        if let Some(previous) = &self.event {
            tracing::debug!(previous = %previous.name, name, "replacing transaction event");
        }
        self.event = Some(ChaincodeEvent::new(name, payload));
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Cursors
// ═══════════════════════════════════════════════════════════════

/// Open-cursor accounting shared with the owning transaction.
struct OpenCursor {
    open: Rc<Cell<usize>>,
    closed: bool,
}

impl OpenCursor {
    fn new(open: &Rc<Cell<usize>>) -> Self {
        open.set(open.get() + 1);
        Self {
            open: Rc::clone(open),
            closed: false,
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.open.set(self.open.get().saturating_sub(1));
        }
    }
}

/// Merges the committed snapshot with the pending write set, key ascending.
struct RangeIter<'a> {
    committed: Peekable<btree_map::Range<'a, String, Vec<u8>>>,
    pending: Peekable<btree_map::Range<'a, String, Option<Vec<u8>>>>,
    cursor: OpenCursor,
}

impl Iterator for RangeIter<'_> {
    type Item = Result<KeyValue, StateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.closed {
            return Some(Err(StateError::closed("range iterator already closed")));
        }

        loop {
            let order = match (self.committed.peek(), self.pending.peek()) {
                (None, None) => return None,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some((committed, _)), Some((pending, _))) => committed.cmp(pending),
            };

            if order == Ordering::Less {
                let (key, value) = self.committed.next()?;
                return Some(Ok(KeyValue {
                    key: key.clone(),
                    value: value.clone(),
                }));
            }

            // Pending write shadows the committed entry with the same key.
            if order == Ordering::Equal {
                self.committed.next();
            }
            let (key, value) = self.pending.next()?;
            if let Some(value) = value {
                return Some(Ok(KeyValue {
                    key: key.clone(),
                    value: value.clone(),
                }));
            }
        }
    }
}

impl StateQueryIterator<KeyValue> for RangeIter<'_> {
    fn close(&mut self) -> Result<(), StateError> {
        self.cursor.close();
        Ok(())
    }
}

struct HistoryIter<'a> {
    entries: Rev<std::slice::Iter<'a, KeyModification>>,
    cursor: OpenCursor,
}

impl Iterator for HistoryIter<'_> {
    type Item = Result<KeyModification, StateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.closed {
            return Some(Err(StateError::closed("history iterator already closed")));
        }
        self.entries.next().cloned().map(Ok)
    }
}

impl StateQueryIterator<KeyModification> for HistoryIter<'_> {
    fn close(&mut self) -> Result<(), StateError> {
        self.cursor.close();
        Ok(())
    }
}
