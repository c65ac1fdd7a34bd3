use std::collections::{BTreeMap, HashMap};
use std::collections::btree_map;
use std::ops::Bound;

use ledger_api::{CommittedBlock, KeyModification, StateError};

/// Committed ledger state: current value per key plus the full write history.
///
/// Only `apply` mutates it, one block at a time, in `tx_id` order.
#[derive(Debug, Default)]
pub struct WorldState {
    current: BTreeMap<String, Vec<u8>>,
    /// Oldest first.
    history: HashMap<String, Vec<KeyModification>>,
    last_tx_id: u64,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.current.get(key).map(Vec::as_slice)
    }

    pub(crate) fn range<'a>(
        &'a self,
        bounds: (Bound<&str>, Bound<&str>),
    ) -> btree_map::Range<'a, String, Vec<u8>> {
        self.current.range::<str, _>(bounds)
    }

    /// Committed writes to `key`, oldest first.
    pub fn history(&self, key: &str) -> &[KeyModification] {
        self.history.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn last_tx_id(&self) -> u64 {
        self.last_tx_id
    }

    /// Number of keys with a current value.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Apply a committed block. Blocks must arrive with strictly increasing `tx_id`.
    pub fn apply(&mut self, block: &CommittedBlock) -> Result<(), StateError> {
        if block.tx_id <= self.last_tx_id {
            return Err(StateError::corrupt(format!(
                "block {} out of order (last applied {})",
                block.tx_id, self.last_tx_id
            )));
        }

        for write in &block.writes {
            match &write.value {
                Some(value) => {
                    self.current.insert(write.key.clone(), value.clone());
                    let entries = self.history.entry(write.key.clone()).or_default();
                    let seq = entries.last().map_or(1, |m| m.seq + 1);
                    entries.push(KeyModification {
                        seq,
                        tx_id: block.tx_id,
                        value: value.clone(),
                    });
                }
                None => {
                    self.current.remove(&write.key);
                }
            }
        }

        self.last_tx_id = block.tx_id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ledger_api::WriteEntry;

    use super::*;

    fn block(tx_id: u64, writes: &[(&str, Option<&[u8]>)]) -> CommittedBlock {
        CommittedBlock {
            tx_id,
            writes: writes
                .iter()
                .map(|(k, v)| WriteEntry {
                    key: k.to_string(),
                    value: v.map(<[u8]>::to_vec),
                })
                .collect(),
            event: None,
        }
    }

    #[test]
    fn should_number_history_per_key() {
        // given
        let mut world = WorldState::new();

        // when
        world.apply(&block(1, &[("a", Some(b"1")), ("b", Some(b"x"))])).unwrap();
        world.apply(&block(2, &[("a", Some(b"2"))])).unwrap();

        // then
        let seqs: Vec<(u64, u64)> = world.history("a").iter().map(|m| (m.seq, m.tx_id)).collect();
        assert_eq!(seqs, vec![(1, 1), (2, 2)]);
        assert_eq!(world.history("b")[0].seq, 1);
        assert_eq!(world.get("a"), Some(&b"2"[..]));
        assert_eq!(world.last_tx_id(), 2);
    }

    #[test]
    fn should_keep_history_after_delete() {
        // given
        let mut world = WorldState::new();
        world.apply(&block(1, &[("a", Some(b"1"))])).unwrap();

        // when
        world.apply(&block(2, &[("a", None)])).unwrap();

        // then
        assert_eq!(world.get("a"), None);
        assert!(world.is_empty());
        assert_eq!(world.history("a").len(), 1);
    }

    #[test]
    fn should_reject_out_of_order_block() {
        // given
        let mut world = WorldState::new();
        world.apply(&block(3, &[("a", Some(b"1"))])).unwrap();

        // when
        let result = world.apply(&block(3, &[("a", Some(b"2"))]));

        // then
        assert!(result.is_err());
        assert_eq!(world.get("a"), Some(&b"1"[..]));
    }

    #[test]
    fn should_store_empty_value_as_present() {
        // given
        let mut world = WorldState::new();

        // when
        world.apply(&block(1, &[("empty", Some(b""))])).unwrap();

        // then
        assert_eq!(world.get("empty"), Some(&b""[..]));
        assert_eq!(world.len(), 1);
    }
}
