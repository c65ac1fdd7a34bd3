use ledger_api::LedgerState;
use serde::Deserialize;

use crate::codec::{self, SensorRecord};
use crate::error::{ContractError, ContractErrorKind};
use crate::store;

/// What a batch read does when one of the requested ids is missing or corrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// First failure aborts the whole batch; no partial result.
    #[default]
    FailFast,
    /// Missing or corrupt ids are skipped with a warning. Storage faults still abort.
    BestEffort,
}

/// Read paths over the versioned store. Holds only policy, never ledger state.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine {
    policy: BatchPolicy,
}

impl QueryEngine {
    pub fn new(policy: BatchPolicy) -> Self {
        Self { policy }
    }

    pub fn get_asset<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        id: &str,
    ) -> Result<SensorRecord, ContractError> {
        let bytes = store::get(state, id)?;
        codec::decode(&bytes).map_err(|e| e.with_context(format!("asset {id}")))
    }

    /// Records for `ids`, in input order.
    pub fn get_assets<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        ids: &[String],
    ) -> Result<Vec<SensorRecord>, ContractError> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_asset(state, id) {
                Ok(record) => records.push(record),
                Err(e) if self.skips(&e) => {
                    tracing::warn!(id = %id, error = %e, "skipping asset in batch read");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }

    /// Every current record, ascending by id. The first undecodable entry aborts.
    pub fn get_all_assets<S: LedgerState + ?Sized>(
        &self,
        state: &S,
    ) -> Result<Vec<SensorRecord>, ContractError> {
        let records = store::scan_all(state)?
            .map(|entry| {
                let entry = entry?;
                codec::decode(&entry.value).map_err(|e| e.with_context(format!("asset {}", entry.key)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = records.len(), "scanned all assets");
        Ok(records)
    }

    /// Up to `max` most recent records written to `id`, newest first.
    ///
    /// `max <= 0` returns nothing without opening a cursor.
    pub fn get_history<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        id: &str,
        max: i64,
    ) -> Result<Vec<SensorRecord>, ContractError> {
        if max <= 0 {
            return Ok(Vec::new());
        }
        let limit = usize::try_from(max).unwrap_or(usize::MAX);

        store::scan_history(state, id)?
            .take(limit)
            .map(|entry| {
                let entry = entry?;
                codec::decode(&entry.value)
                    .map_err(|e| e.with_context(format!("asset {id} seq {}", entry.seq)))
            })
            .collect()
    }

    fn skips(&self, err: &ContractError) -> bool {
        self.policy == BatchPolicy::BestEffort
            && matches!(err.kind(), ContractErrorKind::NotFound | ContractErrorKind::Decode)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ledger_engine::Ledger;
    use ledger_journal_memory::MemoryJournal;

    use super::*;

    fn ledger_with(records: &[SensorRecord]) -> Ledger {
        let ledger = Ledger::open(Arc::new(MemoryJournal::new())).unwrap();
        for record in records {
            ledger
                .submit(|tx| store::put(tx, &record.id, codec::encode(record)?))
                .unwrap();
        }
        ledger
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn should_get_assets_in_input_order() {
        // given
        let a = SensorRecord::new("a", "t", 1);
        let b = SensorRecord::new("b", "t", 2);
        let ledger = ledger_with(&[a.clone(), b.clone()]);
        let engine = QueryEngine::default();

        // when
        let records = ledger
            .evaluate(|tx| engine.get_assets(&*tx, &ids(&["b", "a", "b"])))
            .unwrap();

        // then
        assert_eq!(records, vec![b.clone(), a, b]);
    }

    #[test]
    fn should_fail_whole_batch_when_one_id_missing() {
        // given
        let ledger = ledger_with(&[SensorRecord::new("a", "t", 1)]);
        let engine = QueryEngine::new(BatchPolicy::FailFast);

        // when
        let result = ledger.evaluate(|tx| engine.get_assets(&*tx, &ids(&["a", "b"])));

        // then
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::NotFound(ref id) if id == "b"));
    }

    #[test]
    fn should_skip_missing_and_corrupt_in_best_effort_mode() {
        // given
        let ledger = ledger_with(&[SensorRecord::new("a", "t", 1)]);
        ledger
            .submit(|tx| store::put(tx, "bad", b"not json".to_vec()))
            .unwrap();
        let engine = QueryEngine::new(BatchPolicy::BestEffort);

        // when
        let records = ledger
            .evaluate(|tx| engine.get_assets(&*tx, &ids(&["bad", "a", "missing"])))
            .unwrap();

        // then
        assert_eq!(records, vec![SensorRecord::new("a", "t", 1)]);
    }

    #[test]
    fn should_return_all_assets_sorted_by_id() {
        // given
        let ledger = ledger_with(&[
            SensorRecord::new("s3", "t", 3),
            SensorRecord::new("s1", "t", 1),
            SensorRecord::new("s10", "t", 10),
            SensorRecord::new("s2", "t", 2),
        ]);

        // when
        let records = ledger
            .evaluate(|tx| QueryEngine::default().get_all_assets(&*tx))
            .unwrap();

        // then
        let got: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["s1", "s10", "s2", "s3"]);
    }

    #[test]
    fn should_abort_full_scan_on_corrupt_entry_and_close_cursor() {
        // given
        let ledger = ledger_with(&[SensorRecord::new("a", "t", 1), SensorRecord::new("c", "t", 3)]);
        ledger
            .submit(|tx| store::put(tx, "b", b"[]".to_vec()))
            .unwrap();

        // when
        let (result, open) = ledger
            .evaluate(|tx| -> Result<_, ContractError> {
                let result = QueryEngine::default().get_all_assets(&*tx);
                Ok((result, tx.open_cursors()))
            })
            .unwrap();

        // then
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ContractErrorKind::Decode);
        assert!(err.to_string().contains("asset b"), "{err}");
        assert_eq!(open, 0);
    }

    #[test]
    fn should_bound_history_by_max() {
        // given
        let ledger = ledger_with(&[]);
        for v in 1..=5 {
            let record = SensorRecord::new("k", format!("t{v}"), v);
            ledger
                .submit(|tx| store::put(tx, "k", codec::encode(&record)?))
                .unwrap();
        }
        let engine = QueryEngine::default();

        // when
        let values = |max: i64| -> Vec<i64> {
            ledger
                .evaluate(|tx| engine.get_history(&*tx, "k", max))
                .unwrap()
                .into_iter()
                .map(|r| r.value)
                .collect()
        };

        // then
        assert_eq!(values(3), vec![5, 4, 3]);
        assert_eq!(values(5), vec![5, 4, 3, 2, 1]);
        assert_eq!(values(100), vec![5, 4, 3, 2, 1]);
        assert!(values(0).is_empty());
        assert!(values(-1).is_empty());
    }

    #[test]
    fn should_return_empty_history_for_unknown_key() {
        // given
        let ledger = ledger_with(&[]);

        // when
        let history = ledger
            .evaluate(|tx| QueryEngine::default().get_history(&*tx, "nobody", 10))
            .unwrap();

        // then
        assert!(history.is_empty());
    }

    #[test]
    fn should_close_history_cursor_after_early_stop() {
        // given
        let ledger = ledger_with(&[SensorRecord::new("k", "t", 1), SensorRecord::new("k", "t", 2)]);

        // when
        let open = ledger
            .evaluate(|tx| -> Result<usize, ContractError> {
                let history = QueryEngine::default().get_history(&*tx, "k", 1)?;
                assert_eq!(history.len(), 1);
                Ok(tx.open_cursors())
            })
            .unwrap();

        // then
        assert_eq!(open, 0);
    }
}
