use ledger_api::LedgerState;

use crate::codec::{self, SensorRecord};
use crate::config::ContractConfig;
use crate::error::ContractError;
use crate::query::QueryEngine;
use crate::signal::ThresholdSignal;
use crate::store;

/// Operations exposed to callers. Validates input, then delegates to the store,
/// query engine and threshold signal.
///
/// Every method takes the ledger handle of the running transaction; the
/// contract itself only carries configuration.
#[derive(Debug, Clone, Default)]
pub struct SensorContract {
    query: QueryEngine,
    signal: ThresholdSignal,
}

impl SensorContract {
    pub fn new(config: &ContractConfig) -> Result<Self, ContractError> {
        config.validate()?;
        Ok(Self {
            query: QueryEngine::new(config.batch_policy),
            signal: ThresholdSignal::new(config.threshold, config.event_name.clone()),
        })
    }

    pub fn has_asset<S: LedgerState + ?Sized>(&self, state: &S, id: &str) -> Result<bool, ContractError> {
        check_id(id)?;
        store::has(state, id)
    }

    /// Create or replace the record for `id`. Emits an event if `value` is over
    /// the threshold; a failure to attach the event never fails the write.
    pub fn put_asset<S: LedgerState + ?Sized>(
        &self,
        state: &mut S,
        id: &str,
        timestamp: &str,
        value: i64,
    ) -> Result<(), ContractError> {
        check_id(id)?;
        let record = SensorRecord::new(id, timestamp, value);
        store::put(state, id, codec::encode(&record)?)?;

        if let Some(notification) = self.signal.evaluate(id, value) {
            match state.set_event(&notification.name, notification.payload()) {
                Ok(()) => tracing::info!(
                    id,
                    value,
                    threshold = self.signal.threshold(),
                    event = %notification.name,
                    "threshold exceeded"
                ),
                Err(e) => tracing::warn!(id, value, error = %e, "failed to set threshold event"),
            }
        }
        Ok(())
    }

    pub fn delete_asset<S: LedgerState + ?Sized>(&self, state: &mut S, id: &str) -> Result<(), ContractError> {
        check_id(id)?;
        store::delete(state, id)
    }

    pub fn get_asset<S: LedgerState + ?Sized>(&self, state: &S, id: &str) -> Result<SensorRecord, ContractError> {
        check_id(id)?;
        self.query.get_asset(state, id)
    }

    /// `ids_json` is a JSON array of ids, e.g. `["s1","s2"]`.
    pub fn get_assets<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        ids_json: &str,
    ) -> Result<Vec<SensorRecord>, ContractError> {
        let ids = codec::validate_batch_input(ids_json)?;
        for id in &ids {
            check_id(id)?;
        }
        self.query.get_assets(state, &ids)
    }

    pub fn get_all_assets<S: LedgerState + ?Sized>(&self, state: &S) -> Result<Vec<SensorRecord>, ContractError> {
        self.query.get_all_assets(state)
    }

    /// The `max` most recent states of `id`, newest first.
    pub fn get_asset_history<S: LedgerState + ?Sized>(
        &self,
        state: &S,
        id: &str,
        max: i64,
    ) -> Result<Vec<SensorRecord>, ContractError> {
        check_id(id)?;
        self.query.get_history(state, id, max)
    }
}

/// The empty key is reserved: it means "unbounded" in range scans.
fn check_id(id: &str) -> Result<(), ContractError> {
    if id.is_empty() {
        return Err(ContractError::InvalidInput("asset id must not be empty".into()));
    }
    Ok(())
}
