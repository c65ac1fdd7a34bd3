use std::sync::Arc;

use serde_json::{Value, json};

use ledger_api::Journal;
use ledger_engine::Ledger;
use ledger_journal_file::FileJournal;
use ledger_journal_memory::MemoryJournal;
use sensor_contract::SensorContract;

use crate::config::{Command, StorageConfig};
use crate::error::CliError;

/// Create the journal selected by the configuration.
pub fn open_journal(storage: &StorageConfig) -> Result<Arc<dyn Journal>, CliError> {
    let journal: Arc<dyn Journal> = match storage {
        StorageConfig::Memory => Arc::new(MemoryJournal::new()),
        StorageConfig::File(cfg) => {
            let journal = FileJournal::open(cfg)?;
            tracing::info!(path = %journal.path().display(), "using file journal");
            Arc::new(journal)
        }
    };
    Ok(journal)
}

/// Run one command as one ledger transaction and return its JSON result.
///
/// Mutating commands go through `submit`, queries through `evaluate`.
pub fn execute(
    ledger: &Ledger,
    contract: &SensorContract,
    command: &Command,
) -> Result<Value, CliError> {
    let output = match command {
        Command::Put { id, timestamp, value } => {
            ledger.submit(|tx| contract.put_asset(tx, id, timestamp, *value))?;
            json!({ "tx_id": ledger.last_tx_id()? })
        }
        Command::Delete { id } => {
            ledger.submit(|tx| contract.delete_asset(tx, id))?;
            json!({ "tx_id": ledger.last_tx_id()? })
        }
        Command::Has { id } => {
            let exists = ledger.evaluate(|tx| contract.has_asset(&*tx, id))?;
            Value::Bool(exists)
        }
        Command::Get { id } => {
            let record = ledger.evaluate(|tx| contract.get_asset(&*tx, id))?;
            serde_json::to_value(record)?
        }
        Command::GetMany { ids_json } => {
            let records = ledger.evaluate(|tx| contract.get_assets(&*tx, ids_json))?;
            serde_json::to_value(records)?
        }
        Command::All => {
            let records = ledger.evaluate(|tx| contract.get_all_assets(&*tx))?;
            serde_json::to_value(records)?
        }
        Command::History { id, max } => {
            let records = ledger
                .evaluate(|tx| contract.get_asset_history(&*tx, id, *max))?;
            serde_json::to_value(records)?
        }
    };
    Ok(output)
}
