use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use ledger_api::{ChaincodeEvent, CommittedBlock, StateError, WriteEntry};

// ════════════════════════════════════════════════════════════════
//  Configuration
// ════════════════════════════════════════════════════════════════

fn default_file_name() -> String {
    "ledger.jsonl".to_string()
}

fn default_sync() -> bool {
    true
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct FileJournalConfig {
    pub data_dir: String,
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// fsync after every appended block.
    #[serde(default = "default_sync")]
    pub sync: bool,
}

impl FileJournalConfig {
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            file_name: default_file_name(),
            sync: default_sync(),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  On-disk record formats
// ════════════════════════════════════════════════════════════════

/// One line of the journal. Byte payloads are base64.
#[derive(serde::Serialize, serde::Deserialize)]
pub(crate) struct DiskBlock {
    pub tx_id: u64,
    pub writes: Vec<DiskWrite>,
    #[serde(default)]
    pub event: Option<DiskEvent>,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub(crate) struct DiskWrite {
    pub key: String,
    /// `null` marks a delete.
    pub value: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub(crate) struct DiskEvent {
    pub name: String,
    pub payload: String,
}

impl From<&CommittedBlock> for DiskBlock {
    fn from(block: &CommittedBlock) -> Self {
        Self {
            tx_id: block.tx_id,
            writes: block
                .writes
                .iter()
                .map(|w| DiskWrite {
                    key: w.key.clone(),
                    value: w.value.as_ref().map(|v| STANDARD.encode(v)),
                })
                .collect(),
            event: block.event.as_ref().map(|e| DiskEvent {
                name: e.name.clone(),
                payload: STANDARD.encode(&e.payload),
            }),
        }
    }
}

impl TryFrom<DiskBlock> for CommittedBlock {
    type Error = StateError;

    fn try_from(disk: DiskBlock) -> Result<Self, Self::Error> {
        let writes = disk
            .writes
            .into_iter()
            .map(|w| -> Result<WriteEntry, StateError> {
                let value = match w.value {
                    Some(v) => Some(decode_b64(&v).map_err(|e| e.with_context(&w.key))?),
                    None => None,
                };
                Ok(WriteEntry { key: w.key, value })
            })
            .collect::<Result<Vec<_>, StateError>>()?;

        let event = match disk.event {
            Some(e) => Some(ChaincodeEvent::new(e.name, decode_b64(&e.payload)?)),
            None => None,
        };

        Ok(CommittedBlock {
            tx_id: disk.tx_id,
            writes,
            event,
        })
    }
}

fn decode_b64(s: &str) -> Result<Vec<u8>, StateError> {
    STANDARD
        .decode(s)
        .map_err(|e| StateError::corrupt(format!("base64: {e}")))
}
