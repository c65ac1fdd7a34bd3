//! Sensor readings on a versioned key-value ledger.
//!
//! Components, leaves first:
//! - [`codec`]: `SensorRecord` ⇄ stored bytes, batch-id input parsing.
//! - [`store`]: current value / history / range primitives over a `LedgerState`.
//! - [`query`]: single, batch, full-scan and bounded-history reads.
//! - [`signal`]: threshold-crossing notifications.
//! - [`contract`]: the operations exposed to callers.
//!
//! Every operation takes the ledger handle explicitly; nothing here holds state
//! between calls.

pub mod codec;
pub mod config;
pub mod contract;
pub mod error;
pub mod query;
pub mod signal;
pub mod store;

pub use codec::SensorRecord;
pub use config::ContractConfig;
pub use contract::SensorContract;
pub use error::{ContractError, ContractErrorKind};
pub use query::{BatchPolicy, QueryEngine};
pub use signal::{Notification, ThresholdSignal};
