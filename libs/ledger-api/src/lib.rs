//! Ledger State Interface shared by the contract core and the ledger engine.
//!
//! The contract never reaches for ambient state: every operation receives an
//! explicit `&dyn LedgerState` / `&mut dyn LedgerState` handle. Any backend
//! implementing these traits is substitutable.

pub mod error;
pub mod event;
pub mod journal;
pub mod state;

pub use error::{ErrorKind, StateError};
pub use event::ChaincodeEvent;
pub use journal::{CommittedBlock, Journal, WriteEntry};
pub use state::{KeyModification, KeyValue, LedgerState, StateQueryIterator};
