//! Reference ledger platform: world state, snapshot transactions with a
//! buffered write set, journal persistence and committed-event delivery.

pub mod error;
pub mod ledger;
pub mod transaction;
pub mod world;

pub use error::EngineError;
pub use ledger::Ledger;
pub use transaction::Transaction;
pub use world::WorldState;
