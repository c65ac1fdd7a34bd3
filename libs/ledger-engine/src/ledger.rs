use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, MutexGuard};

use ledger_api::{ChaincodeEvent, CommittedBlock, Journal, StateError};

use crate::error::EngineError;
use crate::transaction::Transaction;
use crate::world::WorldState;

/// The ledger: committed world state, its journal and event subscribers.
///
/// Transactions are serialized behind one lock (single writer). Each transaction
/// reads a consistent snapshot and its writes land atomically at commit.
pub struct Ledger {
    world: Mutex<WorldState>,
    journal: Arc<dyn Journal>,
    subscribers: Mutex<Vec<SyncSender<ChaincodeEvent>>>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger").finish_non_exhaustive()
    }
}

impl Ledger {
    /// Open a ledger by replaying every block of `journal`.
    pub fn open(journal: Arc<dyn Journal>) -> Result<Self, EngineError> {
        let blocks = journal.load()?;
        let mut world = WorldState::new();
        for block in &blocks {
            world.apply(block).map_err(|source| EngineError::Replay {
                tx_id: block.tx_id,
                source,
            })?;
        }

        tracing::info!(
            blocks = blocks.len(),
            keys = world.len(),
            last_tx_id = world.last_tx_id(),
            "ledger opened"
        );

        Ok(Self {
            world: Mutex::new(world),
            journal,
            subscribers: Mutex::new(Vec::new()),
        })
    }

    /// Run `f` as a transaction and commit its writes if it returns `Ok`.
    ///
    /// On `Err` nothing is applied. The block is appended to the journal before it
    /// is applied to the world state; an append failure fails the transaction.
    /// The transaction's event, if any, is delivered after the commit.
    pub fn submit<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T, E>,
        E: From<StateError>,
    {
        let mut world = self.lock_world()?;

        let (result, writes, event) = {
            let mut tx = Transaction::new(&world);
            let result = f(&mut tx);
            let (writes, event) = tx.into_parts();
            (result, writes, event)
        };

        let value = match result {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(discarded_writes = writes.len(), "transaction failed, rolled back");
                return Err(e);
            }
        };

        if writes.is_empty() && event.is_none() {
            return Ok(value);
        }

        let block = CommittedBlock {
            tx_id: world.last_tx_id() + 1,
            writes,
            event,
        };
        self.journal
            .append(&block)
            .map_err(|e| e.with_context(format!("append block {}", block.tx_id)))?;
        world.apply(&block)?;
        drop(world);

        tracing::debug!(tx_id = block.tx_id, writes = block.writes.len(), "transaction committed");

        if let Some(event) = block.event {
            self.publish(event);
        }
        Ok(value)
    }

    /// Run `f` against the current snapshot. Writes and events are discarded.
    pub fn evaluate<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T, E>,
        E: From<StateError>,
    {
        let world = self.lock_world()?;
        let mut tx = Transaction::new(&world);
        let result = f(&mut tx);
        if !tx.is_read_only() {
            tracing::debug!("evaluate discarded transaction writes");
        }
        let _ = tx.into_parts();
        result
    }

    /// Receive events of committed transactions.
    ///
    /// Delivery is fire-and-forget: if the channel is full the event is dropped.
    pub fn subscribe(&self, buffer: usize) -> Result<Receiver<ChaincodeEvent>, StateError> {
        let (tx, rx) = mpsc::sync_channel(buffer.max(1));
        self.subscribers
            .lock()
            .map_err(|_| StateError::logic("subscriber list lock poisoned"))?
            .push(tx);
        Ok(rx)
    }

    /// Flush the journal.
    pub fn flush(&self) -> Result<(), StateError> {
        self.journal.flush()
    }

    /// Id of the last committed transaction, 0 for an empty ledger.
    pub fn last_tx_id(&self) -> Result<u64, StateError> {
        Ok(self.lock_world()?.last_tx_id())
    }

    fn lock_world(&self) -> Result<MutexGuard<'_, WorldState>, StateError> {
        self.world
            .lock()
            .map_err(|_| StateError::logic("world state lock poisoned"))
    }

    fn publish(&self, event: ChaincodeEvent) {
        let mut subs = match self.subscribers.lock() {
            Ok(subs) => subs,
            Err(_) => {
                tracing::warn!(event = %event.name, "subscriber list lock poisoned, event dropped");
                return;
            }
        };

        subs.retain(|sub| match sub.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(event = %event.name, "subscriber channel full, dropping");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}
