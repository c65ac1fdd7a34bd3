//! Append-only JSONL journal: one committed block per line.

mod config;
mod journal;

pub use config::FileJournalConfig;
pub use journal::FileJournal;
