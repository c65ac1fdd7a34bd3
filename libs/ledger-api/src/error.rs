use std::fmt;

/// Error kind for ledger state errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O failure in the backing journal.
    Io,
    /// Persisted data could not be parsed.
    Corrupt,
    /// Iterator used after close.
    Closed,
    /// Invalid state (poisoned lock, bad range, generic).
    Logic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Io => f.write_str("io"),
            ErrorKind::Corrupt => f.write_str("corrupt"),
            ErrorKind::Closed => f.write_str("closed"),
            ErrorKind::Logic => f.write_str("logic"),
        }
    }
}

/// Error returned by every `LedgerState` / `Journal` method.
///
/// Any `StateError` is a storage fault from the contract's point of view:
/// absence of a key is never an error at this layer (`get_state` returns `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateError {
    pub kind: ErrorKind,
    pub message: String,
}

impl StateError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Io, message: msg.into() }
    }

    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Corrupt, message: msg.into() }
    }

    pub fn closed(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Closed, message: msg.into() }
    }

    pub fn logic(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Logic, message: msg.into() }
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for StateError {}

// ---------------------------------------------------------------------------
// From impls: standard error types → StateError with correct ErrorKind
// ---------------------------------------------------------------------------

impl From<std::io::Error> for StateError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}

impl From<serde_json::Error> for StateError {
    fn from(e: serde_json::Error) -> Self {
        Self::corrupt(e.to_string())
    }
}
