use ledger_api::StateError;

/// Category of a [`ContractError`], for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractErrorKind {
    NotFound,
    Decode,
    InvalidInput,
    StorageFault,
    Config,
}

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("asset with id: {0} does not exist")]
    NotFound(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage fault: {0}")]
    StorageFault(#[from] StateError),

    #[error("config error: {0}")]
    Config(String),
}

impl ContractError {
    pub fn kind(&self) -> ContractErrorKind {
        match self {
            ContractError::NotFound(_) => ContractErrorKind::NotFound,
            ContractError::Decode(_) => ContractErrorKind::Decode,
            ContractError::InvalidInput(_) => ContractErrorKind::InvalidInput,
            ContractError::StorageFault(_) => ContractErrorKind::StorageFault,
            ContractError::Config(_) => ContractErrorKind::Config,
        }
    }

    /// Add context to the error.
    ///
    /// For `StorageFault`, context is added to the inner `StateError`.
    /// `NotFound` keeps its key untouched.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            ContractError::StorageFault(e) => ContractError::StorageFault(e.with_context(ctx)),
            ContractError::Decode(msg) => ContractError::Decode(format!("{ctx}: {msg}")),
            ContractError::InvalidInput(msg) => ContractError::InvalidInput(format!("{ctx}: {msg}")),
            ContractError::Config(msg) => ContractError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
