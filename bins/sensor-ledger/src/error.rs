use ledger_api::StateError;
use ledger_engine::EngineError;
use sensor_contract::ContractError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("ledger error: {0}")]
    State(#[from] StateError),

    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),
}
