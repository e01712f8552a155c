use argus_core::errors::BackendError;
use argus_llm::ContractError;
use argus_synthesis::suppress::SuppressError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("contract error: {0}")]
    Contract(#[from] ContractError),

    #[error("suppression error: {0}")]
    Suppression(#[from] SuppressError),

    #[error("task join failed: {0}")]
    Join(String),
}
