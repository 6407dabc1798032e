use engine::EngineError;
use thiserror::Error;

/// Failure handed to the error callback of a mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    #[error("Unauthenticated: no identity resolved")]
    Unauthenticated,
    /// The store rejected the operation. The message is the store's own.
    #[error("Remote failure: {0}")]
    Remote(String),
}

impl From<EngineError> for Failure {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Unauthenticated => Self::Unauthenticated,
            other => Self::Remote(other.to_string()),
        }
    }
}
