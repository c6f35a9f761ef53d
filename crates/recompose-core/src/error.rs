use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("no drawable registered under id {0}")]
    ResourceNotFound(u32),

    #[error("no scheduler installed on this thread; create a Scheduler before launching tasks")]
    NoScheduler,

    #[error("nothing matches {0}")]
    NotFound(String),
}

pub type Result<T, E = ComposeError> = std::result::Result<T, E>;
