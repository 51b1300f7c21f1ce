use folio_persist::PersistError;
use folio_types::ThreadId;
use thiserror::Error;

use crate::lifecycle::LifecycleError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("A response is still streaming on thread {0}")]
    SendInFlight(ThreadId),

    #[error("Waiting for the pending thread to be saved before switching")]
    SwitchInProgress,

    #[error("Switch superseded by a later request")]
    SwitchSuperseded,

    #[error("Thread {0} no longer exists")]
    ThreadGone(ThreadId),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Session engine stopped")]
    EngineStopped,
}

pub type Result<T> = std::result::Result<T, SessionError>;
