use thiserror::Error;
use tvc_refs::RefError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    #[error("remote already exists: {0}")]
    RemoteExists(String),

    #[error("remote {0} is busy with another sync operation")]
    RemoteBusy(String),

    #[error("not a fast-forward update for {remote}/{branch}")]
    NonFastForward { remote: String, branch: String },

    #[error("ref update rejected for {remote}/{branch}: {reason}")]
    Rejected {
        remote: String,
        branch: String,
        reason: String,
    },

    #[error(transparent)]
    InvalidName(#[from] RefError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote table lock poisoned")]
    Poisoned,
}

pub type SyncResult<T> = Result<T, SyncError>;
