use roadside_core::DispatchError;
use thiserror::Error;

use crate::types::{RequestAction, RequestStatus};

/// Errors returned by the dispatch repository.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite failure, including rows that fail to decode.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database directory could not be created.
    #[error("failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),

    /// No row with this id, or the row is not visible to the caller.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record that was looked up.
        entity: &'static str,
        /// Identifier that was looked up.
        id: i64,
    },

    /// The request is not in a state that allows this action.
    #[error("cannot {action} request {id} while it is {status}")]
    InvalidTransition {
        id: i64,
        status: RequestStatus,
        action: RequestAction,
    },

    /// The mechanic still holds an assigned or in-progress request and
    /// cannot be made available.
    #[error("mechanic {id} is busy with request {request_id}")]
    MechanicBusy { id: i64, request_id: i64 },

    /// A stored status string did not name a known status.
    #[error("unknown request status: {0:?}")]
    UnknownStatus(String),

    /// A domain value failed to parse or validate.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, StoreError>;
