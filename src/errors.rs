//! Typed error hierarchy for the taskboard server.
//!
//! - `SyncError`: sync hub failures (store lock, serialization, mutations)
//! - `ServerError`: server bootstrap failures

use taskboard_common::BoardError;
use thiserror::Error;

/// Errors from the sync hub.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Board store lock poisoned")]
    LockPoisoned,

    #[error("Failed to serialize board update: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Errors while starting or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid CORS origin '{origin}'")]
    InvalidOrigin { origin: String },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_error_converts_from_board_error() {
        let err: SyncError = BoardError::TaskNotFound { id: "t1".into() }.into();
        match &err {
            SyncError::Board(BoardError::TaskNotFound { id }) => assert_eq!(id, "t1"),
            _ => panic!("Expected SyncError::Board(TaskNotFound)"),
        }
        assert_eq!(err.to_string(), "Task t1 not found");
    }

    #[test]
    fn sync_error_lock_poisoned_is_matchable() {
        let err = SyncError::LockPoisoned;
        assert!(matches!(err, SyncError::LockPoisoned));
    }

    #[test]
    fn server_error_bind_carries_addr() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use");
        let err = ServerError::Bind {
            addr: "127.0.0.1:3001".into(),
            source: io_err,
        };
        assert!(err.to_string().contains("127.0.0.1:3001"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&SyncError::LockPoisoned);
        assert_std_error(&ServerError::InvalidOrigin {
            origin: "bad".into(),
        });
    }
}
