//! Error types for the session layer.

use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur in session state machines.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A draft mutation was attempted outside of `Editing`.
    #[error("session is not in editing state")]
    NotEditing,

    /// The acting operator lacks the capability for this operation.
    #[error("operation forbidden")]
    Forbidden,

    /// A state transition was attempted while a commit is in flight.
    /// The commit must complete (success or failure) first.
    #[error("commit in flight")]
    CommitInFlight,

    /// A field index was out of range. This is a programming error in the
    /// caller and should never reach the user.
    #[error("field index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// An async completion arrived for a session generation that has since
    /// been cancelled or replaced. The result must be dropped.
    #[error("stale session epoch {got}, current is {current}")]
    StaleEpoch { got: u64, current: u64 },

    /// The referenced surface is not on the modal stack.
    #[error("surface {0} not found on modal stack")]
    SurfaceNotFound(u64),

    /// A surface was closed with a result of the wrong type.
    #[error("surface {0} closed with mismatched result type")]
    ResultTypeMismatch(u64),
}
