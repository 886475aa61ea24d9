//! Error types for the dialog layer.

use crate::store::StoreError;
use keyfold_session::SessionError;
use keyfold_types::{ItemId, VaultId};
use thiserror::Error;

/// Result type for dialog operations.
pub type DialogResult<T> = Result<T, DialogError>;

/// Errors that can occur in the dialog orchestrators.
///
/// Capability and structural errors (`Forbidden`, `TooLarge`, `Blocked`,
/// `InvalidPayload`) are resolved to user-facing warnings or silent
/// refusals at the orchestrator boundary; store failures propagate as
/// `CommitFailed` with the draft left intact.
#[derive(Debug, Error)]
pub enum DialogError {
    /// The acting account lacks the required capability.
    #[error("operation forbidden")]
    Forbidden,

    /// Attachment exceeds the size ceiling. Reported before any upload
    /// surface is opened.
    #[error("file of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    /// Structurally disallowed operation, e.g. moving an item that
    /// carries attachments.
    #[error("operation blocked: {0}")]
    Blocked(String),

    /// A captured payload failed to parse. The capture flow re-offers
    /// itself after reporting this.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The entity store rejected an update. The edit session stays in
    /// `Editing` with its draft intact so the caller can retry.
    #[error("commit failed: {0}")]
    CommitFailed(#[from] StoreError),

    /// The item is gone (deleted concurrently, or never existed).
    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    /// The vault is gone.
    #[error("vault {0} not found")]
    VaultNotFound(VaultId),

    /// A session state machine refused the operation.
    #[error(transparent)]
    Session(#[from] SessionError),
}
