//! Dialog orchestrators for Keyfold.
//!
//! Two workflows live here, composed from the pure state machines in
//! `keyfold-session` and the collaborator contracts in this crate:
//!
//! - [`ItemEditor`]: the item dialog — entering/leaving edit mode, field
//!   CRUD with deferred persistence, attachments, move, delete, favorite,
//!   secret generation and QR capture
//! - [`MemberApproval`]: the member dialog — approving or rejecting a
//!   member's permission set
//!
//! All I/O goes through the traits in [`store`] and [`surfaces`];
//! orchestrators receive their collaborators explicitly at construction
//! instead of reaching into global application state.

mod error;
mod item_editor;
mod member_approval;
pub mod store;
pub mod surfaces;

pub use error::{DialogError, DialogResult};
pub use item_editor::{
    CaptureOutcome, EditorConfig, EditorContext, FileUpload, ItemDialogOutcome, ItemEditor,
};
pub use member_approval::{
    ApprovalContext, ApprovalOutcome, ApprovalState, MemberApproval, PermissionKind,
};
pub use store::{CapabilityCheck, EntityStore, StoreError};
pub use surfaces::{
    AlertLevel, AlertRequest, AttachmentPreview, CodeCapture, ConfirmRequest, MoveCandidate,
    MoveTargetPicker, MovedItem, Prompter, SecretGenerator, UploadRequest, UploadSurface,
};
