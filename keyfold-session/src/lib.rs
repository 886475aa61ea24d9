//! Edit-session state machines for Keyfold.
//!
//! Everything in this crate is a pure state machine — it produces and
//! consumes values, never performs I/O. The dialog orchestrators in
//! `keyfold-dialogs` own all store and surface interaction.
//!
//! # Components
//!
//! - **Field buffer / draft buffer**: the editable working copy of an item,
//!   strictly separate from the committed snapshot until commit
//! - **Edit session**: the `Viewing → Editing → Saving` state machine that
//!   owns the draft buffer and gates every mutation on it
//! - **Modal stack**: suspend/resume bookkeeping for nested dialog
//!   surfaces, enforcing that exactly one surface is visible at a time
//! - **Permission reconciler**: draft-vs-committed permission diffing that
//!   gates the member approval workflow

mod buffer;
mod error;
mod modal;
mod reconciler;
mod session;

pub use buffer::{DraftBuffer, FieldBuffer};
pub use error::{SessionError, SessionResult};
pub use modal::{ModalStack, PendingClose, SurfaceId, SurfaceKind};
pub use reconciler::{approve_enabled, has_changes, reject_enabled, validate_commit};
pub use session::{CommitTicket, EditSession, EditState};
