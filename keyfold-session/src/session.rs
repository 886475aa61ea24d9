//! The edit-session state machine.
//!
//! One [`EditSession`] guards one entity's draft-vs-committed separation.
//! The session is a pure state machine: `begin_commit` hands the caller the
//! update request and a ticket, the caller performs the store I/O, and
//! `finish_commit` applies the outcome. A session epoch guards against
//! async completions landing in a draft that has since been discarded or
//! replaced.

use crate::buffer::DraftBuffer;
use crate::error::{SessionError, SessionResult};
use keyfold_types::{ItemPatch, VaultItem};
use tracing::debug;

/// Where the session is in its lifecycle.
///
/// The draft buffer exists iff the state is `Editing` or `Saving`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Viewing,
    Editing,
    Saving,
}

/// Ticket handed out by [`EditSession::begin_commit`]. Carries the update
/// request for the store and pins the session epoch so a completion that
/// outlives its session is dropped instead of applied.
#[derive(Debug)]
pub struct CommitTicket {
    epoch: u64,
    patch: ItemPatch,
}

impl CommitTicket {
    /// The update request to send to the entity store.
    pub fn patch(&self) -> &ItemPatch {
        &self.patch
    }

    /// Consumes the ticket, yielding the update request.
    pub fn into_patch(self) -> ItemPatch {
        self.patch
    }
}

/// The editing/not-editing state machine for one entity.
#[derive(Debug, Default)]
pub struct EditSession {
    state: EditState,
    draft: Option<DraftBuffer>,
    epoch: u64,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        self.state == EditState::Editing
    }

    pub fn is_saving(&self) -> bool {
        self.state == EditState::Saving
    }

    /// The current session epoch. Capture this before suspending for a
    /// child surface and pass it to [`apply_if_current`] afterwards.
    ///
    /// [`apply_if_current`]: EditSession::apply_if_current
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// `Viewing → Editing`: seeds the draft as a deep copy of the committed
    /// snapshot. A second call while already `Editing` is a no-op; while a
    /// commit is in flight the transition is refused.
    pub fn begin_edit(&mut self, snapshot: &VaultItem) -> SessionResult<()> {
        match self.state {
            EditState::Saving => Err(SessionError::CommitInFlight),
            EditState::Editing => Ok(()),
            EditState::Viewing => {
                self.draft = Some(DraftBuffer::seeded_from(snapshot));
                self.state = EditState::Editing;
                self.epoch += 1;
                debug!(epoch = self.epoch, "edit session started");
                Ok(())
            }
        }
    }

    /// `Editing → Viewing`: discards the draft. The view re-reads the
    /// committed snapshot, which may have changed concurrently.
    pub fn cancel_edit(&mut self) -> SessionResult<()> {
        match self.state {
            EditState::Saving => Err(SessionError::CommitInFlight),
            EditState::Viewing => Ok(()),
            EditState::Editing => {
                self.draft = None;
                self.state = EditState::Viewing;
                self.epoch += 1;
                debug!(epoch = self.epoch, "edit session cancelled");
                Ok(())
            }
        }
    }

    /// `Editing → Saving`: freezes the draft into a single update request.
    /// The caller performs the store I/O and reports back through
    /// [`finish_commit`](EditSession::finish_commit).
    pub fn begin_commit(&mut self) -> SessionResult<CommitTicket> {
        match self.state {
            EditState::Saving => Err(SessionError::CommitInFlight),
            EditState::Viewing => Err(SessionError::NotEditing),
            EditState::Editing => {
                let draft = self.draft.as_ref().ok_or(SessionError::NotEditing)?;
                let patch = ItemPatch {
                    name: Some(draft.name.clone()),
                    fields: Some(draft.fields.fields().to_vec()),
                    tags: Some(draft.tags()),
                    favorite: None,
                };
                self.state = EditState::Saving;
                Ok(CommitTicket {
                    epoch: self.epoch,
                    patch,
                })
            }
        }
    }

    /// Applies a commit outcome. On success the draft is discarded and the
    /// session returns to `Viewing`; on failure it returns to `Editing`
    /// with the draft intact so nothing is lost. A ticket whose epoch no
    /// longer matches is stale — its outcome must not be applied.
    pub fn finish_commit(&mut self, ticket: CommitTicket, succeeded: bool) -> SessionResult<()> {
        if ticket.epoch != self.epoch {
            return Err(SessionError::StaleEpoch {
                got: ticket.epoch,
                current: self.epoch,
            });
        }
        if self.state != EditState::Saving {
            return Err(SessionError::NotEditing);
        }
        if succeeded {
            self.draft = None;
            self.state = EditState::Viewing;
            self.epoch += 1;
            debug!(epoch = self.epoch, "commit applied");
        } else {
            self.state = EditState::Editing;
            debug!(epoch = self.epoch, "commit failed, draft retained");
        }
        Ok(())
    }

    /// The draft, while one exists (`Editing` or `Saving`).
    pub fn draft(&self) -> Option<&DraftBuffer> {
        self.draft.as_ref()
    }

    /// Mutable draft access; only valid while `Editing`.
    pub fn draft_mut(&mut self) -> SessionResult<&mut DraftBuffer> {
        if self.state != EditState::Editing {
            return Err(SessionError::NotEditing);
        }
        self.draft.as_mut().ok_or(SessionError::NotEditing)
    }

    /// Applies a draft mutation only if the session is still `Editing` and
    /// still in the given epoch. Used for results of child surfaces that
    /// may resolve after the parent edit was cancelled or replaced.
    pub fn apply_if_current<T>(
        &mut self,
        epoch: u64,
        f: impl FnOnce(&mut DraftBuffer) -> SessionResult<T>,
    ) -> SessionResult<T> {
        if epoch != self.epoch {
            debug!(got = epoch, current = self.epoch, "dropping stale draft mutation");
            return Err(SessionError::StaleEpoch {
                got: epoch,
                current: self.epoch,
            });
        }
        f(self.draft_mut()?)
    }
}
