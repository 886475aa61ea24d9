//! The member dialog orchestrator.
//!
//! Approving commits the drafted permission set to the vault (adding the
//! member if they were only invited so far); rejecting removes an existing
//! member after confirmation, or simply discards a pending invite. Both
//! actions are guarded against double invocation while a commit is in
//! flight.

use crate::error::{DialogError, DialogResult};
use crate::store::{CapabilityCheck, EntityStore};
use crate::surfaces::{ConfirmRequest, Prompter};
use keyfold_session::{
    approve_enabled, has_changes, reject_enabled, validate_commit, ModalStack, PendingClose,
    SurfaceId, SurfaceKind,
};
use keyfold_types::{MemberId, MemberStatus, Permissions, Vault, VaultId, VaultMember};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the approval workflow is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApprovalState {
    #[default]
    Idle,
    /// Waiting on the reject confirmation prompt.
    Confirming,
    /// A commit (approve or remove) is in flight.
    Committing,
}

/// How the member dialog ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The permission set was committed (member added or updated).
    Updated,
    /// The member was removed from the vault.
    Removed,
    /// Dismissed, or a pending invite was discarded.
    Dismissed,
}

/// One of the three permission toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionKind {
    Read,
    Write,
    Manage,
}

/// The collaborators the member dialog needs.
#[derive(Clone)]
pub struct ApprovalContext {
    pub store: Arc<dyn EntityStore>,
    pub capabilities: Arc<dyn CapabilityCheck>,
    pub prompter: Arc<dyn Prompter>,
}

/// Orchestrator for one open member dialog.
pub struct MemberApproval {
    vault_id: VaultId,
    member: VaultMember,
    draft: Permissions,
    state: ApprovalState,
    actor: MemberId,
    ctx: ApprovalContext,
    modals: Arc<ModalStack>,
    surface: SurfaceId,
}

impl MemberApproval {
    /// Opens the member dialog, seeding the permission draft from the
    /// member's committed permission set.
    pub fn open(
        ctx: ApprovalContext,
        modals: Arc<ModalStack>,
        vault_id: VaultId,
        member: VaultMember,
        actor: MemberId,
    ) -> DialogResult<(Self, PendingClose<ApprovalOutcome>)> {
        ctx.store
            .get_vault(&vault_id)
            .ok_or(DialogError::VaultNotFound(vault_id))?;

        let (surface, pending) = modals.open::<ApprovalOutcome>(SurfaceKind::MemberDialog);
        debug!(member = %member.id, %vault_id, "member dialog opened");
        let draft = member.permissions;
        Ok((
            Self {
                vault_id,
                member,
                draft,
                state: ApprovalState::Idle,
                actor,
                ctx,
                modals,
                surface,
            },
            pending,
        ))
    }

    pub fn state(&self) -> ApprovalState {
        self.state
    }

    pub fn draft(&self) -> Permissions {
        self.draft
    }

    /// Flips one permission toggle in the draft.
    pub fn set_permission(&mut self, kind: PermissionKind, value: bool) {
        match kind {
            PermissionKind::Read => self.draft.read = value,
            PermissionKind::Write => self.draft.write = value,
            PermissionKind::Manage => self.draft.manage = value,
        }
    }

    /// Whether the draft differs from the committed permission set.
    pub fn has_changes(&self) -> bool {
        has_changes(&self.member.permissions, &self.draft)
    }

    /// Whether the permission toggles accept input: not while a commit is
    /// in flight, never for the operator's own entry, and only for
    /// operators with manage rights.
    pub fn controls_enabled(&self) -> DialogResult<bool> {
        let vault = self.vault()?;
        Ok(self.state == ApprovalState::Idle
            && self.actor != self.member.id
            && self.ctx.capabilities.has_manage_permission(&vault))
    }

    /// Whether approve is offered: always for a not-yet-committed member,
    /// otherwise only when the draft changed something.
    pub fn approve_enabled(&self) -> DialogResult<bool> {
        let busy = self.state != ApprovalState::Idle;
        Ok(self.controls_enabled()?
            && approve_enabled(self.is_existing_member()?, self.has_changes(), busy))
    }

    /// Reject/cancel is always offered unless a commit is in flight.
    pub fn reject_enabled(&self) -> DialogResult<bool> {
        Ok(self.controls_enabled()? && reject_enabled(self.state != ApprovalState::Idle))
    }

    /// Commits the drafted permission set. Returns `false` when the call
    /// was ignored (a commit already in flight).
    pub async fn approve(&mut self) -> DialogResult<bool> {
        if self.state != ApprovalState::Idle {
            debug!(member = %self.member.id, "approve ignored, commit in flight");
            return Ok(false);
        }

        let vault = self.vault()?;
        let is_self = self.actor == self.member.id;
        let can_manage = self.ctx.capabilities.has_manage_permission(&vault);
        validate_commit(&self.member.permissions, &self.draft, is_self, can_manage)
            .map_err(|_| DialogError::Forbidden)?;

        self.state = ApprovalState::Committing;
        let mut updated = self.member.clone();
        updated.permissions = self.draft;
        updated.status = MemberStatus::Active;

        match self.ctx.store.update_member(&self.vault_id, updated).await {
            Ok(()) => {
                self.state = ApprovalState::Idle;
                info!(member = %self.member.id, %self.vault_id, "member approved");
                self.finish(ApprovalOutcome::Updated)?;
                Ok(true)
            }
            Err(err) => {
                // The draft toggles survive; the operator can retry.
                self.state = ApprovalState::Idle;
                warn!(member = %self.member.id, %err, "member approval failed");
                Err(err.into())
            }
        }
    }

    /// Rejects the member. An existing member is removed after explicit
    /// confirmation; a never-committed invite is discarded without one.
    /// Returns `false` when the call was ignored or the operator declined
    /// the confirmation.
    pub async fn reject(&mut self) -> DialogResult<bool> {
        if self.state != ApprovalState::Idle {
            debug!(member = %self.member.id, "reject ignored, commit in flight");
            return Ok(false);
        }

        if !self.is_existing_member()? {
            debug!(member = %self.member.id, "pending invite discarded");
            self.finish(ApprovalOutcome::Dismissed)?;
            return Ok(true);
        }

        self.state = ApprovalState::Confirming;
        let confirmed = self
            .confirm(ConfirmRequest::destructive(
                "Are you sure you want to remove this user from this vault?",
                "Remove",
            ))
            .await;
        if !confirmed {
            self.state = ApprovalState::Idle;
            return Ok(false);
        }

        self.state = ApprovalState::Committing;
        match self
            .ctx
            .store
            .remove_member(&self.vault_id, &self.member.id)
            .await
        {
            Ok(()) => {
                self.state = ApprovalState::Idle;
                info!(member = %self.member.id, %self.vault_id, "member removed");
                self.finish(ApprovalOutcome::Removed)?;
                Ok(true)
            }
            Err(err) => {
                self.state = ApprovalState::Idle;
                warn!(member = %self.member.id, %err, "member removal failed");
                Err(err.into())
            }
        }
    }

    /// Dismisses the dialog, discarding the draft toggles.
    pub fn close(&mut self) -> DialogResult<()> {
        self.finish(ApprovalOutcome::Dismissed)
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn vault(&self) -> DialogResult<Vault> {
        self.ctx
            .store
            .get_vault(&self.vault_id)
            .ok_or(DialogError::VaultNotFound(self.vault_id))
    }

    fn is_existing_member(&self) -> DialogResult<bool> {
        Ok(self.vault()?.is_member(&self.member.id))
    }

    fn finish(&mut self, outcome: ApprovalOutcome) -> DialogResult<()> {
        self.modals
            .close(self.surface, Some(outcome))
            .map_err(DialogError::from)
    }

    async fn confirm(&self, request: ConfirmRequest) -> bool {
        let prompter = self.ctx.prompter.clone();
        self.modals
            .run_child(SurfaceKind::Confirm, async move {
                Some(prompter.confirm(request).await)
            })
            .await
            .unwrap_or(false)
    }
}
