//! Member dialog workflow tests against mock collaborators.

use keyfold_dialogs::store::mock::{FixedCapabilities, MemoryStore, StoreCall};
use keyfold_dialogs::surfaces::mock::ScriptedPrompter;
use keyfold_dialogs::{
    ApprovalContext, ApprovalOutcome, ApprovalState, DialogError, EntityStore, MemberApproval,
    PermissionKind,
};
use keyfold_session::{ModalStack, PendingClose};
use keyfold_types::{
    MemberId, MemberStatus, Permissions, Vault, VaultId, VaultMember,
};
use std::sync::Arc;

struct Fixture {
    store: Arc<MemoryStore>,
    capabilities: Arc<FixedCapabilities>,
    prompter: Arc<ScriptedPrompter>,
    modals: Arc<ModalStack>,
    vault_id: VaultId,
    member: VaultMember,
    actor: MemberId,
}

impl Fixture {
    /// A vault holding one active read-only member; the acting operator
    /// is a different account with manage rights.
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let mut vault = Vault::new("team");
        let vault_id = vault.id;

        let mut member = VaultMember::invited("bob@example.com");
        member.status = MemberStatus::Active;
        vault.members.push(member.clone());
        store.put_vault(vault);

        Self {
            store,
            capabilities: Arc::new(FixedCapabilities::all()),
            prompter: Arc::new(ScriptedPrompter::new()),
            modals: Arc::new(ModalStack::new()),
            vault_id,
            member,
            actor: MemberId::new(),
        }
    }

    /// Same fixture, but the member is a never-committed invite.
    fn with_pending_invite() -> Self {
        let mut fx = Self::new();
        let invite = VaultMember::invited("carol@example.com");
        fx.member = invite;
        fx
    }

    fn open(&self) -> (MemberApproval, PendingClose<ApprovalOutcome>) {
        let ctx = ApprovalContext {
            store: self.store.clone(),
            capabilities: self.capabilities.clone(),
            prompter: self.prompter.clone(),
        };
        MemberApproval::open(
            ctx,
            self.modals.clone(),
            self.vault_id,
            self.member.clone(),
            self.actor,
        )
        .unwrap()
    }
}

// ── Gating ───────────────────────────────────────────────────────

#[tokio::test]
async fn approve_disabled_until_permissions_change() {
    let fx = Fixture::new();
    let (mut approval, _pending) = fx.open();

    assert!(!approval.has_changes());
    assert!(!approval.approve_enabled().unwrap());
    assert!(approval.reject_enabled().unwrap());

    approval.set_permission(PermissionKind::Write, true);
    assert!(approval.has_changes());
    assert!(approval.approve_enabled().unwrap());

    // Toggling back restores the disabled state.
    approval.set_permission(PermissionKind::Write, false);
    assert!(!approval.approve_enabled().unwrap());
}

#[tokio::test]
async fn new_members_are_approvable_without_changes() {
    let fx = Fixture::with_pending_invite();
    let (approval, _pending) = fx.open();

    assert!(!approval.has_changes());
    assert!(approval.approve_enabled().unwrap());
}

#[tokio::test]
async fn controls_disabled_for_own_account_and_non_managers() {
    let mut fx = Fixture::new();
    fx.actor = fx.member.id;
    let (approval, _pending) = fx.open();
    assert!(!approval.controls_enabled().unwrap());

    let mut fx = Fixture::new();
    fx.capabilities = Arc::new(FixedCapabilities::read_only());
    let (approval, _pending) = fx.open();
    assert!(!approval.controls_enabled().unwrap());
}

// ── Approve ──────────────────────────────────────────────────────

#[tokio::test]
async fn approve_commits_the_drafted_permission_set() {
    let fx = Fixture::new();
    let (mut approval, pending) = fx.open();

    approval.set_permission(PermissionKind::Write, true);
    assert!(approval.approve().await.unwrap());

    let calls = fx.store.calls();
    let StoreCall::UpdateMember(vault, committed) = &calls[0] else {
        panic!("expected a member update, got {calls:?}");
    };
    assert_eq!(*vault, fx.vault_id);
    assert_eq!(
        committed.permissions,
        Permissions {
            read: true,
            write: true,
            manage: false,
        }
    );
    assert_eq!(pending.wait().await, Some(ApprovalOutcome::Updated));
    assert_eq!(fx.modals.depth(), 0);
}

#[tokio::test]
async fn approving_an_invite_activates_the_member() {
    let fx = Fixture::with_pending_invite();
    let (mut approval, pending) = fx.open();

    assert!(approval.approve().await.unwrap());
    let vault = fx.store.get_vault(&fx.vault_id).unwrap();
    assert!(vault.is_member(&fx.member.id));
    assert_eq!(pending.wait().await, Some(ApprovalOutcome::Updated));
}

#[tokio::test]
async fn approve_forbidden_for_self_or_without_manage_rights() {
    let mut fx = Fixture::new();
    fx.actor = fx.member.id;
    let (mut approval, _pending) = fx.open();
    approval.set_permission(PermissionKind::Write, true);
    assert!(matches!(
        approval.approve().await.unwrap_err(),
        DialogError::Forbidden
    ));

    let mut fx = Fixture::new();
    fx.capabilities = Arc::new(FixedCapabilities::read_only());
    let (mut approval, _pending) = fx.open();
    approval.set_permission(PermissionKind::Write, true);
    assert!(matches!(
        approval.approve().await.unwrap_err(),
        DialogError::Forbidden
    ));
    assert!(fx.store.calls().is_empty());
}

#[tokio::test]
async fn failed_approve_keeps_the_draft_for_retry() {
    let fx = Fixture::new();
    let (mut approval, _pending) = fx.open();

    approval.set_permission(PermissionKind::Manage, true);
    fx.store.fail_next();
    assert!(matches!(
        approval.approve().await.unwrap_err(),
        DialogError::CommitFailed(_)
    ));

    // Draft toggles survived the failure; retry succeeds.
    assert_eq!(approval.state(), ApprovalState::Idle);
    assert!(approval.draft().manage);
    assert!(approval.approve().await.unwrap());
}

// ── Reject ───────────────────────────────────────────────────────

#[tokio::test]
async fn rejecting_an_existing_member_requires_confirmation() {
    let fx = Fixture::new();
    let (mut approval, _pending) = fx.open();

    // Declined: the member stays.
    fx.prompter.push_confirm(false);
    assert!(!approval.reject().await.unwrap());
    assert_eq!(approval.state(), ApprovalState::Idle);
    assert!(fx.store.calls().is_empty());

    // Confirmed: the member is removed.
    fx.prompter.push_confirm(true);
    assert!(approval.reject().await.unwrap());
    assert_eq!(
        fx.store.calls(),
        vec![StoreCall::RemoveMember(fx.vault_id, fx.member.id)]
    );
}

#[tokio::test]
async fn rejecting_a_pending_invite_skips_confirmation() {
    let fx = Fixture::with_pending_invite();
    let (mut approval, pending) = fx.open();

    assert!(approval.reject().await.unwrap());
    // No prompt was ever shown, nothing was committed to remove.
    assert!(fx.prompter.confirmed.lock().unwrap().is_empty());
    assert!(fx.store.calls().is_empty());
    assert_eq!(pending.wait().await, Some(ApprovalOutcome::Dismissed));
}

#[tokio::test]
async fn confirmed_reject_closes_with_removed_outcome() {
    let fx = Fixture::new();
    let (mut approval, pending) = fx.open();

    fx.prompter.push_confirm(true);
    assert!(approval.reject().await.unwrap());
    assert_eq!(pending.wait().await, Some(ApprovalOutcome::Removed));
    assert_eq!(fx.modals.depth(), 0);
}
