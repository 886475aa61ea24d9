//! Permission reconciliation.
//!
//! Compares a member's in-progress permission toggles against their
//! committed permission set and gates the approve/reject workflow: an
//! existing member can only be approved when something actually changed,
//! and nobody edits their own permissions through this path.

use crate::error::{SessionError, SessionResult};
use keyfold_types::Permissions;

/// True iff any of the three permission bits differ.
pub fn has_changes(committed: &Permissions, draft: &Permissions) -> bool {
    committed.differs_from(draft)
}

/// Validates a permission commit before it is sent to the store.
///
/// Refused when the acting operator lacks manage rights on the vault, or
/// when the target member is the operator themself.
pub fn validate_commit(
    _committed: &Permissions,
    _draft: &Permissions,
    is_self: bool,
    can_manage: bool,
) -> SessionResult<()> {
    if !can_manage || is_self {
        return Err(SessionError::Forbidden);
    }
    Ok(())
}

/// Whether the approve action is offered to the operator: always for a
/// not-yet-committed member, otherwise only when the draft differs. A
/// commit in flight disables it.
pub fn approve_enabled(is_existing_member: bool, changed: bool, busy: bool) -> bool {
    !busy && (!is_existing_member || changed)
}

/// Reject/cancel is always available unless a commit is in flight.
pub fn reject_enabled(busy: bool) -> bool {
    !busy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_detected_per_bit() {
        let committed = Permissions::READ_ONLY;
        assert!(!has_changes(&committed, &Permissions::READ_ONLY));

        for draft in [
            Permissions { read: false, ..committed },
            Permissions { write: true, ..committed },
            Permissions { manage: true, ..committed },
        ] {
            assert!(has_changes(&committed, &draft));
        }
    }

    #[test]
    fn approve_gating_truth_table() {
        // New member: always approvable when idle.
        assert!(approve_enabled(false, false, false));
        assert!(approve_enabled(false, true, false));
        // Existing member: only with changes.
        assert!(!approve_enabled(true, false, false));
        assert!(approve_enabled(true, true, false));
        // Busy disables everything.
        assert!(!approve_enabled(false, true, true));
        assert!(!approve_enabled(true, true, true));
        assert!(reject_enabled(false));
        assert!(!reject_enabled(true));
    }

    #[test]
    fn self_and_non_manager_commits_refused() {
        let committed = Permissions::READ_ONLY;
        let draft = Permissions::ALL;
        assert!(validate_commit(&committed, &draft, false, true).is_ok());
        assert!(validate_commit(&committed, &draft, true, true).is_err());
        assert!(validate_commit(&committed, &draft, false, false).is_err());
        assert!(validate_commit(&committed, &draft, true, false).is_err());
    }
}
