//! Vaults, members and permission sets.

use crate::{MemberId, VaultId};
use serde::{Deserialize, Serialize};

/// Per-member access rights within a vault.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
    pub manage: bool,
}

impl Permissions {
    /// No access at all.
    pub const NONE: Self = Self {
        read: false,
        write: false,
        manage: false,
    };

    /// Read-only access.
    pub const READ_ONLY: Self = Self {
        read: true,
        write: false,
        manage: false,
    };

    /// Full access, including member management.
    pub const ALL: Self = Self {
        read: true,
        write: true,
        manage: true,
    };

    /// Whether any of the three bits differ from `other`.
    pub fn differs_from(&self, other: &Self) -> bool {
        self != other
    }
}

/// Whether a member has been committed to the vault or is still a pending
/// invite. Rejecting a pending invite needs no confirmation — nothing has
/// been committed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Invited,
    Active,
}

/// A member of a vault, with identity metadata and their committed
/// permission set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultMember {
    pub id: MemberId,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub status: MemberStatus,
    pub permissions: Permissions,
}

impl VaultMember {
    pub fn invited(email: impl Into<String>) -> Self {
        Self {
            id: MemberId::new(),
            email: email.into(),
            name: String::new(),
            status: MemberStatus::Invited,
            permissions: Permissions::READ_ONLY,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// A vault: the container items and members live in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vault {
    pub id: VaultId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<VaultMember>,
}

impl Vault {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: VaultId::new(),
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Looks up a member by ID.
    pub fn get_member(&self, id: &MemberId) -> Option<&VaultMember> {
        self.members.iter().find(|m| m.id == *id)
    }

    /// Whether the given member has been committed to this vault.
    pub fn is_member(&self, id: &MemberId) -> bool {
        self.get_member(id).is_some_and(VaultMember::is_active)
    }
}
