//! Entity store and capability contracts.
//!
//! The orchestrators never mutate a committed snapshot directly — every
//! change goes through the store's single update entry point per entity.
//! The store is the boundary to the encrypted persistence/sync client;
//! its wire and file formats are none of the core's business.

use async_trait::async_trait;
use keyfold_types::{
    AttachmentId, ItemId, ItemPatch, MemberId, Vault, VaultId, VaultItem, VaultMember,
};
use thiserror::Error;

/// Opaque store-level failure, surfaced to the user as a failed commit.
#[derive(Debug, Clone, Error)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

/// The committed-state store the dialogs run against.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Resolves an item reference to its committed snapshot and vault.
    fn get_item(&self, id: &ItemId) -> Option<(VaultItem, Vault)>;

    /// Resolves a vault reference.
    fn get_vault(&self, id: &VaultId) -> Option<Vault>;

    /// Applies a patch to an item as a single update request.
    async fn update_item(
        &self,
        vault: &VaultId,
        item: &ItemId,
        patch: ItemPatch,
    ) -> Result<(), StoreError>;

    /// Deletes an item.
    async fn delete_item(&self, vault: &VaultId, item: &ItemId) -> Result<(), StoreError>;

    /// Deletes an attachment's binary content and drops its reference
    /// from the item.
    async fn delete_attachment(
        &self,
        item: &ItemId,
        attachment: &AttachmentId,
    ) -> Result<(), StoreError>;

    /// Commits a member's permission set (adding the member if they were
    /// only invited so far).
    async fn update_member(&self, vault: &VaultId, member: VaultMember) -> Result<(), StoreError>;

    /// Removes a member from a vault.
    async fn remove_member(&self, vault: &VaultId, member: &MemberId) -> Result<(), StoreError>;
}

/// Capability checks for the acting account. Backed by the account/org
/// layer outside the core.
pub trait CapabilityCheck: Send + Sync {
    fn has_write_permission(&self, vault: &Vault) -> bool;
    fn has_manage_permission(&self, vault: &Vault) -> bool;
}

/// In-memory store and fixed-capability checker for tests.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// What the mock store saw, for assertions.
    #[derive(Debug, Clone, PartialEq)]
    pub enum StoreCall {
        UpdateItem(ItemId, ItemPatch),
        DeleteItem(ItemId),
        DeleteAttachment(ItemId, AttachmentId),
        UpdateMember(VaultId, VaultMember),
        RemoveMember(VaultId, MemberId),
    }

    #[derive(Default)]
    pub struct MemoryStore {
        items: Mutex<HashMap<ItemId, (VaultItem, VaultId)>>,
        vaults: Mutex<HashMap<VaultId, Vault>>,
        calls: Mutex<Vec<StoreCall>>,
        fail_next: AtomicBool,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seeds a vault.
        pub fn put_vault(&self, vault: Vault) {
            self.vaults.lock().unwrap().insert(vault.id, vault);
        }

        /// Seeds an item into a vault.
        pub fn put_item(&self, vault: VaultId, item: VaultItem) {
            self.items.lock().unwrap().insert(item.id, (item, vault));
        }

        /// Makes the next mutating call fail with a store error.
        pub fn fail_next(&self) {
            self.fail_next.store(true, Ordering::SeqCst);
        }

        /// Everything the store was asked to do, in order.
        pub fn calls(&self) -> Vec<StoreCall> {
            self.calls.lock().unwrap().clone()
        }

        fn check_failure(&self) -> Result<(), StoreError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                Err(StoreError("injected failure".into()))
            } else {
                Ok(())
            }
        }

        fn record(&self, call: StoreCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl EntityStore for MemoryStore {
        fn get_item(&self, id: &ItemId) -> Option<(VaultItem, Vault)> {
            let items = self.items.lock().unwrap();
            let (item, vault_id) = items.get(id)?;
            let vault = self.vaults.lock().unwrap().get(vault_id)?.clone();
            Some((item.clone(), vault))
        }

        fn get_vault(&self, id: &VaultId) -> Option<Vault> {
            self.vaults.lock().unwrap().get(id).cloned()
        }

        async fn update_item(
            &self,
            _vault: &VaultId,
            item: &ItemId,
            patch: ItemPatch,
        ) -> Result<(), StoreError> {
            self.record(StoreCall::UpdateItem(*item, patch.clone()));
            self.check_failure()?;
            let mut items = self.items.lock().unwrap();
            let (snapshot, _) = items
                .get_mut(item)
                .ok_or_else(|| StoreError(format!("no such item {item}")))?;
            patch.apply_to(snapshot);
            Ok(())
        }

        async fn delete_item(&self, _vault: &VaultId, item: &ItemId) -> Result<(), StoreError> {
            self.record(StoreCall::DeleteItem(*item));
            self.check_failure()?;
            self.items.lock().unwrap().remove(item);
            Ok(())
        }

        async fn delete_attachment(
            &self,
            item: &ItemId,
            attachment: &AttachmentId,
        ) -> Result<(), StoreError> {
            self.record(StoreCall::DeleteAttachment(*item, *attachment));
            self.check_failure()?;
            let mut items = self.items.lock().unwrap();
            if let Some((snapshot, _)) = items.get_mut(item) {
                snapshot.attachments.retain(|a| a.id != *attachment);
            }
            Ok(())
        }

        async fn update_member(
            &self,
            vault: &VaultId,
            member: VaultMember,
        ) -> Result<(), StoreError> {
            self.record(StoreCall::UpdateMember(*vault, member.clone()));
            self.check_failure()?;
            let mut vaults = self.vaults.lock().unwrap();
            let vault = vaults
                .get_mut(vault)
                .ok_or_else(|| StoreError(format!("no such vault {vault}")))?;
            match vault.members.iter_mut().find(|m| m.id == member.id) {
                Some(existing) => *existing = member,
                None => vault.members.push(member),
            }
            Ok(())
        }

        async fn remove_member(
            &self,
            vault: &VaultId,
            member: &MemberId,
        ) -> Result<(), StoreError> {
            self.record(StoreCall::RemoveMember(*vault, *member));
            self.check_failure()?;
            let mut vaults = self.vaults.lock().unwrap();
            if let Some(vault) = vaults.get_mut(vault) {
                vault.members.retain(|m| m.id != *member);
            }
            Ok(())
        }
    }

    /// Capability checker with fixed answers.
    pub struct FixedCapabilities {
        pub write: bool,
        pub manage: bool,
    }

    impl FixedCapabilities {
        pub fn all() -> Self {
            Self {
                write: true,
                manage: true,
            }
        }

        pub fn read_only() -> Self {
            Self {
                write: false,
                manage: false,
            }
        }
    }

    impl CapabilityCheck for FixedCapabilities {
        fn has_write_permission(&self, _vault: &Vault) -> bool {
            self.write
        }

        fn has_manage_permission(&self, _vault: &Vault) -> bool {
            self.manage
        }
    }
}
