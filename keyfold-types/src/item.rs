//! Vault items and their typed field lists.
//!
//! A `VaultItem` is the committed snapshot of a secure record: a name, an
//! ordered list of typed fields, tags, attachment metadata and a favorite
//! flag. The editing engine never mutates a snapshot in place — changes flow
//! through an `ItemPatch` handed to the entity store.

use crate::{AttachmentId, ItemId, MemberId};
use serde::{Deserialize, Serialize};

/// The type of a field, driving both presentation and input masking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Username,
    Password,
    Url,
    Email,
    Pin,
    /// One-time-password secret; eligible for the QR capture flow.
    Totp,
    #[default]
    Note,
}

impl FieldKind {
    /// Whether values of this kind should be masked in a read-only view.
    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Password | Self::Pin | Self::Totp)
    }
}

/// A single named, typed value within an item.
///
/// Field order is significant — it is both display and storage order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind,
        }
    }
}

/// A partial update for a single field. `None` members are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPatch {
    pub name: Option<String>,
    pub value: Option<String>,
    pub kind: Option<FieldKind>,
}

impl FieldPatch {
    /// A patch that only replaces the value.
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Merges this patch into an existing field.
    pub fn apply_to(&self, field: &mut Field) {
        if let Some(name) = &self.name {
            field.name = name.clone();
        }
        if let Some(value) = &self.value {
            field.value = value.clone();
        }
        if let Some(kind) = self.kind {
            field.kind = kind;
        }
    }
}

/// Metadata for an attachment. The binary content lifecycle is external;
/// the core only ever sees this reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentInfo {
    pub id: AttachmentId,
    pub name: String,
    pub content_type: String,
    pub size: u64,
}

/// Committed snapshot of a vault item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultItem {
    pub id: ItemId,
    pub name: String,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentInfo>,
    #[serde(default)]
    pub favorite: bool,
    /// Unix millis of the last committed update.
    pub updated_at: i64,
    /// The member who made the last committed update, when known.
    #[serde(default)]
    pub updated_by: Option<MemberId>,
}

impl VaultItem {
    /// Creates an empty item with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            fields: Vec::new(),
            tags: Vec::new(),
            attachments: Vec::new(),
            favorite: false,
            updated_at: 0,
            updated_by: None,
        }
    }

    /// Whether the item carries any attachments. Items with attachments
    /// cannot be moved between vaults.
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

/// The single update request an edit session sends to the entity store on
/// commit. `None` members are left untouched, which is how the favorite
/// toggle commits without disturbing an in-progress edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub fields: Option<Vec<Field>>,
    pub tags: Option<Vec<String>>,
    pub favorite: Option<bool>,
}

impl ItemPatch {
    /// A patch that only toggles the favorite flag.
    pub fn favorite(favorite: bool) -> Self {
        Self {
            favorite: Some(favorite),
            ..Self::default()
        }
    }

    /// Applies the patch to a snapshot, producing the updated snapshot.
    /// This is what a conforming entity store does on `update_item`.
    pub fn apply_to(&self, item: &mut VaultItem) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(fields) = &self.fields {
            item.fields = fields.clone();
        }
        if let Some(tags) = &self.tags {
            item.tags = tags.clone();
        }
        if let Some(favorite) = self.favorite {
            item.favorite = favorite;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_patch_merges_only_present_members() {
        let mut field = Field::new("user", "alice", FieldKind::Username);
        FieldPatch::value("bob").apply_to(&mut field);
        assert_eq!(field, Field::new("user", "bob", FieldKind::Username));

        let patch = FieldPatch {
            kind: Some(FieldKind::Email),
            ..FieldPatch::default()
        };
        patch.apply_to(&mut field);
        assert_eq!(field.kind, FieldKind::Email);
        assert_eq!(field.name, "user");
    }

    #[test]
    fn item_patch_favorite_leaves_fields_alone() {
        let mut item = VaultItem::new("login");
        item.fields.push(Field::new("pw", "hunter2", FieldKind::Password));

        ItemPatch::favorite(true).apply_to(&mut item);
        assert!(item.favorite);
        assert_eq!(item.fields.len(), 1);
        assert_eq!(item.name, "login");
    }

    #[test]
    fn field_kind_serde_is_lowercase() {
        let json = serde_json::to_string(&FieldKind::Totp).unwrap();
        assert_eq!(json, "\"totp\"");
        let kind: FieldKind = serde_json::from_str("\"password\"").unwrap();
        assert_eq!(kind, FieldKind::Password);
    }

    #[test]
    fn secret_kinds_are_masked() {
        assert!(FieldKind::Password.is_secret());
        assert!(FieldKind::Pin.is_secret());
        assert!(FieldKind::Totp.is_secret());
        assert!(!FieldKind::Username.is_secret());
        assert!(!FieldKind::Note.is_secret());
    }
}
