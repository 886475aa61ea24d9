//! Editable working copies of an item's content.
//!
//! A [`FieldBuffer`] holds the ordered field list under edit; a
//! [`DraftBuffer`] wraps it together with the name and tags. Both are owned
//! exclusively by the active edit session and are never shared with the
//! committed snapshot — commit hands a copy to the store, cancel throws the
//! buffer away.

use crate::error::{SessionError, SessionResult};
use keyfold_types::{Field, FieldPatch, VaultItem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An ordered, editable list of fields.
///
/// Order is significant (display and storage order) and every operation
/// preserves the relative order of the untouched fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldBuffer {
    fields: Vec<Field>,
}

impl FieldBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a buffer with a deep copy of the given fields.
    pub fn seeded(fields: &[Field]) -> Self {
        Self {
            fields: fields.to_vec(),
        }
    }

    /// Appends a field and returns its index. The new field is always the
    /// last element, so callers can direct focus to it.
    pub fn add_field(&mut self, field: Field) -> usize {
        self.fields.push(field);
        self.fields.len() - 1
    }

    /// Removes the field at `index`, preserving the order of the rest.
    pub fn remove_field(&mut self, index: usize) -> SessionResult<Field> {
        self.check_index(index)?;
        Ok(self.fields.remove(index))
    }

    /// Merges a patch into the field at `index`.
    pub fn update_field(&mut self, index: usize, patch: &FieldPatch) -> SessionResult<()> {
        self.check_index(index)?;
        patch.apply_to(&mut self.fields[index]);
        Ok(())
    }

    /// The field at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// The current field list, in order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Consumes the buffer, yielding the field list.
    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn check_index(&self, index: usize) -> SessionResult<()> {
        if index < self.fields.len() {
            Ok(())
        } else {
            Err(SessionError::IndexOutOfRange {
                index,
                len: self.fields.len(),
            })
        }
    }
}

/// The full working copy of an item under edit: name, fields and tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftBuffer {
    pub name: String,
    pub fields: FieldBuffer,
    tags: BTreeSet<String>,
}

impl DraftBuffer {
    /// Seeds a draft as a deep copy of a committed snapshot.
    pub fn seeded_from(item: &VaultItem) -> Self {
        Self {
            name: item.name.clone(),
            fields: FieldBuffer::seeded(&item.fields),
            tags: item.tags.iter().cloned().collect(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Adds a tag. Returns `false` if it was already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    /// Removes a tag. Returns `false` if it was not present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// The current tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        self.tags.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyfold_types::FieldKind;

    fn field(name: &str) -> Field {
        Field::new(name, "", FieldKind::Note)
    }

    #[test]
    fn add_returns_last_index() {
        let mut buf = FieldBuffer::new();
        assert_eq!(buf.add_field(field("a")), 0);
        assert_eq!(buf.add_field(field("b")), 1);
        assert_eq!(buf.get(1).unwrap().name, "b");
    }

    #[test]
    fn remove_preserves_relative_order() {
        let mut buf = FieldBuffer::seeded(&[field("a"), field("b"), field("c")]);
        buf.remove_field(1).unwrap();
        let names: Vec<_> = buf.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut buf = FieldBuffer::seeded(&[field("a")]);
        assert!(matches!(
            buf.remove_field(1),
            Err(SessionError::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(buf.update_field(7, &FieldPatch::value("x")).is_err());
        // The failed calls left the buffer untouched.
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.get(0).unwrap().value, "");
    }

    #[test]
    fn draft_tags_deduplicate() {
        let mut draft = DraftBuffer::default();
        assert!(draft.add_tag("work"));
        assert!(!draft.add_tag("work"));
        assert!(draft.remove_tag("work"));
        assert!(!draft.remove_tag("work"));
    }
}
