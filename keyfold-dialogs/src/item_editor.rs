//! The item dialog orchestrator.
//!
//! Composes the edit session, draft buffer and modal stack into the full
//! item workflow: view/edit mode, field CRUD with deferred persistence,
//! attachments, move-to-vault, delete, favorite, secret generation and QR
//! capture. All committed-state changes go through the entity store; all
//! child dialogs go through the modal stack so the item dialog suspends
//! for exactly the child's lifetime.

use crate::error::{DialogError, DialogResult};
use crate::store::{CapabilityCheck, EntityStore};
use crate::surfaces::{
    AlertRequest, AttachmentPreview, CodeCapture, ConfirmRequest, MoveCandidate, MoveTargetPicker,
    MovedItem, Prompter, SecretGenerator, UploadRequest, UploadSurface,
};
use keyfold_session::{
    EditSession, EditState, ModalStack, PendingClose, SessionError, SurfaceId, SurfaceKind,
};
use keyfold_types::{
    parse_otp_url, AttachmentInfo, Field, FieldPatch, ItemId, ItemPatch, Vault, VaultItem,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A file the user picked for attaching. Content stays with the upload
/// surface; the orchestrator only needs the metadata for validation.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub content_type: String,
    pub size: u64,
}

/// Tunables for the item dialog.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Attachments above this many bytes are rejected before the upload
    /// surface is ever invoked.
    pub attachment_size_limit: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            attachment_size_limit: 5_000_000,
        }
    }
}

/// The collaborators an item editor needs, passed in explicitly at
/// construction.
#[derive(Clone)]
pub struct EditorContext {
    pub store: Arc<dyn EntityStore>,
    pub capabilities: Arc<dyn CapabilityCheck>,
    pub prompter: Arc<dyn Prompter>,
    pub upload: Arc<dyn UploadSurface>,
    pub generator: Arc<dyn SecretGenerator>,
    pub capture: Arc<dyn CodeCapture>,
    pub move_picker: Arc<dyn MoveTargetPicker>,
    pub preview: Arc<dyn AttachmentPreview>,
}

/// How the item dialog ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemDialogOutcome {
    /// Dismissed; the item still exists where it was.
    Closed,
    /// The item was deleted.
    Deleted,
    /// The item was moved; callers usually navigate to its new home.
    Moved(MovedItem),
}

/// How a QR capture flow ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A secret was parsed and written into the targeted field.
    Applied,
    /// The user dismissed the capture surface.
    Cancelled,
}

/// Orchestrator for one open item dialog.
pub struct ItemEditor {
    item_id: ItemId,
    ctx: EditorContext,
    config: EditorConfig,
    modals: Arc<ModalStack>,
    surface: SurfaceId,
    session: EditSession,
}

impl ItemEditor {
    /// Opens the item dialog for `item_id`, registering it on the modal
    /// stack. The returned pending result resolves when the dialog closes.
    pub fn open(
        ctx: EditorContext,
        config: EditorConfig,
        modals: Arc<ModalStack>,
        item_id: ItemId,
    ) -> DialogResult<(Self, PendingClose<ItemDialogOutcome>)> {
        ctx.store
            .get_item(&item_id)
            .ok_or(DialogError::ItemNotFound(item_id))?;

        let (surface, pending) = modals.open::<ItemDialogOutcome>(SurfaceKind::ItemDialog);
        debug!(%item_id, "item dialog opened");
        Ok((
            Self {
                item_id,
                ctx,
                config,
                modals,
                surface,
                session: EditSession::new(),
            },
            pending,
        ))
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn state(&self) -> EditState {
        self.session.state()
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_editing()
    }

    /// The committed snapshot and its vault, re-read from the store.
    pub fn snapshot(&self) -> DialogResult<(VaultItem, Vault)> {
        self.ctx
            .store
            .get_item(&self.item_id)
            .ok_or(DialogError::ItemNotFound(self.item_id))
    }

    /// The draft under edit, when there is one.
    pub fn draft(&self) -> Option<&keyfold_session::DraftBuffer> {
        self.session.draft()
    }

    /// Dismisses the dialog without touching the item.
    pub fn close(&mut self) -> DialogResult<()> {
        self.finish(ItemDialogOutcome::Closed)
    }

    // ── Edit mode ────────────────────────────────────────────────

    /// Enters edit mode, seeding the draft from the committed snapshot.
    /// Silently refused without write permission on the vault.
    pub fn begin_edit(&mut self) -> DialogResult<()> {
        let (item, vault) = self.snapshot()?;
        if !self.ctx.capabilities.has_write_permission(&vault) {
            debug!(item = %self.item_id, "edit refused, no write permission");
            return Ok(());
        }
        self.session.begin_edit(&item)?;
        Ok(())
    }

    /// Enters edit mode targeting a particular field. The state machine
    /// contract is identical to [`begin_edit`](Self::begin_edit); focusing
    /// the field is the UI's concern.
    pub fn edit_field(&mut self, index: usize) -> DialogResult<()> {
        self.begin_edit()?;
        if let Some(draft) = self.session.draft() {
            if draft.fields.get(index).is_none() {
                return Err(SessionError::IndexOutOfRange {
                    index,
                    len: draft.fields.len(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Leaves edit mode, discarding all unsaved changes.
    pub fn cancel_edit(&mut self) -> DialogResult<()> {
        self.session.cancel_edit()?;
        Ok(())
    }

    /// Commits the draft (name, fields, tags) to the store as a single
    /// update request. On failure the session stays in `Editing` with the
    /// draft intact, and the error is handed to the caller for retry or
    /// display.
    pub async fn save(&mut self) -> DialogResult<()> {
        let (_, vault) = self.snapshot()?;
        let ticket = self.session.begin_commit()?;
        let patch = ticket.patch().clone();

        let result = self
            .ctx
            .store
            .update_item(&vault.id, &self.item_id, patch)
            .await;

        match result {
            Ok(()) => {
                self.session.finish_commit(ticket, true)?;
                info!(item = %self.item_id, "item saved");
                Ok(())
            }
            Err(err) => {
                warn!(item = %self.item_id, %err, "item save failed, draft retained");
                self.session.finish_commit(ticket, false)?;
                Err(err.into())
            }
        }
    }

    // ── Draft mutations ──────────────────────────────────────────

    pub fn set_name(&mut self, name: impl Into<String>) -> DialogResult<()> {
        self.session.draft_mut()?.set_name(name);
        Ok(())
    }

    /// Appends a field to the draft and returns its index. The new field
    /// is always last, so the UI can focus it.
    pub fn add_field(&mut self, field: Field) -> DialogResult<usize> {
        Ok(self.session.draft_mut()?.fields.add_field(field))
    }

    pub fn remove_field(&mut self, index: usize) -> DialogResult<()> {
        self.session.draft_mut()?.fields.remove_field(index)?;
        Ok(())
    }

    pub fn update_field(&mut self, index: usize, patch: &FieldPatch) -> DialogResult<()> {
        self.session.draft_mut()?.fields.update_field(index, patch)?;
        Ok(())
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) -> DialogResult<()> {
        self.session.draft_mut()?.add_tag(tag);
        Ok(())
    }

    pub fn remove_tag(&mut self, tag: &str) -> DialogResult<()> {
        self.session.draft_mut()?.remove_tag(tag);
        Ok(())
    }

    // ── Side channels ────────────────────────────────────────────

    /// Toggles the favorite flag. Independent of the editing state
    /// machine: commits immediately, only the flag, nothing else.
    pub async fn set_favorite(&mut self, favorite: bool) -> DialogResult<()> {
        let (_, vault) = self.snapshot()?;
        self.ctx
            .store
            .update_item(&vault.id, &self.item_id, ItemPatch::favorite(favorite))
            .await?;
        Ok(())
    }

    // ── Attachments ──────────────────────────────────────────────

    /// Validates the file size, then runs the upload surface as a child
    /// dialog. Files over the ceiling are reported and rejected before
    /// the surface is ever invoked.
    pub async fn add_attachment(&mut self, file: FileUpload) -> DialogResult<Option<AttachmentInfo>> {
        let limit = self.config.attachment_size_limit;
        if file.size > limit {
            self.alert(AlertRequest::warning(format!(
                "The selected file is too large! Only files of up to {} MB are supported.",
                limit / 1_000_000
            )))
            .await;
            return Err(DialogError::TooLarge {
                size: file.size,
                limit,
            });
        }

        let request = UploadRequest {
            item: self.item_id,
            file,
        };
        let upload = self.ctx.upload.clone();
        let attachment = self
            .modals
            .run_child(SurfaceKind::Upload, upload.show(request))
            .await;

        if let Some(attachment) = &attachment {
            info!(item = %self.item_id, attachment = %attachment.id, "attachment uploaded");
            self.alert(AlertRequest::success("File uploaded successfully!"))
                .await;
        }
        Ok(attachment)
    }

    /// Opens the read-only attachment preview. Ignored while editing.
    pub async fn open_attachment(&mut self, attachment: AttachmentInfo) -> DialogResult<()> {
        if self.session.is_editing() {
            return Ok(());
        }
        let preview = self.ctx.preview.clone();
        let item_id = self.item_id;
        self.modals
            .run_child(SurfaceKind::AttachmentPreview, async move {
                preview.show(item_id, attachment).await;
                Some(())
            })
            .await;
        Ok(())
    }

    /// Deletes an attachment after explicit confirmation. Returns whether
    /// the attachment was removed.
    pub async fn remove_attachment(&mut self, attachment: &AttachmentInfo) -> DialogResult<bool> {
        let confirmed = self
            .confirm(
                ConfirmRequest::destructive(
                    "Are you sure you want to delete this attachment?",
                    "Delete",
                )
                .with_title("Delete Attachment"),
            )
            .await;
        if !confirmed {
            return Ok(false);
        }

        self.ctx
            .store
            .delete_attachment(&self.item_id, &attachment.id)
            .await?;
        info!(item = %self.item_id, attachment = %attachment.id, "attachment deleted");
        Ok(true)
    }

    // ── Move / delete ────────────────────────────────────────────

    /// Offers the move-to-vault picker. Silently refused without write
    /// permission; blocked outright (picker never opened) while the item
    /// carries attachments.
    pub async fn move_to_vault(&mut self) -> DialogResult<Option<Vec<MovedItem>>> {
        let (item, vault) = self.snapshot()?;
        if !self.ctx.capabilities.has_write_permission(&vault) {
            debug!(item = %self.item_id, "move refused, no write permission");
            return Ok(None);
        }

        if item.has_attachments() {
            self.alert(AlertRequest::warning(
                "Items with attachments cannot be moved!",
            ))
            .await;
            return Err(DialogError::Blocked(
                "items with attachments cannot be moved".into(),
            ));
        }

        let picker = self.ctx.move_picker.clone();
        let candidates = vec![MoveCandidate {
            item,
            vault: vault.id,
        }];
        let moved = self
            .modals
            .run_child(SurfaceKind::MovePicker, picker.show(candidates))
            .await;

        match moved {
            Some(moved) if !moved.is_empty() => {
                info!(item = %self.item_id, vault = %moved[0].vault, "item moved");
                self.finish(ItemDialogOutcome::Moved(moved[0].clone()))?;
                Ok(Some(moved))
            }
            _ => Ok(None),
        }
    }

    /// Deletes the item after explicit confirmation. On confirmation the
    /// dialog closes with [`ItemDialogOutcome::Deleted`]; on decline it
    /// stays open with any edit session untouched.
    pub async fn delete(&mut self) -> DialogResult<bool> {
        let confirmed = self
            .confirm(ConfirmRequest::destructive(
                "Are you sure you want to delete this item?",
                "Delete",
            ))
            .await;
        if !confirmed {
            return Ok(false);
        }

        let (_, vault) = self.snapshot()?;
        self.ctx.store.delete_item(&vault.id, &self.item_id).await?;
        info!(item = %self.item_id, "item deleted");
        self.finish(ItemDialogOutcome::Deleted)?;
        Ok(true)
    }

    // ── Field value flows ────────────────────────────────────────

    /// Runs the secret generator as a child dialog and writes the produced
    /// value into the targeted field. Cancellation changes nothing.
    pub async fn generate_field_value(&mut self, index: usize) -> DialogResult<bool> {
        self.check_field_index(index)?;
        let epoch = self.session.epoch();

        let generator = self.ctx.generator.clone();
        let value = self
            .modals
            .run_child(SurfaceKind::Generator, generator.show())
            .await;

        let Some(value) = value else {
            return Ok(false);
        };
        match self.session.apply_if_current(epoch, |draft| {
            draft.fields.update_field(index, &FieldPatch::value(value))
        }) {
            Ok(()) => Ok(true),
            // The edit was cancelled or replaced while the generator was
            // open; the late result is dropped, never applied.
            Err(SessionError::StaleEpoch { .. }) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Runs the QR capture flow for a TOTP secret. An unparseable payload
    /// is reported and capture is re-offered immediately; the loop ends
    /// only when a secret parses or the user dismisses the surface.
    pub async fn capture_totp(&mut self, index: usize) -> DialogResult<CaptureOutcome> {
        self.check_field_index(index)?;
        let epoch = self.session.epoch();
        let mut attempts = 0u32;

        loop {
            let capture = self.ctx.capture.clone();
            let payload = self
                .modals
                .run_child(SurfaceKind::CodeCapture, capture.show())
                .await;

            let Some(payload) = payload else {
                debug!(item = %self.item_id, attempts, "code capture dismissed");
                return Ok(CaptureOutcome::Cancelled);
            };
            attempts += 1;

            match parse_otp_url(&payload) {
                Ok(params) => {
                    return match self.session.apply_if_current(epoch, |draft| {
                        draft
                            .fields
                            .update_field(index, &FieldPatch::value(params.secret))
                    }) {
                        Ok(()) => {
                            info!(item = %self.item_id, attempts, "captured secret applied");
                            Ok(CaptureOutcome::Applied)
                        }
                        // Late result for a discarded draft: drop it.
                        Err(SessionError::StaleEpoch { .. }) => Ok(CaptureOutcome::Cancelled),
                        Err(err) => Err(err.into()),
                    };
                }
                Err(err) => {
                    warn!(item = %self.item_id, attempts, %err, "invalid capture payload");
                    self.alert(AlertRequest::warning("Invalid code! Please try again."))
                        .await;
                    // Re-offer capture; bounded only by user cancellation.
                }
            }
        }
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn check_field_index(&self, index: usize) -> DialogResult<()> {
        let draft = self.session.draft().ok_or(SessionError::NotEditing)?;
        if draft.fields.get(index).is_none() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: draft.fields.len(),
            }
            .into());
        }
        Ok(())
    }

    fn finish(&mut self, outcome: ItemDialogOutcome) -> DialogResult<()> {
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

    async fn alert(&self, request: AlertRequest) {
        let prompter = self.ctx.prompter.clone();
        self.modals
            .run_child(SurfaceKind::Alert, async move {
                prompter.alert(request).await;
                Some(())
            })
            .await;
    }
}
