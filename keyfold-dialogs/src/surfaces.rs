//! Child surface contracts.
//!
//! Each of these is a modal surface implemented outside the core (the UI
//! shell provides the widgets). The orchestrators invoke them through the
//! modal stack so the parent dialog suspends for exactly the child's
//! lifetime. Every `show` resolves to `None` when the user dismisses the
//! surface without producing a result.

use crate::item_editor::FileUpload;
use async_trait::async_trait;
use keyfold_types::{AttachmentInfo, ItemId, VaultId, VaultItem};

/// Severity of an alert message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Success,
    Warning,
}

/// A one-button notification.
#[derive(Debug, Clone)]
pub struct AlertRequest {
    pub message: String,
    pub level: AlertLevel,
}

impl AlertRequest {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: AlertLevel::Warning,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: AlertLevel::Success,
        }
    }
}

/// A yes/no prompt, used before every destructive action.
#[derive(Debug, Clone)]
pub struct ConfirmRequest {
    pub title: Option<String>,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub destructive: bool,
}

impl ConfirmRequest {
    pub fn destructive(message: impl Into<String>, confirm_label: impl Into<String>) -> Self {
        Self {
            title: None,
            message: message.into(),
            confirm_label: confirm_label.into(),
            cancel_label: "Cancel".into(),
            destructive: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Alert and confirmation dialogs.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Shows a confirmation prompt; `true` means confirmed.
    async fn confirm(&self, request: ConfirmRequest) -> bool;

    /// Shows a notification the user acknowledges.
    async fn alert(&self, request: AlertRequest);
}

/// Input to the file-upload surface. Size validation happens before the
/// surface is ever invoked.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub item: ItemId,
    pub file: FileUpload,
}

/// The attachment upload dialog.
#[async_trait]
pub trait UploadSurface: Send + Sync {
    async fn show(&self, request: UploadRequest) -> Option<AttachmentInfo>;
}

/// The password/secret generator dialog.
#[async_trait]
pub trait SecretGenerator: Send + Sync {
    async fn show(&self) -> Option<String>;
}

/// The QR/code capture dialog. Returns the raw captured payload; parsing
/// it into a secret is the orchestrator's job.
#[async_trait]
pub trait CodeCapture: Send + Sync {
    async fn show(&self) -> Option<String>;
}

/// An item offered to the move-target picker.
#[derive(Debug, Clone)]
pub struct MoveCandidate {
    pub item: VaultItem,
    pub vault: VaultId,
}

/// An item after a completed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedItem {
    pub item: ItemId,
    pub vault: VaultId,
}

/// The move-to-vault picker dialog.
#[async_trait]
pub trait MoveTargetPicker: Send + Sync {
    async fn show(&self, candidates: Vec<MoveCandidate>) -> Option<Vec<MovedItem>>;
}

/// The read-only attachment preview dialog.
#[async_trait]
pub trait AttachmentPreview: Send + Sync {
    async fn show(&self, item: ItemId, attachment: AttachmentInfo);
}

/// Scripted surface implementations for tests.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Prompter with queued confirm answers; records everything shown.
    #[derive(Default)]
    pub struct ScriptedPrompter {
        confirms: Mutex<VecDeque<bool>>,
        pub confirmed: Mutex<Vec<ConfirmRequest>>,
        pub alerts: Mutex<Vec<AlertRequest>>,
    }

    impl ScriptedPrompter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues an answer for the next confirmation prompt.
        pub fn push_confirm(&self, answer: bool) {
            self.confirms.lock().unwrap().push_back(answer);
        }

        pub fn alert_messages(&self) -> Vec<String> {
            self.alerts
                .lock()
                .unwrap()
                .iter()
                .map(|a| a.message.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Prompter for ScriptedPrompter {
        async fn confirm(&self, request: ConfirmRequest) -> bool {
            self.confirmed.lock().unwrap().push(request);
            // Default to declining: a destructive action never proceeds
            // off an unscripted prompt.
            self.confirms.lock().unwrap().pop_front().unwrap_or(false)
        }

        async fn alert(&self, request: AlertRequest) {
            self.alerts.lock().unwrap().push(request);
        }
    }

    /// Upload surface returning a fixed attachment; counts invocations.
    #[derive(Default)]
    pub struct ScriptedUpload {
        result: Mutex<Option<AttachmentInfo>>,
        pub shown: Mutex<Vec<UploadRequest>>,
    }

    impl ScriptedUpload {
        pub fn returning(attachment: AttachmentInfo) -> Self {
            Self {
                result: Mutex::new(Some(attachment)),
                shown: Mutex::new(Vec::new()),
            }
        }

        pub fn show_count(&self) -> usize {
            self.shown.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UploadSurface for ScriptedUpload {
        async fn show(&self, request: UploadRequest) -> Option<AttachmentInfo> {
            self.shown.lock().unwrap().push(request);
            self.result.lock().unwrap().clone()
        }
    }

    /// Generator yielding queued secrets.
    #[derive(Default)]
    pub struct ScriptedGenerator {
        values: Mutex<VecDeque<Option<String>>>,
    }

    impl ScriptedGenerator {
        pub fn returning(value: impl Into<String>) -> Self {
            let generator = Self::default();
            generator
                .values
                .lock()
                .unwrap()
                .push_back(Some(value.into()));
            generator
        }

        /// A generator the user always dismisses.
        pub fn dismissed() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl SecretGenerator for ScriptedGenerator {
        async fn show(&self) -> Option<String> {
            self.values.lock().unwrap().pop_front().flatten()
        }
    }

    /// Capture surface yielding queued payloads; counts invocations so
    /// tests can assert the retry loop.
    #[derive(Default)]
    pub struct ScriptedCapture {
        payloads: Mutex<VecDeque<Option<String>>>,
        shows: Mutex<usize>,
    }

    impl ScriptedCapture {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push(&self, payload: Option<impl Into<String>>) {
            self.payloads
                .lock()
                .unwrap()
                .push_back(payload.map(Into::into));
        }

        pub fn show_count(&self) -> usize {
            *self.shows.lock().unwrap()
        }
    }

    #[async_trait]
    impl CodeCapture for ScriptedCapture {
        async fn show(&self) -> Option<String> {
            *self.shows.lock().unwrap() += 1;
            // An exhausted script behaves like a dismissal.
            self.payloads.lock().unwrap().pop_front().flatten()
        }
    }

    /// Move picker that accepts every candidate into a fixed target vault,
    /// or dismisses when no target is configured.
    #[derive(Default)]
    pub struct ScriptedMovePicker {
        target: Mutex<Option<VaultId>>,
        pub shown: Mutex<Vec<Vec<MoveCandidate>>>,
    }

    impl ScriptedMovePicker {
        pub fn moving_to(target: VaultId) -> Self {
            Self {
                target: Mutex::new(Some(target)),
                shown: Mutex::new(Vec::new()),
            }
        }

        pub fn dismissed() -> Self {
            Self::default()
        }

        pub fn show_count(&self) -> usize {
            self.shown.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MoveTargetPicker for ScriptedMovePicker {
        async fn show(&self, candidates: Vec<MoveCandidate>) -> Option<Vec<MovedItem>> {
            let target = *self.target.lock().unwrap();
            let moved = target.map(|vault| {
                candidates
                    .iter()
                    .map(|c| MovedItem {
                        item: c.item.id,
                        vault,
                    })
                    .collect()
            });
            self.shown.lock().unwrap().push(candidates);
            moved
        }
    }

    /// Preview surface that records what it was asked to show.
    #[derive(Default)]
    pub struct RecordingPreview {
        pub shown: Mutex<Vec<(ItemId, AttachmentInfo)>>,
    }

    impl RecordingPreview {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn show_count(&self) -> usize {
            self.shown.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AttachmentPreview for RecordingPreview {
        async fn show(&self, item: ItemId, attachment: AttachmentInfo) {
            self.shown.lock().unwrap().push((item, attachment));
        }
    }
}
