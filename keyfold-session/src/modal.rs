//! The modal stack.
//!
//! Dialog surfaces form a stack: opening a child suspends (hides, does not
//! destroy) the current top, closing it resumes whatever is beneath. At
//! most one surface is visible at any time, and a suspended surface keeps
//! all of its in-memory state across the child's full lifecycle.
//!
//! Each open surface carries a typed close-result channel, stored
//! type-erased so heterogeneous surfaces can share one stack. Dropping the
//! stack entry without a result resolves the opener with `None`
//! (cancellation) — a dismissed child never applies a partial mutation.

use crate::error::{SessionError, SessionResult};
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// What a stack entry is, for tracing and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    ItemDialog,
    MemberDialog,
    Confirm,
    Alert,
    Upload,
    Generator,
    CodeCapture,
    MovePicker,
    AttachmentPreview,
}

impl SurfaceKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ItemDialog => "item-dialog",
            Self::MemberDialog => "member-dialog",
            Self::Confirm => "confirm",
            Self::Alert => "alert",
            Self::Upload => "upload",
            Self::Generator => "generator",
            Self::CodeCapture => "code-capture",
            Self::MovePicker => "move-picker",
            Self::AttachmentPreview => "attachment-preview",
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Handle to an open surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The pending close-result of a surface, resolved by
/// [`ModalStack::close`]. Waiting yields `None` if the surface was
/// dismissed without a result.
#[derive(Debug)]
pub struct PendingClose<T> {
    rx: oneshot::Receiver<Option<T>>,
}

impl<T> PendingClose<T> {
    /// Waits for the surface to close. Cancellation resolves to `None`.
    pub async fn wait(self) -> Option<T> {
        self.rx.await.unwrap_or(None)
    }
}

struct Entry {
    id: SurfaceId,
    kind: SurfaceKind,
    /// Type-erased `oneshot::Sender<Option<T>>` for the close result.
    resolver: Option<Box<dyn Any + Send>>,
}

/// The stack of open surfaces. Shared by all orchestrators of one window,
/// usually behind an `Arc`.
#[derive(Default)]
pub struct ModalStack {
    entries: Mutex<Vec<Entry>>,
    counter: AtomicU64,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// No invariant spans a lock release, so a poisoned lock still holds a
    /// structurally sound entry list; recover it instead of panicking.
    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes a surface onto the stack, suspending the previous top.
    /// Returns the surface handle and the pending close-result.
    pub fn open<T: Send + 'static>(&self, kind: SurfaceKind) -> (SurfaceId, PendingClose<T>) {
        let id = SurfaceId(self.counter.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = oneshot::channel::<Option<T>>();

        let mut entries = self.entries();
        if let Some(top) = entries.last() {
            debug!(surface = %top.kind, "suspending surface");
        }
        entries.push(Entry {
            id,
            kind,
            resolver: Some(Box::new(tx)),
        });
        debug!(surface = %kind, %id, depth = entries.len(), "opened surface");

        (id, PendingClose { rx })
    }

    /// Pops a surface, resolving its pending close-result and resuming the
    /// new top of stack. Closing with `None` is a cancellation: the opener
    /// observes no result and applies nothing.
    pub fn close<T: Send + 'static>(
        &self,
        id: SurfaceId,
        result: Option<T>,
    ) -> SessionResult<()> {
        let mut entries = self.entries();
        let pos = entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(SessionError::SurfaceNotFound(id.0))?;

        let resolver = entries[pos].resolver.take();
        let tx = match resolver {
            Some(boxed) => match boxed.downcast::<oneshot::Sender<Option<T>>>() {
                Ok(tx) => Some(*tx),
                Err(boxed) => {
                    // Wrong result type: restore the resolver, refuse.
                    entries[pos].resolver = Some(boxed);
                    return Err(SessionError::ResultTypeMismatch(id.0));
                }
            },
            None => None,
        };

        let entry = entries.remove(pos);
        debug!(surface = %entry.kind, %id, depth = entries.len(), "closed surface");
        if let Some(top) = entries.last() {
            debug!(surface = %top.kind, "resuming surface");
        }
        drop(entries);

        if let Some(tx) = tx {
            // The opener may have stopped waiting; that is fine.
            let _ = tx.send(result);
        } else {
            warn!(%id, "surface closed twice");
        }
        Ok(())
    }

    /// Runs a child surface around a collaborator future: opens the entry
    /// (suspending the parent), awaits the collaborator, closes the entry
    /// with its result (resuming the parent) and hands the result back.
    /// A dismissal (`None`) leaves the parent unchanged.
    pub async fn run_child<T, F>(&self, kind: SurfaceKind, fut: F) -> Option<T>
    where
        T: Send + 'static,
        F: Future<Output = Option<T>>,
    {
        let (id, pending) = self.open::<T>(kind);
        let result = fut.await;
        match self.close(id, result) {
            Ok(()) => pending.wait().await,
            Err(err) => {
                warn!(%id, %err, "child surface vanished mid-flight");
                None
            }
        }
    }

    /// The currently visible surface: the top of stack, all others are
    /// suspended.
    pub fn visible(&self) -> Option<(SurfaceId, SurfaceKind)> {
        self.entries().last().map(|e| (e.id, e.kind))
    }

    /// Whether the given surface is the visible one.
    pub fn is_visible(&self, id: SurfaceId) -> bool {
        self.visible().is_some_and(|(top, _)| top == id)
    }

    /// Whether the given surface is on the stack at all (visible or
    /// suspended).
    pub fn contains(&self, id: SurfaceId) -> bool {
        self.entries().iter().any(|e| e.id == id)
    }

    /// Number of open (visible + suspended) surfaces.
    pub fn depth(&self) -> usize {
        self.entries().len()
    }
}

impl fmt::Debug for ModalStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries();
        f.debug_struct("ModalStack")
            .field("depth", &entries.len())
            .field("top", &entries.last().map(|e| e.kind))
            .finish()
    }
}
