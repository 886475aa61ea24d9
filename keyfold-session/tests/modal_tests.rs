//! Modal stack invariants: single visible surface, deterministic
//! resume order, cancellation semantics.

use keyfold_session::{ModalStack, SurfaceKind};
use std::sync::Arc;

#[tokio::test]
async fn only_top_surface_is_visible() {
    let stack = ModalStack::new();
    let (item, _pending_item) = stack.open::<()>(SurfaceKind::ItemDialog);
    assert!(stack.is_visible(item));

    let (confirm, _pending_confirm) = stack.open::<bool>(SurfaceKind::Confirm);
    assert!(!stack.is_visible(item));
    assert!(stack.is_visible(confirm));
    assert_eq!(stack.depth(), 2);

    // The suspended parent is still on the stack, state intact.
    assert!(stack.contains(item));
}

#[tokio::test]
async fn close_resumes_the_previous_top() {
    let stack = ModalStack::new();
    let (item, _a) = stack.open::<()>(SurfaceKind::ItemDialog);
    let (generator, pending) = stack.open::<String>(SurfaceKind::Generator);

    stack.close(generator, Some("s3cr3t".to_string())).unwrap();
    assert_eq!(pending.wait().await.as_deref(), Some("s3cr3t"));
    assert!(stack.is_visible(item));
    assert_eq!(stack.depth(), 1);
}

#[tokio::test]
async fn nested_open_close_sequences_resume_deterministically() {
    let stack = ModalStack::new();
    let (a, _pa) = stack.open::<()>(SurfaceKind::ItemDialog);
    let (b, _pb) = stack.open::<()>(SurfaceKind::Upload);
    let (c, pc) = stack.open::<bool>(SurfaceKind::Confirm);

    // Exactly one visible at every step.
    assert!(stack.is_visible(c));
    assert!(!stack.is_visible(b));
    assert!(!stack.is_visible(a));

    stack.close(c, Some(true)).unwrap();
    assert_eq!(pc.wait().await, Some(true));
    assert!(stack.is_visible(b));

    stack.close::<()>(b, None).unwrap();
    assert!(stack.is_visible(a));
}

#[tokio::test]
async fn dismissal_resolves_with_none() {
    let stack = ModalStack::new();
    let (qr, pending) = stack.open::<String>(SurfaceKind::CodeCapture);
    stack.close::<String>(qr, None).unwrap();
    assert_eq!(pending.wait().await, None);
}

#[tokio::test]
async fn closing_an_unknown_surface_fails() {
    let stack = ModalStack::new();
    let (id, _pending) = stack.open::<()>(SurfaceKind::Alert);
    stack.close::<()>(id, None).unwrap();
    assert!(stack.close::<()>(id, None).is_err());
}

#[tokio::test]
async fn close_with_wrong_result_type_is_refused() {
    let stack = ModalStack::new();
    let (id, pending) = stack.open::<String>(SurfaceKind::Generator);
    assert!(stack.close::<u32>(id, Some(7)).is_err());

    // The surface survived the refused close and still resolves normally.
    assert!(stack.is_visible(id));
    stack.close(id, Some("ok".to_string())).unwrap();
    assert_eq!(pending.wait().await.as_deref(), Some("ok"));
}

#[tokio::test]
async fn run_child_suspends_and_resumes_the_parent() {
    let stack = Arc::new(ModalStack::new());
    let (parent, _pending) = stack.open::<()>(SurfaceKind::ItemDialog);

    let inner = stack.clone();
    let result = stack
        .run_child(SurfaceKind::Generator, async {
            // While the child runs, the parent is suspended but alive.
            assert!(!inner.is_visible(parent));
            assert!(inner.contains(parent));
            assert_eq!(inner.depth(), 2);
            Some("generated".to_string())
        })
        .await;

    assert_eq!(result.as_deref(), Some("generated"));
    assert!(stack.is_visible(parent));
    assert_eq!(stack.depth(), 1);
}

#[tokio::test]
async fn run_child_cancellation_leaves_parent_unchanged() {
    let stack = Arc::new(ModalStack::new());
    let (parent, _pending) = stack.open::<()>(SurfaceKind::ItemDialog);

    let result: Option<String> = stack.run_child(SurfaceKind::CodeCapture, async { None }).await;
    assert_eq!(result, None);
    assert!(stack.is_visible(parent));
}
