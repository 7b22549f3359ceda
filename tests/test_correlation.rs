// tests/test_correlation.rs
// Session correlation behavior through the public store API

use std::sync::Arc;
use std::thread;

use iris::correlation::{
    CorrelationStore, ExternalId, ImageReference, ResolutionStep, SessionToken,
};

fn id(s: &str) -> ExternalId {
    ExternalId::parse(s).unwrap()
}

fn img(name: &str) -> ImageReference {
    ImageReference::new(name, "image/png")
}

#[test]
fn test_fresh_session_resolves_nothing_anonymously() {
    let store = CorrelationStore::new();
    store.issue_session();
    assert_eq!(store.resolve_session(None), None);
}

#[test]
fn test_upload_then_complete_is_one_shot() {
    let store = CorrelationStore::new();
    let token = store.issue_session();
    store.record_image(token.clone(), img("a.png"));

    let first = store.claim_for_completion(Some(&id("conv-1")));
    assert_eq!(first.resolution.token, Some(token.clone()));
    assert_eq!(first.resolution.step, ResolutionStep::ClaimedPending);
    assert_eq!(first.image, Some(img("a.png")));

    let second = store.claim_for_completion(Some(&id("conv-1")));
    assert_eq!(second.resolution.step, ResolutionStep::BoundId);
    assert_eq!(second.image, None);
}

#[test]
fn test_binding_survives_later_sessions_and_uploads() {
    let store = CorrelationStore::new();
    let first = store.issue_session();
    assert_eq!(store.resolve_session(Some(&id("conv-1"))), Some(first.clone()));

    let second = store.issue_session();
    store.record_image(second.clone(), img("b.png"));

    for _ in 0..3 {
        assert_eq!(store.resolve_session(Some(&id("conv-1"))), Some(first.clone()));
    }
    assert_eq!(store.claim_pending(), Some(second));
}

#[test]
fn test_sole_image_binds_unbound_id() {
    let store = CorrelationStore::new();
    let token = SessionToken::from("uploaded-without-session");
    store.record_image(token.clone(), img("a.png"));

    assert_eq!(store.resolve_session(Some(&id("conv-9"))), Some(token.clone()));
    assert_eq!(store.stats().bound_ids, 1);

    // Bound now, even after the image is gone
    store.consume_image(&token);
    assert_eq!(store.resolve_session(Some(&id("conv-9"))), Some(token));
}

#[test]
fn test_overwrite_keeps_only_latest_image() {
    let store = CorrelationStore::new();
    let token = store.issue_session();
    assert_eq!(store.record_image(token.clone(), img("first.png")), None);
    assert_eq!(
        store.record_image(token.clone(), img("second.png")),
        Some(img("first.png"))
    );
    assert_eq!(store.stats().pending_images, 1);
    assert_eq!(store.consume_image(&token), Some(img("second.png")));
}

#[test]
fn test_concurrent_completions_inject_once() {
    let store = Arc::new(CorrelationStore::new());
    let token = store.issue_session();
    store.record_image(token, img("a.png"));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            thread::spawn(move || {
                let conv = if i % 2 == 0 { "conv-even" } else { "conv-odd" };
                store.claim_for_completion(Some(&id(conv))).image.is_some()
            })
        })
        .collect();

    let injected = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|hit| *hit)
        .count();
    assert_eq!(injected, 1);
    assert_eq!(store.stats().pending_images, 0);
}
