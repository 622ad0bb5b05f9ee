use pairline_core::{ConnectionId, Envelope};

use crate::integration::init_tracing;
use crate::utils::{TestRouter, outbound, pair};

#[tokio::test]
async fn test_partner_requeued_after_leave() {
    init_tracing();

    let mut router = TestRouter::with_partner_requeue(true);
    let x = ConnectionId::new();
    let y = ConnectionId::new();
    pair(&mut router, x, y).await;

    router.leave(y).await;

    assert_eq!(router.drain().await, vec![outbound(x, Envelope::Leave)]);
    let snapshot = router.settle().await;
    assert_eq!(snapshot.waiting, vec![x], "X goes straight back into matchmaking");
    assert!(snapshot.table.is_empty());
}

#[tokio::test]
async fn test_requeued_partner_pairs_with_waiting_peer() {
    init_tracing();

    let mut router = TestRouter::with_partner_requeue(true);
    let x = ConnectionId::new();
    let y = ConnectionId::new();
    let z = ConnectionId::new();
    pair(&mut router, x, y).await;
    router.ready(z).await;

    router.disconnect(y).await;

    assert_eq!(
        router.drain().await,
        vec![outbound(x, Envelope::Leave), outbound(x, Envelope::StartOffer)]
    );
    let snapshot = router.settle().await;
    assert!(snapshot.waiting.is_empty());
    assert_eq!(snapshot.partner_of(&x), Some(z));
}

#[tokio::test]
async fn test_ready_teardown_does_not_requeue_old_partner() {
    init_tracing();

    let mut router = TestRouter::with_partner_requeue(true);
    let x = ConnectionId::new();
    let y = ConnectionId::new();
    pair(&mut router, x, y).await;

    // Y wants someone new; X must not be handed straight back to Y.
    router.ready(y).await;

    assert_eq!(router.drain().await, vec![outbound(x, Envelope::Leave)]);
    let snapshot = router.settle().await;
    assert_eq!(snapshot.waiting, vec![y]);
    assert!(snapshot.table.is_empty());
}
