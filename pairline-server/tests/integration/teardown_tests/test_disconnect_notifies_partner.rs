use pairline_core::{ConnectionId, Envelope};
use serde_json::json;

use crate::integration::init_tracing;
use crate::utils::{TestRouter, outbound, pair};

#[tokio::test]
async fn test_disconnect_notifies_partner() {
    init_tracing();

    let mut router = TestRouter::new();
    let x = ConnectionId::new();
    let y = ConnectionId::new();
    pair(&mut router, x, y).await;

    // Resolves only after the router has dropped every trace of Y.
    router.disconnect(y).await;

    assert_eq!(router.drain().await, vec![outbound(x, Envelope::Leave)]);

    let snapshot = router.settle().await;
    assert!(snapshot.table.is_empty());
    assert!(snapshot.waiting.is_empty());

    // Late frames from the survivor have nowhere to go.
    router
        .send(
            x,
            Envelope::Candidate {
                candidate: json!({ "candidate": "late" }),
            },
        )
        .await;
    assert!(router.drain().await.is_empty());
}
