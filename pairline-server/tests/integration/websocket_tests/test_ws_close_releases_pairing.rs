use pairline_core::Envelope;

use crate::integration::init_tracing;
use crate::utils::TestRelay;

#[tokio::test]
async fn test_ws_close_releases_pairing() {
    init_tracing();

    let relay = TestRelay::start().await.expect("Failed to start relay");
    let mut x = relay.connect().await.expect("X failed to connect");
    let mut y = relay.connect().await.expect("Y failed to connect");

    x.send(&Envelope::Ready).await.expect("Send failed");
    relay
        .wait_for("X waiting", |s| s.waiting.len() == 1)
        .await
        .expect("X never reached the pool");
    y.send(&Envelope::Ready).await.expect("Send failed");
    assert_eq!(y.recv().await.expect("Y got nothing"), Envelope::StartOffer);

    y.close().await.expect("Failed to close Y");

    assert_eq!(x.recv().await.expect("X got no leave"), Envelope::Leave);
    let snapshot = relay
        .wait_for("table emptied", |s| s.table.is_empty())
        .await
        .expect("Pairing survived the close");
    assert!(snapshot.waiting.is_empty());
    assert!(snapshot.is_consistent());

    x.close().await.expect("Failed to close X");
    relay
        .wait_for("registry emptied", |_| relay.state.signaling.connection_count() == 0)
        .await
        .expect("Connections never unregistered");
}

#[tokio::test]
async fn test_ws_waiting_client_drop_empties_pool() {
    init_tracing();

    let relay = TestRelay::start().await.expect("Failed to start relay");
    let mut x = relay.connect().await.expect("X failed to connect");

    x.send(&Envelope::Ready).await.expect("Send failed");
    relay
        .wait_for("X waiting", |s| s.waiting.len() == 1)
        .await
        .expect("X never reached the pool");

    // No close handshake: the socket just goes away.
    drop(x);

    relay
        .wait_for("pool emptied", |s| s.waiting.is_empty())
        .await
        .expect("Dropped client left in the pool");

    let mut y = relay.connect().await.expect("Y failed to connect");
    y.send(&Envelope::Ready).await.expect("Send failed");
    y.expect_silence().await.expect("Y must not pair with a dead peer");
}
