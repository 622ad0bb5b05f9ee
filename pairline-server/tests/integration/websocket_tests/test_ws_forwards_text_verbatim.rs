use pairline_core::Envelope;

use crate::integration::init_tracing;
use crate::utils::TestRelay;

#[tokio::test]
async fn test_ws_forwards_text_verbatim() {
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

    let offer = r#"{"type":"offer","offer":{"type":"offer","sdp":"v=0\r\ns=o1\r\n"},"from":"y-tab-2","trace":{"z":1,"a":123456789012345678901234567890}}"#;
    y.send_raw(offer).await.expect("Send failed");
    assert_eq!(x.recv_text().await.expect("X got no offer"), offer);

    let candidate = "{\"candidate\": {\"candidate\": \"candidate:1 1 udp 1 192.0.2.1 3478 typ host\", \"sdpMLineIndex\": 0},\n \"type\": \"candidate\"}";
    x.send_raw(candidate).await.expect("Send failed");
    assert_eq!(y.recv_text().await.expect("Y got no candidate"), candidate);
}
