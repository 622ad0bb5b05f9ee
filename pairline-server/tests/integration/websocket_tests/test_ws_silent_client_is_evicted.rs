use pairline_core::Envelope;
use pairline_server::RelayConfig;
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::TestRelay;

#[tokio::test]
async fn test_ws_silent_client_is_evicted() {
    init_tracing();

    let config = RelayConfig {
        ping_interval: Some(Duration::from_millis(100)),
        ..RelayConfig::default()
    };
    let relay = TestRelay::start_with(config)
        .await
        .expect("Failed to start relay");

    let mut silent = relay.connect().await.expect("Silent client failed to connect");
    let mut live = relay.connect().await.expect("Live client failed to connect");

    silent.send(&Envelope::Ready).await.expect("Send failed");
    relay
        .wait_for("silent client waiting", |s| s.waiting.len() == 1)
        .await
        .expect("Silent client never reached the pool");

    // The live client keeps reading, which answers every ping with a pong.
    // The silent one never reads again, so it never pongs.
    for _ in 0..4 {
        live.expect_silence().await.expect("Live client got an envelope");
    }

    relay
        .wait_for("silent client evicted", |s| s.waiting.is_empty())
        .await
        .expect("Silent client stayed in the pool");
    relay
        .wait_for("silent client unregistered", |_| {
            relay.state.signaling.connection_count() == 1
        })
        .await
        .expect("Live client should be the only connection left");

    // The live client is still served and waits instead of pairing with the
    // dead one.
    live.send(&Envelope::Ready).await.expect("Send failed");
    live.expect_silence().await.expect("Live client must not be paired");
    relay
        .wait_for("live client waiting", |s| s.waiting.len() == 1)
        .await
        .expect("Live client never reached the pool");
}
