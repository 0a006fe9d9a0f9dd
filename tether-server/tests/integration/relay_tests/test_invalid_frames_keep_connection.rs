use tether_core::model::{PeerRole, SignalMessage};
use tether_server::ServerConfig;

use crate::integration::{init_tracing, start_server};
use crate::utils::{SIGNAL_TIMEOUT, SILENCE_WINDOW, TestClient};

#[tokio::test]
async fn test_invalid_frames_keep_connection() {
    init_tracing();
    let server = start_server(ServerConfig::default()).await;

    let mut client = TestClient::register(server.addr, PeerRole::Client, "client_a", "r1")
        .await
        .expect("Client failed to register");

    for frame in [
        "definitely not json",
        r#"{"type":"warp_drive","sender":"client_a"}"#,
        r#"{"sender":"client_a","target":"host_1"}"#,
        r#"{"type":"offer","sender":"client_a"}"#,
        r#"{"type":"registered","peer_id":"client_a","room_id":"r1"}"#,
    ] {
        client.send_raw(frame).await.expect("Failed to send frame");
    }
    client
        .expect_silence(SILENCE_WINDOW)
        .await
        .expect("Invalid frames should produce no reply");

    let _host = TestClient::register(server.addr, PeerRole::Host, "host_1", "r1")
        .await
        .expect("Host failed to register");
    assert_eq!(
        client.recv(SIGNAL_TIMEOUT).await.expect("No host_available"),
        SignalMessage::HostAvailable {
            host_id: "host_1".into(),
            room_id: "r1".into(),
        }
    );
}
