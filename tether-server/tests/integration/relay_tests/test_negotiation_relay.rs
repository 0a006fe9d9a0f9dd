use tether_core::model::{IceCandidate, PeerRole, SessionDescription, SignalMessage};
use tether_server::ServerConfig;

use crate::integration::{init_tracing, start_server};
use crate::utils::{SIGNAL_TIMEOUT, TestClient};

#[tokio::test]
async fn test_negotiation_relay() {
    init_tracing();
    let server = start_server(ServerConfig::default()).await;

    let mut host = TestClient::register(server.addr, PeerRole::Host, "host_1", "r1")
        .await
        .expect("Host failed to register");
    let mut client = TestClient::register(server.addr, PeerRole::Client, "client_a", "r1")
        .await
        .expect("Client failed to register");
    client.recv(SIGNAL_TIMEOUT).await.expect("No host_available");
    host.recv(SIGNAL_TIMEOUT).await.expect("No clients_available");

    // Relayed frames arrive byte-for-byte, unknown fields included.
    let ready = r#"{"type":"client_ready","sender":"client_a","target":"host_1","note":"hi"}"#;
    client.send_raw(ready).await.expect("Failed to send client_ready");
    assert_eq!(host.recv_raw(SIGNAL_TIMEOUT).await.expect("No client_ready"), ready);

    let offer = SignalMessage::Offer {
        sender: "host_1".into(),
        target: "client_a".into(),
        offer: SessionDescription::offer("v=0 offer"),
    };
    host.send(&offer).await.expect("Failed to send offer");
    assert_eq!(client.recv(SIGNAL_TIMEOUT).await.expect("No offer"), offer);

    let answer = SignalMessage::Answer {
        sender: "client_a".into(),
        target: "host_1".into(),
        answer: SessionDescription::answer("v=0 answer"),
    };
    client.send(&answer).await.expect("Failed to send answer");
    assert_eq!(host.recv(SIGNAL_TIMEOUT).await.expect("No answer"), answer);

    let candidate = SignalMessage::IceCandidate {
        sender: "client_a".into(),
        target: "host_1".into(),
        candidate: IceCandidate {
            candidate: "candidate:1 1 UDP 2122252543 192.168.1.2 50000 typ host".into(),
            sdp_mid: Some("0".into()),
            sdp_mline_index: Some(0),
        },
    };
    client.send(&candidate).await.expect("Failed to send candidate");
    assert_eq!(host.recv(SIGNAL_TIMEOUT).await.expect("No candidate"), candidate);
}

#[tokio::test]
async fn test_opaque_payloads_are_relayed() {
    init_tracing();
    let server = start_server(ServerConfig::default()).await;

    let mut host = TestClient::register(server.addr, PeerRole::Host, "host_1", "r1")
        .await
        .expect("Host failed to register");
    let mut client = TestClient::register(server.addr, PeerRole::Client, "client_a", "r1")
        .await
        .expect("Client failed to register");
    client.recv(SIGNAL_TIMEOUT).await.expect("No host_available");
    host.recv(SIGNAL_TIMEOUT).await.expect("No clients_available");

    // Payload shapes the peers' own model would reject still reach the target.
    for frame in [
        r#"{"type":"ice_candidate","sender":"client_a","target":"host_1","candidate":{"candidate":null}}"#,
        r#"{"type":"ice_candidate","sender":"client_a","target":"host_1","candidate":{"candidate":"c","sdpMLineIndex":"0"}}"#,
        r#"{"type":"answer","sender":"client_a","target":"host_1","answer":{"sdp":"v=0"}}"#,
        r#"{"type":"client_ready","target":"host_1"}"#,
    ] {
        client.send_raw(frame).await.expect("Failed to send frame");
        assert_eq!(host.recv_raw(SIGNAL_TIMEOUT).await.expect("Frame not relayed"), frame);
    }
}
