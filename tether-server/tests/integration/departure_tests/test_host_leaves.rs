use tether_core::model::{PeerRole, SignalMessage};
use tether_server::ServerConfig;

use crate::integration::{init_tracing, start_server};
use crate::utils::{SIGNAL_TIMEOUT, TestClient};

#[tokio::test]
async fn test_host_leaves() {
    init_tracing();
    let server = start_server(ServerConfig::default()).await;

    let host = TestClient::register(server.addr, PeerRole::Host, "host_1", "r1")
        .await
        .expect("Host failed to register");
    let mut client_a = TestClient::register(server.addr, PeerRole::Client, "client_a", "r1")
        .await
        .expect("Client A failed to register");
    let mut client_b = TestClient::register(server.addr, PeerRole::Client, "client_b", "r1")
        .await
        .expect("Client B failed to register");

    // client_a hears about the host twice: once for itself, once when b joins.
    for _ in 0..2 {
        assert!(matches!(
            client_a.recv(SIGNAL_TIMEOUT).await.expect("No host_available"),
            SignalMessage::HostAvailable { .. }
        ));
    }
    client_b.recv(SIGNAL_TIMEOUT).await.expect("No host_available");

    host.close().await.expect("Failed to close host");

    let expected = SignalMessage::HostDisconnected {
        peer_id: "host_1".into(),
        room_id: "r1".into(),
    };
    assert_eq!(client_a.recv(SIGNAL_TIMEOUT).await.expect("No notice"), expected);
    assert_eq!(client_b.recv(SIGNAL_TIMEOUT).await.expect("No notice"), expected);

    assert!(!server.service.registry().contains(&"host_1".into()));
    let snapshot = server.service.snapshot(&"r1".into()).await;
    assert_eq!(snapshot.host, None);
    assert_eq!(snapshot.clients.len(), 2);
}
