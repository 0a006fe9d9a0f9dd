use tether_core::model::{PeerId, PeerRole, SignalMessage};
use tether_server::ServerConfig;

use crate::integration::{init_tracing, start_server};
use crate::utils::{SIGNAL_TIMEOUT, TestClient};

#[tokio::test]
async fn test_host_then_client() {
    init_tracing();
    let server = start_server(ServerConfig::default()).await;

    let mut host = TestClient::register(server.addr, PeerRole::Host, "host_1", "r1")
        .await
        .expect("Host failed to register");
    let mut client = TestClient::register(server.addr, PeerRole::Client, "client_a", "r1")
        .await
        .expect("Client failed to register");

    let msg = client.recv(SIGNAL_TIMEOUT).await.expect("No host_available");
    assert_eq!(
        msg,
        SignalMessage::HostAvailable {
            host_id: "host_1".into(),
            room_id: "r1".into(),
        }
    );

    let msg = host.recv(SIGNAL_TIMEOUT).await.expect("No clients_available");
    assert_eq!(
        msg,
        SignalMessage::ClientsAvailable {
            client_ids: vec!["client_a".into()],
            room_id: "r1".into(),
        }
    );

    let snapshot = server.service.snapshot(&"r1".into()).await;
    assert_eq!(snapshot.host, Some("host_1".into()));
    assert_eq!(snapshot.clients, vec![PeerId::from("client_a")]);
}
