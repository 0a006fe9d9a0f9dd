use tether_core::model::{PeerId, SignalMessage};
use tether_peer::{EngineEventKind, TransportState};

use crate::integration::{ROOM, answer_from, client_ready, new_host, test_config};
use crate::utils::init_tracing;

fn client_disconnected(client: &str) -> SignalMessage {
    SignalMessage::ClientDisconnected {
        peer_id: client.into(),
        room_id: ROOM.into(),
    }
}

#[tokio::test]
async fn test_departure_while_negotiating_closes_session() {
    init_tracing();
    let (mut host, _fake, factory) = new_host(&test_config());
    host.handle_signal(client_ready("client_a")).await;

    host.handle_signal(client_disconnected("client_a")).await;

    assert_eq!(host.client_count(), 0);
    assert!(factory.last().is_closed());
}

#[tokio::test]
async fn test_departure_after_connect_keeps_session() {
    init_tracing();
    let (mut host, _fake, factory) = new_host(&test_config());
    host.handle_signal(client_ready("client_a")).await;
    host.handle_signal(answer_from("client_a")).await;
    let engine = factory.last();
    host.handle_engine_event(engine.event(EngineEventKind::StateChanged(TransportState::Connected)))
        .await;

    host.handle_signal(client_disconnected("client_a")).await;

    assert!(host.client_state(&PeerId::from("client_a")).is_some());
    assert_eq!(host.connected_count(), 1);
    assert!(!engine.is_closed());
}

#[tokio::test]
async fn test_departure_after_answer_keeps_session() {
    init_tracing();
    let (mut host, _fake, factory) = new_host(&test_config());
    host.handle_signal(client_ready("client_a")).await;
    host.handle_signal(answer_from("client_a")).await;
    let engine = factory.last();
    host.handle_engine_event(engine.event(EngineEventKind::StateChanged(TransportState::Connecting)))
        .await;

    host.handle_signal(client_disconnected("client_a")).await;

    assert!(host.client_state(&PeerId::from("client_a")).is_some());
    assert!(!engine.is_closed());
}
