use tether_peer::{ClientState, EngineEventKind, PeerError, TransportState};

use crate::integration::{host_available, new_client, offer_from_host, test_config};
use crate::utils::init_tracing;

#[tokio::test]
async fn test_loss_after_connect_goes_independent() {
    init_tracing();
    let (mut client, _fake, factory) = new_client(&test_config());
    client.handle_signal(host_available()).await.unwrap();
    client.handle_signal(offer_from_host("v=0")).await.unwrap();
    let engine = factory.last();
    client
        .handle_engine_event(engine.event(EngineEventKind::StateChanged(TransportState::Connected)))
        .await
        .unwrap();

    client.on_rendezvous_closed().unwrap();

    assert_eq!(client.state(), ClientState::Independent);
    assert!(!engine.is_closed());
}

#[tokio::test]
async fn test_loss_while_negotiating_waits_for_transport() {
    init_tracing();
    let (mut client, _fake, factory) = new_client(&test_config());
    client.handle_signal(host_available()).await.unwrap();
    client.handle_signal(offer_from_host("v=0")).await.unwrap();

    client.on_rendezvous_closed().unwrap();
    assert_eq!(client.state(), ClientState::Negotiating);

    client
        .handle_engine_event(
            factory
                .last()
                .event(EngineEventKind::StateChanged(TransportState::Connected)),
        )
        .await
        .unwrap();
    assert_eq!(client.state(), ClientState::Independent);
}

#[tokio::test]
async fn test_loss_before_offer_terminates() {
    init_tracing();
    let (mut client, _fake, _factory) = new_client(&test_config());
    client.handle_signal(host_available()).await.unwrap();

    let err = client.on_rendezvous_closed().unwrap_err();

    assert!(matches!(err, PeerError::RendezvousLost));
    assert_eq!(client.state(), ClientState::Terminated);
}
