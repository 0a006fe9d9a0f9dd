use tether_peer::{ClientState, EngineEventKind, PeerError, TransportState};

use crate::integration::{host_available, new_client, offer_from_host, test_config};
use crate::utils::{MockFailures, init_tracing};

#[tokio::test]
async fn test_accept_offer_failure_terminates() {
    init_tracing();
    let (mut client, mut fake, factory) = new_client(&test_config());
    factory.fail_with(MockFailures {
        accept_offer: true,
        ..MockFailures::default()
    });
    client.handle_signal(host_available()).await.unwrap();
    fake.sent();

    let err = client.handle_signal(offer_from_host("v=0")).await.unwrap_err();

    assert!(matches!(err, PeerError::Engine(_)));
    assert_eq!(client.state(), ClientState::Terminated);
    assert!(factory.last().is_closed());
    assert!(fake.sent().is_empty());
}

#[tokio::test]
async fn test_transport_failure_before_connect() {
    init_tracing();
    let (mut client, _fake, factory) = new_client(&test_config());
    client.handle_signal(host_available()).await.unwrap();
    client.handle_signal(offer_from_host("v=0")).await.unwrap();

    let err = client
        .handle_engine_event(
            factory
                .last()
                .event(EngineEventKind::StateChanged(TransportState::Failed)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PeerError::NegotiationFailed(TransportState::Failed)));
    assert_eq!(client.state(), ClientState::Terminated);
}

#[tokio::test]
async fn test_transport_closed_after_connect_ends_cleanly() {
    init_tracing();
    let (mut client, _fake, factory) = new_client(&test_config());
    client.handle_signal(host_available()).await.unwrap();
    client.handle_signal(offer_from_host("v=0")).await.unwrap();
    let engine = factory.last();
    client
        .handle_engine_event(engine.event(EngineEventKind::StateChanged(TransportState::Connected)))
        .await
        .unwrap();

    client
        .handle_engine_event(engine.event(EngineEventKind::StateChanged(TransportState::Closed)))
        .await
        .unwrap();

    assert_eq!(client.state(), ClientState::Terminated);
    assert!(engine.is_closed());
}
