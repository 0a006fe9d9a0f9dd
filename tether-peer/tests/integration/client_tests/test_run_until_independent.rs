use tether_core::model::SignalMessage;
use tether_peer::{ClientState, EngineEventKind, TransportState};

use crate::integration::{host_available, new_client, offer_from_host, test_config};
use crate::utils::{WAIT_TIMEOUT, init_tracing, wait_until};

#[tokio::test]
async fn test_run_until_independent() {
    init_tracing();
    let (client, mut fake, factory) = new_client(&test_config());
    let mut state = client.subscribe();
    let task = tokio::spawn(client.run());

    fake.deliver(host_available());
    assert!(matches!(
        fake.next_sent().await,
        Some(SignalMessage::ClientReady { .. })
    ));

    fake.deliver(offer_from_host("v=0"));
    assert!(matches!(fake.next_sent().await, Some(SignalMessage::Answer { .. })));
    assert!(wait_until(|| factory.opened().len() == 1).await);
    let engine = factory.last();

    engine.emit(EngineEventKind::StateChanged(TransportState::Connected));
    tokio::time::timeout(WAIT_TIMEOUT, state.wait_for(|s| *s == ClientState::Connected))
        .await
        .unwrap()
        .unwrap();

    // Rendezvous server goes away; the direct connection carries on.
    fake.disconnect();
    tokio::time::timeout(WAIT_TIMEOUT, state.wait_for(|s| *s == ClientState::Independent))
        .await
        .unwrap()
        .unwrap();
    assert!(!engine.is_closed());

    engine.emit(EngineEventKind::StateChanged(TransportState::Closed));
    let result = tokio::time::timeout(WAIT_TIMEOUT, task).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_run_ends_when_rendezvous_lost_early() {
    init_tracing();
    let (client, mut fake, _factory) = new_client(&test_config());
    let task = tokio::spawn(client.run());

    fake.disconnect();

    let result = tokio::time::timeout(WAIT_TIMEOUT, task).await.unwrap().unwrap();
    assert!(matches!(result, Err(tether_peer::PeerError::RendezvousLost)));
}
