use tether_core::model::{IceCandidate, SignalMessage};
use tether_peer::{ClientState, EngineEventKind, TransportState};

use crate::integration::{HOST, host_available, new_client, offer_from_host, test_config};
use crate::utils::{MockCall, init_tracing};

fn candidate(text: &str) -> IceCandidate {
    IceCandidate {
        candidate: text.into(),
        sdp_mid: Some("0".into()),
        sdp_mline_index: Some(0),
    }
}

#[tokio::test]
async fn test_local_candidates_stop_after_connect() {
    init_tracing();
    let (mut client, mut fake, factory) = new_client(&test_config());
    client.handle_signal(host_available()).await.unwrap();
    client.handle_signal(offer_from_host("v=0")).await.unwrap();
    fake.sent();
    let engine = factory.last();

    client
        .handle_engine_event(engine.event(EngineEventKind::CandidateDiscovered(candidate("c1"))))
        .await
        .unwrap();
    assert!(matches!(
        fake.sent().as_slice(),
        [SignalMessage::IceCandidate { target, candidate, .. }]
            if target.as_str() == HOST && candidate.candidate == "c1"
    ));

    client
        .handle_engine_event(engine.event(EngineEventKind::StateChanged(TransportState::Connected)))
        .await
        .unwrap();
    client
        .handle_engine_event(engine.event(EngineEventKind::CandidateDiscovered(candidate("c2"))))
        .await
        .unwrap();

    assert_eq!(client.state(), ClientState::Connected);
    assert!(fake.sent().is_empty());
}

#[tokio::test]
async fn test_remote_candidates_reach_engine() {
    init_tracing();
    let (mut client, _fake, factory) = new_client(&test_config());
    client.handle_signal(host_available()).await.unwrap();

    // Before any offer there is nothing to add it to.
    client
        .handle_signal(SignalMessage::IceCandidate {
            sender: HOST.into(),
            target: "client_a".into(),
            candidate: candidate("early"),
        })
        .await
        .unwrap();
    assert!(factory.opened().is_empty());

    client.handle_signal(offer_from_host("v=0")).await.unwrap();
    client
        .handle_signal(SignalMessage::IceCandidate {
            sender: HOST.into(),
            target: "client_a".into(),
            candidate: candidate("remote"),
        })
        .await
        .unwrap();

    assert_eq!(
        factory.last().calls(),
        vec![
            MockCall::AcceptOffer("v=0".into()),
            MockCall::AddCandidate("remote".into()),
        ]
    );
}
