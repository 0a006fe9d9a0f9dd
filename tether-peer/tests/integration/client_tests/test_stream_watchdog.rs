use std::time::Duration;
use tether_peer::{ClientState, EngineEventKind};

use crate::integration::{host_available, new_client, offer_from_host, test_config};
use crate::utils::init_tracing;

#[tokio::test(start_paused = true)]
async fn test_watchdog_warns_once_without_terminating() {
    init_tracing();
    let (mut client, _fake, _factory) = new_client(&test_config());
    client.handle_signal(host_available()).await.unwrap();
    assert!(!client.check_watchdog());

    client.handle_signal(offer_from_host("v=0")).await.unwrap();

    tokio::time::advance(Duration::from_secs(9)).await;
    assert!(!client.check_watchdog());

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(client.check_watchdog());
    assert!(!client.check_watchdog());
    assert_eq!(client.state(), ClientState::Negotiating);
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_quiet_once_media_flows() {
    init_tracing();
    let (mut client, _fake, factory) = new_client(&test_config());
    client.handle_signal(host_available()).await.unwrap();
    client.handle_signal(offer_from_host("v=0")).await.unwrap();

    client
        .handle_engine_event(factory.last().event(EngineEventKind::MediaReceived))
        .await
        .unwrap();
    tokio::time::advance(Duration::from_secs(30)).await;

    assert!(!client.check_watchdog());
}
