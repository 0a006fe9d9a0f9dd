pub mod host_tests;

use std::sync::Arc;
use std::time::Duration;
use tether_core::model::{PeerId, SessionDescription, SignalMessage};
use tether_peer::{ClientSession, HostSession, PeerConfig};

use crate::utils::{FakeRendezvous, MockEngineFactory, link_pair};

pub const HOST: &str = "host_1";
pub const CLIENT: &str = "client_a";
pub const ROOM: &str = "r1";

pub fn test_config() -> PeerConfig {
    PeerConfig {
        room_id: ROOM.into(),
        stream_timeout: Duration::from_secs(10),
        ..PeerConfig::default()
    }
}

pub fn new_client(config: &PeerConfig) -> (ClientSession, FakeRendezvous, MockEngineFactory) {
    let (link, fake) = link_pair();
    let factory = MockEngineFactory::new();
    let session = ClientSession::new(config, PeerId::from(CLIENT), link, Arc::new(factory.clone()));
    (session, fake, factory)
}

pub fn new_host(config: &PeerConfig) -> (HostSession, FakeRendezvous, MockEngineFactory) {
    let (link, fake) = link_pair();
    let factory = MockEngineFactory::new();
    let session = HostSession::new(config, PeerId::from(HOST), link, Arc::new(factory.clone()));
    (session, fake, factory)
}

pub fn host_available() -> SignalMessage {
    SignalMessage::HostAvailable {
        host_id: HOST.into(),
        room_id: ROOM.into(),
    }
}

pub fn offer_from_host(sdp: &str) -> SignalMessage {
    SignalMessage::Offer {
        sender: HOST.into(),
        target: CLIENT.into(),
        offer: SessionDescription::offer(sdp),
    }
}

pub fn client_ready(client: &str) -> SignalMessage {
    SignalMessage::ClientReady {
        sender: client.into(),
        target: HOST.into(),
    }
}

pub fn answer_from(client: &str) -> SignalMessage {
    SignalMessage::Answer {
        sender: client.into(),
        target: HOST.into(),
        answer: SessionDescription::answer(format!("answer-from-{client}")),
    }
}
