use crate::config::PeerConfig;
use crate::engine::{
    EngineEvent, EngineEventKind, EngineFactory, EngineId, NegotiationEngine, TransportState,
};
use crate::error::PeerError;
use crate::rendezvous::RendezvousLink;
use crate::session::{HostPeerState, next_signal};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tether_core::model::{IceCandidate, PeerId, PeerRole, RoomId, SessionDescription, SignalMessage};
use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at};
use tracing::{debug, error, info, warn};

struct ClientPeer {
    engine: Box<dyn NegotiationEngine>,
    state: HostPeerState,
    transport: TransportState,
}

impl ClientPeer {
    /// Answer applied and transport not dead: the direct connection can come
    /// up or stay up without further signaling.
    fn is_established(&self) -> bool {
        self.state == HostPeerState::Connected && !self.transport.is_terminal()
    }
}

/// Streaming side: one independent engine connection per ready client.
pub struct HostSession {
    peer_id: PeerId,
    room_id: RoomId,
    link: Option<RendezvousLink>,
    factory: Arc<dyn EngineFactory>,
    clients: HashMap<PeerId, ClientPeer>,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: mpsc::UnboundedReceiver<EngineEvent>,
    sweep_interval: Duration,
    status_interval: Duration,
    started: Instant,
}

impl HostSession {
    /// Connects to the rendezvous server and registers as the room's host.
    pub async fn connect(
        config: &PeerConfig,
        factory: Arc<dyn EngineFactory>,
    ) -> Result<Self, PeerError> {
        info!("Connecting to rendezvous server at {}", config.signaling_url);
        let (link, peer_id) = RendezvousLink::connect_and_register(
            &config.signaling_url,
            PeerRole::Host,
            config.peer_id.clone(),
            config.room_id.clone(),
            config.register_timeout,
        )
        .await?;
        Ok(Self::new(config, peer_id, link, factory))
    }

    pub fn new(
        config: &PeerConfig,
        peer_id: PeerId,
        link: RendezvousLink,
        factory: Arc<dyn EngineFactory>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            peer_id,
            room_id: config.room_id.clone(),
            link: Some(link),
            factory,
            clients: HashMap::new(),
            events_tx,
            events_rx,
            sweep_interval: config.sweep_interval,
            status_interval: config.status_interval,
            started: Instant::now(),
        }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn has_rendezvous(&self) -> bool {
        self.link.is_some()
    }

    pub fn client_state(&self, client: &PeerId) -> Option<HostPeerState> {
        self.clients.get(client).map(|c| c.state)
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Clients whose direct connection is currently up.
    pub fn connected_count(&self) -> usize {
        self.clients
            .values()
            .filter(|c| c.transport == TransportState::Connected)
            .count()
    }

    /// Nothing left to serve and no way to acquire new clients.
    pub fn is_finished(&self) -> bool {
        self.link.is_none() && self.clients.is_empty()
    }

    pub async fn run(mut self) -> Result<(), PeerError> {
        let mut sweep = interval_at(Instant::now() + self.sweep_interval, self.sweep_interval);
        let mut status = interval_at(Instant::now() + self.status_interval, self.status_interval);

        info!("Host {} streaming to room {}", self.peer_id, self.room_id);
        while !self.is_finished() {
            tokio::select! {
                msg = next_signal(&mut self.link) => match msg {
                    Some(msg) => self.handle_signal(msg).await,
                    None => self.on_rendezvous_closed().await,
                },
                Some(event) = self.events_rx.recv() => self.handle_engine_event(event).await,
                _ = sweep.tick() => {
                    self.sweep().await;
                }
                _ = status.tick() => self.log_status(),
            }
        }

        info!("No clients left and rendezvous unavailable, host stopping");
        Ok(())
    }

    pub async fn handle_signal(&mut self, msg: SignalMessage) {
        match msg {
            SignalMessage::ClientReady { sender, .. } => self.on_client_ready(sender).await,
            SignalMessage::Answer { sender, answer, .. } => self.on_answer(sender, answer).await,
            SignalMessage::IceCandidate {
                sender, candidate, ..
            } => self.on_remote_candidate(sender, candidate).await,
            SignalMessage::ClientsAvailable { client_ids, room_id } => {
                info!("Clients in room {}: {:?}", room_id, client_ids);
            }
            SignalMessage::ClientDisconnected { peer_id, .. } => {
                self.on_client_disconnected(peer_id).await;
            }
            SignalMessage::Registered { peer_id, room_id } => {
                info!("Registered as {} in room {}", peer_id, room_id);
            }
            other => debug!("Ignoring {} on host", other.kind()),
        }
    }

    async fn on_client_ready(&mut self, client: PeerId) {
        info!("Client {} ready, creating offer", client);
        if self.remove_client(&client).await {
            info!("Replaced previous connection to {}", client);
        }

        let engine_id = EngineId::next();
        let engine = match self
            .factory
            .open(&client, engine_id, self.events_tx.clone())
            .await
        {
            Ok(engine) => engine,
            Err(e) => {
                error!("Failed to open connection for {}: {:#}", client, e);
                return;
            }
        };

        let offer = match engine.create_offer().await {
            Ok(offer) => offer,
            Err(e) => {
                error!("Failed to create offer for {}: {:#}", client, e);
                let _ = engine.close().await;
                return;
            }
        };

        self.clients.insert(
            client.clone(),
            ClientPeer {
                engine,
                state: HostPeerState::Negotiating,
                transport: TransportState::New,
            },
        );
        self.send(SignalMessage::Offer {
            sender: self.peer_id.clone(),
            target: client.clone(),
            offer,
        });
        info!("Sent offer to {}", client);
    }

    async fn on_answer(&mut self, client: PeerId, answer: SessionDescription) {
        let Some(peer) = self.clients.get_mut(&client) else {
            warn!("Answer from unknown client {}", client);
            return;
        };
        if peer.state != HostPeerState::Negotiating {
            warn!("Unexpected answer from {} in state {}", client, peer.state);
            return;
        }

        let applied = peer.engine.accept_answer(answer).await;
        match applied {
            Ok(()) => {
                peer.state = HostPeerState::Connected;
                info!("Applied answer from {}", client);
            }
            Err(e) => {
                error!("Failed to apply answer from {}: {:#}", client, e);
                self.remove_client(&client).await;
            }
        }
    }

    async fn on_remote_candidate(&mut self, client: PeerId, candidate: IceCandidate) {
        let Some(peer) = self.clients.get(&client) else {
            debug!("Candidate from unknown client {}", client);
            return;
        };
        let added = peer.engine.add_ice_candidate(candidate).await;
        if let Err(e) = added {
            error!("Failed to add candidate from {}: {:#}", client, e);
            self.remove_client(&client).await;
        }
    }

    async fn on_client_disconnected(&mut self, client: PeerId) {
        match self.clients.get(&client) {
            Some(peer) if peer.is_established() => {
                info!("Client {} left the rendezvous server, direct connection continues", client);
            }
            Some(_) => {
                info!("Client {} disconnected before connecting", client);
                self.remove_client(&client).await;
            }
            None => debug!("Client {} disconnected", client),
        }
    }

    pub async fn handle_engine_event(&mut self, event: EngineEvent) {
        let Some(client) = self.client_for(event.engine) else {
            debug!("Ignoring event from discarded {}", event.engine);
            return;
        };

        match event.kind {
            EngineEventKind::StateChanged(state) => {
                if let Some(peer) = self.clients.get_mut(&client) {
                    peer.transport = state;
                }
                if state == TransportState::Connected {
                    info!("Direct connection to {} established", client);
                } else if state.is_terminal() {
                    info!("Direct connection to {} {}", client, state);
                    self.remove_client(&client).await;
                }
            }
            EngineEventKind::CandidateDiscovered(candidate) => {
                self.send(SignalMessage::IceCandidate {
                    sender: self.peer_id.clone(),
                    target: client,
                    candidate,
                });
            }
            EngineEventKind::MediaReceived => debug!("Unexpected inbound media from {}", client),
        }
    }

    /// Without rendezvous, clients still waiting for an answer can never finish.
    pub async fn on_rendezvous_closed(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.close();
        }

        let stranded: Vec<PeerId> = self
            .clients
            .iter()
            .filter(|(_, peer)| !peer.is_established())
            .map(|(id, _)| id.clone())
            .collect();
        for client in &stranded {
            self.remove_client(client).await;
        }

        if self.clients.is_empty() {
            warn!("Rendezvous connection lost and no clients connected");
        } else {
            info!(
                "Rendezvous connection lost, still serving {} client(s) in P2P mode",
                self.clients.len()
            );
        }
    }

    /// Removes every client whose engine reports a terminal state.
    pub async fn sweep(&mut self) -> usize {
        let dead: Vec<PeerId> = self
            .clients
            .iter()
            .filter(|(_, peer)| peer.engine.state().is_terminal())
            .map(|(id, _)| id.clone())
            .collect();

        for client in &dead {
            info!("Pruning dead connection to {}", client);
            self.remove_client(client).await;
        }
        dead.len()
    }

    fn client_for(&self, engine: EngineId) -> Option<PeerId> {
        self.clients
            .iter()
            .find(|(_, peer)| peer.engine.id() == engine)
            .map(|(id, _)| id.clone())
    }

    async fn remove_client(&mut self, client: &PeerId) -> bool {
        let Some(peer) = self.clients.remove(client) else {
            return false;
        };
        if let Err(e) = peer.engine.close().await {
            debug!("Closing connection to {} failed: {:#}", client, e);
        }
        true
    }

    fn log_status(&self) {
        let mode = if self.link.is_some() { "signaling" } else { "P2P only" };
        info!(
            "Status: {} mode, {} client(s), {} connected, up {:?}",
            mode,
            self.clients.len(),
            self.connected_count(),
            self.started.elapsed()
        );
    }

    fn send(&self, msg: SignalMessage) {
        match &self.link {
            Some(link) => {
                if !link.send(msg) {
                    debug!("Rendezvous link closed, message dropped");
                }
            }
            None => debug!("No rendezvous link, {} dropped", msg.kind()),
        }
    }
}
