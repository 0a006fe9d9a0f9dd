use crate::config::PeerConfig;
use crate::engine::{
    EngineEvent, EngineEventKind, EngineFactory, EngineId, NegotiationEngine, TransportState,
};
use crate::error::PeerError;
use crate::media::CountingSink;
use crate::rendezvous::RendezvousLink;
use crate::session::{ClientState, next_signal};
use std::sync::Arc;
use std::time::Duration;
use tether_core::model::{IceCandidate, PeerId, PeerRole, RoomId, SessionDescription, SignalMessage};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, interval, interval_at};
use tracing::{debug, info, warn};

const WATCHDOG_TICK: Duration = Duration::from_secs(1);

/// Viewer side: finds the room's host, answers its offer and keeps the
/// direct connection alive whether or not the rendezvous link survives.
pub struct ClientSession {
    peer_id: PeerId,
    room_id: RoomId,
    link: Option<RendezvousLink>,
    factory: Arc<dyn EngineFactory>,
    engine: Option<Box<dyn NegotiationEngine>>,
    host: Option<PeerId>,
    state: watch::Sender<ClientState>,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: mpsc::UnboundedReceiver<EngineEvent>,
    /// Local candidates are only worth relaying until the direct path is up.
    signaling_needed: bool,
    negotiation_started: Option<Instant>,
    media_seen: bool,
    watchdog_warned: bool,
    media_counter: Option<Arc<CountingSink>>,
    stream_timeout: Duration,
    status_interval: Duration,
    close_signaling_on_connect: bool,
}

impl ClientSession {
    /// Connects to the rendezvous server and registers as a client.
    pub async fn connect(
        config: &PeerConfig,
        factory: Arc<dyn EngineFactory>,
    ) -> Result<Self, PeerError> {
        info!("Connecting to rendezvous server at {}", config.signaling_url);
        let (link, peer_id) = RendezvousLink::connect_and_register(
            &config.signaling_url,
            PeerRole::Client,
            config.peer_id.clone(),
            config.room_id.clone(),
            config.register_timeout,
        )
        .await?;
        Ok(Self::new(config, peer_id, link, factory))
    }

    /// Wraps an already registered link.
    pub fn new(
        config: &PeerConfig,
        peer_id: PeerId,
        link: RendezvousLink,
        factory: Arc<dyn EngineFactory>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(ClientState::Registered);
        Self {
            peer_id,
            room_id: config.room_id.clone(),
            link: Some(link),
            factory,
            engine: None,
            host: None,
            state,
            events_tx,
            events_rx,
            signaling_needed: true,
            negotiation_started: None,
            media_seen: false,
            watchdog_warned: false,
            media_counter: None,
            stream_timeout: config.stream_timeout,
            status_interval: config.status_interval,
            close_signaling_on_connect: config.close_signaling_on_connect,
        }
    }

    /// Packet counts from this sink show up in the status line.
    pub fn with_media_counter(mut self, counter: Arc<CountingSink>) -> Self {
        self.media_counter = Some(counter);
        self
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn state(&self) -> ClientState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ClientState> {
        self.state.subscribe()
    }

    pub fn host(&self) -> Option<&PeerId> {
        self.host.as_ref()
    }

    pub fn has_rendezvous(&self) -> bool {
        self.link.is_some()
    }

    /// Runs until the session terminates. `Ok` means a direct connection was
    /// established and later ended.
    pub async fn run(mut self) -> Result<(), PeerError> {
        let result = self.drive().await;
        self.shutdown().await;
        result
    }

    async fn drive(&mut self) -> Result<(), PeerError> {
        let mut watchdog = interval(WATCHDOG_TICK);
        let mut status = interval_at(Instant::now() + self.status_interval, self.status_interval);

        while self.state() != ClientState::Terminated {
            tokio::select! {
                msg = next_signal(&mut self.link) => match msg {
                    Some(msg) => self.handle_signal(msg).await?,
                    None => self.on_rendezvous_closed()?,
                },
                Some(event) = self.events_rx.recv() => self.handle_engine_event(event).await?,
                _ = watchdog.tick() => {
                    self.check_watchdog();
                }
                _ = status.tick() => self.log_status(),
            }
        }
        Ok(())
    }

    pub async fn handle_signal(&mut self, msg: SignalMessage) -> Result<(), PeerError> {
        match msg {
            SignalMessage::HostAvailable { host_id, room_id } => {
                self.on_host_available(host_id, room_id).await;
            }
            SignalMessage::Offer { sender, offer, .. } => self.on_offer(sender, offer).await?,
            SignalMessage::IceCandidate {
                sender, candidate, ..
            } => self.on_remote_candidate(sender, candidate).await?,
            SignalMessage::HostDisconnected { peer_id, .. } => {
                self.on_host_disconnected(peer_id).await;
            }
            SignalMessage::Registered { peer_id, room_id } => {
                info!("Registered as {} in room {}", peer_id, room_id);
            }
            other => debug!("Ignoring {} in state {}", other.kind(), self.state()),
        }
        Ok(())
    }

    async fn on_host_available(&mut self, host_id: PeerId, room_id: RoomId) {
        if room_id != self.room_id {
            warn!("Ignoring host {} announced for room {}", host_id, room_id);
            return;
        }

        if self.state().is_direct() && self.host.as_ref() == Some(&host_id) {
            info!("Host {} announced again, assuming it restarted", host_id);
        } else {
            info!("Host available: {}", host_id);
        }

        self.discard_engine().await;
        self.signaling_needed = true;
        self.negotiation_started = None;
        self.media_seen = false;
        self.watchdog_warned = false;

        self.send(SignalMessage::ClientReady {
            sender: self.peer_id.clone(),
            target: host_id.clone(),
        });
        self.host = Some(host_id);
        self.set_state(ClientState::AwaitingOffer);
    }

    async fn on_offer(&mut self, sender: PeerId, offer: SessionDescription) -> Result<(), PeerError> {
        if self.host.as_ref() != Some(&sender) {
            warn!("Ignoring offer from {}, not the current host", sender);
            return Ok(());
        }

        match self.state() {
            ClientState::AwaitingOffer => {}
            ClientState::Negotiating | ClientState::Connected => {
                info!("Host {} renegotiating", sender);
                self.discard_engine().await;
            }
            state => {
                warn!("Ignoring offer from {} in state {}", sender, state);
                return Ok(());
            }
        }

        info!("Received offer from host {}", sender);
        let engine_id = EngineId::next();
        let opened = self
            .factory
            .open(&sender, engine_id, self.events_tx.clone())
            .await;
        let engine = match opened {
            Ok(engine) => engine,
            Err(e) => return Err(self.fail(e)),
        };

        let accepted = engine.accept_offer(offer).await;
        let answer = match accepted {
            Ok(answer) => answer,
            Err(e) => {
                let _ = engine.close().await;
                return Err(self.fail(e));
            }
        };

        self.engine = Some(engine);
        self.send(SignalMessage::Answer {
            sender: self.peer_id.clone(),
            target: sender.clone(),
            answer,
        });
        info!("Sent answer to host {}", sender);

        self.negotiation_started = Some(Instant::now());
        self.set_state(ClientState::Negotiating);
        Ok(())
    }

    async fn on_remote_candidate(
        &mut self,
        sender: PeerId,
        candidate: IceCandidate,
    ) -> Result<(), PeerError> {
        if self.host.as_ref() != Some(&sender) {
            debug!("Ignoring candidate from {}", sender);
            return Ok(());
        }
        let Some(engine) = self.engine.as_ref() else {
            debug!("Candidate from {} before any offer, dropped", sender);
            return Ok(());
        };

        let added = engine.add_ice_candidate(candidate).await;
        if let Err(e) = added {
            self.discard_engine().await;
            return Err(self.fail(e));
        }
        Ok(())
    }

    async fn on_host_disconnected(&mut self, peer_id: PeerId) {
        if self.host.as_ref() != Some(&peer_id) {
            debug!("Ignoring departure of {}", peer_id);
            return;
        }

        if self.state().is_direct() {
            info!("Host {} left the rendezvous server, direct connection continues", peer_id);
            return;
        }

        info!("Host {} disconnected before connecting, waiting for a new one", peer_id);
        self.discard_engine().await;
        self.host = None;
        self.negotiation_started = None;
        self.set_state(ClientState::Registered);
    }

    pub async fn handle_engine_event(&mut self, event: EngineEvent) -> Result<(), PeerError> {
        if self.engine.as_ref().map(|e| e.id()) != Some(event.engine) {
            debug!("Ignoring event from discarded {}", event.engine);
            return Ok(());
        }

        match event.kind {
            EngineEventKind::StateChanged(TransportState::Connected) => self.on_connected(),
            EngineEventKind::StateChanged(state) if state.is_terminal() => {
                return self.on_transport_ended(state).await;
            }
            EngineEventKind::StateChanged(state) => debug!("Transport state: {}", state),
            EngineEventKind::CandidateDiscovered(candidate) => {
                match (&self.host, self.signaling_needed && self.link.is_some()) {
                    (Some(host), true) => {
                        self.send(SignalMessage::IceCandidate {
                            sender: self.peer_id.clone(),
                            target: host.clone(),
                            candidate,
                        });
                    }
                    _ => debug!("Signaling closed, local candidate not relayed"),
                }
            }
            EngineEventKind::MediaReceived => {
                if !self.media_seen {
                    match self.negotiation_started {
                        Some(started) => info!("First media received after {:?}", started.elapsed()),
                        None => info!("First media received"),
                    }
                }
                self.media_seen = true;
            }
        }
        Ok(())
    }

    fn on_connected(&mut self) {
        if self.state().is_direct() {
            return;
        }
        info!("Direct connection established, signaling no longer required");
        self.signaling_needed = false;

        if self.close_signaling_on_connect {
            if let Some(mut link) = self.link.take() {
                link.close();
            }
            info!("Closed rendezvous connection");
        }

        if self.link.is_some() {
            self.set_state(ClientState::Connected);
        } else {
            self.set_state(ClientState::Independent);
        }
    }

    async fn on_transport_ended(&mut self, state: TransportState) -> Result<(), PeerError> {
        let was_direct = self.state().is_direct();
        info!("Direct connection {}", state);
        self.discard_engine().await;
        self.set_state(ClientState::Terminated);

        if was_direct {
            Ok(())
        } else {
            Err(PeerError::NegotiationFailed(state))
        }
    }

    /// The rendezvous link went away.
    pub fn on_rendezvous_closed(&mut self) -> Result<(), PeerError> {
        if let Some(mut link) = self.link.take() {
            link.close();
        }

        match self.state() {
            ClientState::Connected => {
                info!("Rendezvous connection closed, continuing in P2P mode");
                self.set_state(ClientState::Independent);
                Ok(())
            }
            ClientState::Negotiating => {
                info!("Rendezvous connection closed while negotiating, waiting for the transport");
                Ok(())
            }
            ClientState::Independent | ClientState::Terminated => Ok(()),
            state => {
                warn!("Rendezvous connection lost in state {}", state);
                self.set_state(ClientState::Terminated);
                Err(PeerError::RendezvousLost)
            }
        }
    }

    /// Warns once if no media has arrived within the grace period. Never
    /// terminates the session.
    pub fn check_watchdog(&mut self) -> bool {
        if self.media_seen || self.watchdog_warned {
            return false;
        }
        let Some(started) = self.negotiation_started else {
            return false;
        };
        if !matches!(
            self.state(),
            ClientState::Negotiating | ClientState::Connected | ClientState::Independent
        ) {
            return false;
        }
        if started.elapsed() < self.stream_timeout {
            return false;
        }

        warn!(
            "No media from host {} within {:?} (state {}, rendezvous {})",
            self.host.as_ref().map(PeerId::as_str).unwrap_or("?"),
            self.stream_timeout,
            self.state(),
            if self.link.is_some() { "open" } else { "closed" },
        );
        self.watchdog_warned = true;
        true
    }

    fn log_status(&self) {
        let mode = if self.state().is_direct() { "P2P" } else { "signaling" };
        let packets = self.media_counter.as_ref().map(|c| c.packets()).unwrap_or(0);
        info!(
            "Status: {} mode, state={}, host={}, packets={}",
            mode,
            self.state(),
            self.host.as_ref().map(PeerId::as_str).unwrap_or("-"),
            packets
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

    fn set_state(&self, next: ClientState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!("Client state {} -> {}", previous, next);
        }
    }

    fn fail(&mut self, e: anyhow::Error) -> PeerError {
        warn!("Negotiation failed: {:#}", e);
        self.set_state(ClientState::Terminated);
        PeerError::Engine(e)
    }

    async fn discard_engine(&mut self) {
        if let Some(engine) = self.engine.take() {
            debug!("Discarding {}", engine.id());
            if let Err(e) = engine.close().await {
                debug!("Closing {} failed: {:#}", engine.id(), e);
            }
        }
    }

    async fn shutdown(&mut self) {
        self.discard_engine().await;
        if let Some(mut link) = self.link.take() {
            link.close();
        }
    }
}
