use crate::engine::{EngineEvent, EngineEventKind, EngineId, NegotiationEngine, TransportState};
use crate::media::{MediaSink, MediaSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tether_core::model::{IceCandidate, PeerId, SessionDescription};
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::media::Sample;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

pub(crate) fn transport_state(state: RTCPeerConnectionState) -> TransportState {
    match state {
        RTCPeerConnectionState::Unspecified | RTCPeerConnectionState::New => TransportState::New,
        RTCPeerConnectionState::Connecting => TransportState::Connecting,
        RTCPeerConnectionState::Connected => TransportState::Connected,
        RTCPeerConnectionState::Disconnected => TransportState::Disconnected,
        RTCPeerConnectionState::Failed => TransportState::Failed,
        RTCPeerConnectionState::Closed => TransportState::Closed,
    }
}

/// A webrtc-rs peer connection to one remote peer.
pub struct RtcEngine {
    id: EngineId,
    remote: PeerId,
    peer_connection: Arc<RTCPeerConnection>,
    /// Remote candidates received before the remote description. `None` once
    /// the description is applied.
    pending_candidates: Mutex<Option<Vec<RTCIceCandidateInit>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl RtcEngine {
    pub(crate) fn new(
        id: EngineId,
        remote: PeerId,
        peer_connection: Arc<RTCPeerConnection>,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Self {
        let state_tx = events.clone();
        let remote_state = remote.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let remote = remote_state.clone();

                Box::pin(async move {
                    info!("Peer connection state with {} changed: {}", remote, s);
                    let _ = tx.send(EngineEvent::new(
                        id,
                        EngineEventKind::StateChanged(transport_state(s)),
                    ));
                })
            },
        ));

        let ice_tx = events;
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx.send(EngineEvent::new(
                    id,
                    EngineEventKind::CandidateDiscovered(IceCandidate {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_mline_index: init.sdp_mline_index,
                    }),
                ));
            })
        }));

        Self {
            id,
            remote,
            peer_connection,
            pending_candidates: Mutex::new(Some(Vec::new())),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Adds an outbound video track fed from `source`.
    pub(crate) async fn attach_source(&self, source: Arc<dyn MediaSource>) -> Result<()> {
        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: source.mime_type().to_owned(),
                ..Default::default()
            },
            "screen".to_owned(),
            "tether".to_owned(),
        ));

        let rtp_sender = self
            .peer_connection
            .add_track(Arc::clone(&track) as Arc<dyn TrackLocal + Send + Sync>)
            .await
            .context("Failed to add video track")?;

        // RTCP has to be drained for the interceptors to work.
        let rtcp_task = tokio::spawn(async move {
            let mut rtcp_buf = vec![0u8; 1500];
            while rtp_sender.read(&mut rtcp_buf).await.is_ok() {}
        });

        let mut frames = source.subscribe();
        let remote = self.remote.clone();
        let forward_task = tokio::spawn(async move {
            loop {
                match frames.recv().await {
                    Ok(frame) => {
                        let sample = Sample {
                            data: frame.data,
                            duration: frame.duration,
                            ..Default::default()
                        };
                        if let Err(e) = track.write_sample(&sample).await {
                            warn!("Failed to write frame for {}: {}", remote, e);
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("Dropped {} frames for {}", skipped, remote);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("Frame forwarding for {} ended", remote);
        });

        self.tasks.lock().await.extend([rtcp_task, forward_task]);
        Ok(())
    }

    /// Forwards inbound RTP payloads to `sink` and reports the first one.
    pub(crate) fn attach_sink(
        &self,
        sink: Arc<dyn MediaSink>,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) {
        let id = self.id;
        let remote = self.remote.clone();
        self.peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let sink = sink.clone();
                let tx = events.clone();
                let remote = remote.clone();

                Box::pin(async move {
                    info!("Receiving remote track from {}", remote);
                    tokio::spawn(async move {
                        let mut first = true;
                        while let Ok((packet, _)) = track.read_rtp().await {
                            if first {
                                first = false;
                                let _ = tx.send(EngineEvent::new(id, EngineEventKind::MediaReceived));
                            }
                            sink.on_payload(packet.payload);
                        }
                        debug!("Remote track from {} ended", remote);
                    });
                })
            },
        ));
    }

    async fn apply_remote(&self, description: RTCSessionDescription) -> Result<()> {
        self.peer_connection
            .set_remote_description(description)
            .await
            .context("Failed to set remote description")?;

        let buffered = self.pending_candidates.lock().await.take().unwrap_or_default();
        if !buffered.is_empty() {
            debug!("Applying {} buffered candidates from {}", buffered.len(), self.remote);
        }
        for candidate in buffered {
            self.peer_connection
                .add_ice_candidate(candidate)
                .await
                .context("Failed to add buffered ICE candidate")?;
        }
        Ok(())
    }
}

#[async_trait]
impl NegotiationEngine for RtcEngine {
    fn id(&self) -> EngineId {
        self.id
    }

    fn state(&self) -> TransportState {
        transport_state(self.peer_connection.connection_state())
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .context("Failed to set local offer")?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn accept_offer(&self, offer: SessionDescription) -> Result<SessionDescription> {
        self.apply_remote(RTCSessionDescription::offer(offer.sdp)?)
            .await?;

        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .context("Failed to set local answer")?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn accept_answer(&self, answer: SessionDescription) -> Result<()> {
        self.apply_remote(RTCSessionDescription::answer(answer.sdp)?)
            .await
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_mline_index,
            username_fragment: None,
        };

        let mut pending = self.pending_candidates.lock().await;
        if let Some(buffer) = pending.as_mut() {
            buffer.push(init);
            return Ok(());
        }
        drop(pending);

        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("Failed to add ICE candidate")?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
        self.peer_connection.close().await?;
        Ok(())
    }
}
