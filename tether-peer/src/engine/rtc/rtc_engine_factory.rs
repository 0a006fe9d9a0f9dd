use crate::config::TransportConfig;
use crate::engine::rtc::RtcEngine;
use crate::engine::{EngineEvent, EngineFactory, EngineId, NegotiationEngine};
use crate::media::{MediaSink, MediaSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tether_core::model::PeerId;
use tokio::sync::mpsc;
use tracing::debug;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;

/// What each new connection carries besides negotiation.
#[derive(Clone)]
pub enum MediaAttachment {
    /// Host: one outbound video track per connection.
    Send(Arc<dyn MediaSource>),
    /// Client: inbound tracks are drained into the sink.
    Receive(Arc<dyn MediaSink>),
    None,
}

/// Opens webrtc-rs peer connections.
pub struct RtcEngineFactory {
    transport: TransportConfig,
    media: MediaAttachment,
}

impl RtcEngineFactory {
    pub fn new(transport: TransportConfig, media: MediaAttachment) -> Self {
        Self { transport, media }
    }

    fn rtc_configuration(&self) -> RTCConfiguration {
        RTCConfiguration {
            ice_servers: self
                .transport
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl EngineFactory for RtcEngineFactory {
    async fn open(
        &self,
        remote: &PeerId,
        engine_id: EngineId,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<Box<dyn NegotiationEngine>> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let peer_connection = Arc::new(
            api.new_peer_connection(self.rtc_configuration())
                .await
                .context("Failed to create peer connection")?,
        );

        let engine = RtcEngine::new(engine_id, remote.clone(), peer_connection, events.clone());
        match &self.media {
            MediaAttachment::Send(source) => {
                if let Err(e) = engine.attach_source(source.clone()).await {
                    let _ = engine.close().await;
                    return Err(e);
                }
            }
            MediaAttachment::Receive(sink) => engine.attach_sink(sink.clone(), events),
            MediaAttachment::None => {}
        }

        debug!("Opened {} for {}", engine_id, remote);
        Ok(Box::new(engine))
    }
}
