use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tether_core::model::{PeerId, RoomId};
use tether_peer::{
    BroadcastSource, ClientSession, CountingSink, DEFAULT_SIGNALING_URL, HostSession,
    MediaAttachment, PeerConfig, RtcEngineFactory, TransportConfig,
};
use tether_server::ServerConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;
use webrtc::api::media_engine::MIME_TYPE_VP8;

mod frames;

#[derive(Parser)]
#[command(name = "tether", version)]
#[command(about = "Rendezvous server and peers for direct screen streaming")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the rendezvous server.
    Server {
        #[arg(long, env = "TETHER_BIND", default_value = "0.0.0.0:8765")]
        bind: SocketAddr,

        /// Don't tell the rest of the room when a peer's connection closes.
        #[arg(long)]
        no_departure_notices: bool,
    },
    /// Stream to every client that joins the room.
    Host {
        #[command(flatten)]
        peer: PeerArgs,

        #[arg(long, default_value_t = 30)]
        fps: u32,

        /// VP8 IVF file to loop instead of placeholder frames.
        #[arg(long)]
        ivf: Option<PathBuf>,
    },
    /// Receive the room host's stream.
    Client {
        #[command(flatten)]
        peer: PeerArgs,

        /// Seconds to wait for the first packet once negotiation starts.
        #[arg(long, default_value_t = 10)]
        stream_timeout: u64,

        /// Leave the rendezvous server as soon as the direct connection is up.
        #[arg(long)]
        close_signaling: bool,
    },
}

#[derive(Args)]
struct PeerArgs {
    #[arg(long, env = "TETHER_SIGNALING", default_value = DEFAULT_SIGNALING_URL)]
    signaling: String,

    #[arg(long, env = "TETHER_ROOM", default_value = "default")]
    room: String,

    /// Defaults to a server-generated id.
    #[arg(long, env = "TETHER_PEER_ID")]
    peer_id: Option<String>,

    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL")]
    turn_credential: Option<String>,
}

impl PeerArgs {
    fn into_config(self) -> PeerConfig {
        let mut transport = TransportConfig::default();
        if let Some(url) = self.turn_url {
            transport = transport.with_turn(url, self.turn_username, self.turn_credential);
        }

        PeerConfig {
            signaling_url: self.signaling,
            room_id: RoomId::new(self.room),
            peer_id: self.peer_id.map(PeerId::from),
            transport,
            ..PeerConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Commands::Server {
            bind,
            no_departure_notices,
        } => {
            println!("{}", "📡 Starting rendezvous server...".green().bold());
            let config = ServerConfig {
                bind_addr: bind,
                notify_departures: !no_departure_notices,
            };
            tether_server::serve(config)
                .await
                .context("Rendezvous server failed")?;
        }
        Commands::Host { peer, fps, ivf } => run_host(peer.into_config(), fps, ivf).await?,
        Commands::Client {
            peer,
            stream_timeout,
            close_signaling,
        } => {
            let mut config = peer.into_config();
            config.stream_timeout = Duration::from_secs(stream_timeout);
            config.close_signaling_on_connect = close_signaling;
            run_client(config).await?;
        }
    }

    Ok(())
}

async fn run_host(config: PeerConfig, fps: u32, ivf: Option<PathBuf>) -> Result<()> {
    let source = Arc::new(BroadcastSource::new(MIME_TYPE_VP8, 64));
    let frame_interval = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
    let publisher = match ivf {
        Some(path) => frames::spawn_ivf_loop(source.clone(), path, frame_interval).await?,
        None => frames::spawn_placeholder(source.clone(), frame_interval),
    };

    println!(
        "{} room {} via {}",
        "🎥 Hosting".green().bold(),
        config.room_id.to_string().cyan(),
        config.signaling_url
    );
    let factory = RtcEngineFactory::new(config.transport.clone(), MediaAttachment::Send(source));
    let host = HostSession::connect(&config, Arc::new(factory))
        .await
        .context("Failed to join the rendezvous server")?;
    println!("   🆔 Peer id: {}", host.peer_id().to_string().yellow());

    let result = tokio::select! {
        result = host.run() => result.context("Host session failed"),
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping host");
            Ok(())
        }
    };
    publisher.abort();

    if result.is_ok() {
        println!("{}", "✨ Host stopped".green().bold());
    }
    result
}

async fn run_client(config: PeerConfig) -> Result<()> {
    let sink = Arc::new(CountingSink::new());

    println!(
        "{} room {} via {}",
        "📺 Joining".green().bold(),
        config.room_id.to_string().cyan(),
        config.signaling_url
    );
    let factory =
        RtcEngineFactory::new(config.transport.clone(), MediaAttachment::Receive(sink.clone()));
    let client = ClientSession::connect(&config, Arc::new(factory))
        .await
        .context("Failed to join the rendezvous server")?
        .with_media_counter(sink.clone());
    println!("   🆔 Peer id: {}", client.peer_id().to_string().yellow());

    let result = tokio::select! {
        result = client.run() => result.context("Client session failed"),
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping client");
            Ok(())
        }
    };

    println!(
        "   📦 Received {} packets ({} bytes)",
        sink.packets(),
        sink.bytes()
    );
    result
}
