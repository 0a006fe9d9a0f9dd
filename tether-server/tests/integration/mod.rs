pub mod room_tests;

use std::net::SocketAddr;
use tether_server::{RendezvousService, ServerConfig, serve_on};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Running server on an ephemeral port. Dropping it shuts the server down.
pub struct TestServer {
    pub addr: SocketAddr,
    pub service: RendezvousService,
    _shutdown: oneshot::Sender<()>,
}

pub async fn start_server(config: ServerConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local addr");
    let service = RendezvousService::new(config);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn({
        let service = service.clone();
        async move {
            let _ = serve_on(listener, service, async {
                let _ = shutdown_rx.await;
            })
            .await;
        }
    });

    TestServer {
        addr,
        service,
        _shutdown: shutdown_tx,
    }
}
