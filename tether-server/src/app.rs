use crate::config::ServerConfig;
use crate::error::RendezvousError;
use crate::signaling::{RendezvousService, ws_handler};
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

/// Peers may connect on `/` or `/ws`; `/health` answers plain HTTP.
pub fn router(service: RendezvousService) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .with_state(service)
}

async fn health(State(service): State<RendezvousService>) -> String {
    format!(
        "ok peers={} rooms={}",
        service.registry().len(),
        service.room_count().await
    )
}

/// Binds `config.bind_addr` and serves until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<(), RendezvousError> {
    let addr = config.bind_addr;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| RendezvousError::Bind { addr, source })?;

    let service = RendezvousService::new(config);
    serve_on(listener, service, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received");
    })
    .await
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve_on(
    listener: TcpListener,
    service: RendezvousService,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), RendezvousError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Rendezvous server listening on ws://{}", addr);
    }

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(RendezvousError::Serve)?;

    info!("Rendezvous server stopped");
    Ok(())
}
