use crate::registry::{ConnectionId, PeerHandle};
use crate::signaling::{ConnectionSession, RendezvousService};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<RendezvousService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: RendezvousService) {
    let connection = ConnectionId::new();
    info!("New WebSocket connection: {}", connection);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = ConnectionSession::new(PeerHandle::new(connection, tx));

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sender.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    let recv_loop = async {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => service.handle_frame(&mut session, text.as_str()).await,
                Message::Close(_) => break,
                other => debug!("Ignoring non-text frame on {}: {:?}", connection, other),
            }
        }
    };

    tokio::select! {
        _ = recv_loop => {}
        _ = (&mut send_task) => {}
    };
    send_task.abort();

    service.disconnect(&session).await;
    match session.peer_id() {
        Some(peer_id) => info!("WebSocket disconnected: {} ({})", peer_id, connection),
        None => info!("WebSocket disconnected: {}", connection),
    }
}
