use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use volley_shared::frame::Frame;
use volley_shared::protocol::{ClientMsg, ServerMsg};

use crate::game_loop::LoopHandle;

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub handle: LoopHandle,
    pub frame_tx: broadcast::Sender<Frame>,
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut sink, mut stream) = socket.split();

    // Subscribe before joining so no frame falls between welcome and stream
    let mut frame_rx = app_state.frame_tx.subscribe();

    let welcome = match app_state.handle.join().await {
        Ok(welcome) => welcome,
        Err(e) => {
            tracing::error!("Failed to join animation loop: {}", e);
            return;
        }
    };
    let rotation = welcome.frame.rotation;

    let welcome_json = match serde_json::to_string(&ServerMsg::Welcome(welcome)) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to encode welcome: {}", e);
            return;
        }
    };
    if sink.send(Message::Text(welcome_json.into())).await.is_err() {
        return;
    }
    tracing::info!("Viewer connected at rotation {}", rotation);

    loop {
        tokio::select! {
            // Client -> Server
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMsg>(&text) {
                            Ok(control) => {
                                if let Err(e) = app_state.handle.control(control).await {
                                    tracing::error!("Failed to forward control: {}", e);
                                    break;
                                }
                            }
                            Err(e) => tracing::debug!("Ignoring client message: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {} // Ignore ping/pong/binary
                }
            }

            // Server -> Client (frames)
            result = frame_rx.recv() => {
                match result {
                    Ok(frame) => {
                        if let Ok(json) = serde_json::to_string(&ServerMsg::Frame(frame)) {
                            if sink.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Viewer lagged by {} frames", n);
                        // Continue - every frame is a full snapshot
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::info!("Viewer disconnected");
}
