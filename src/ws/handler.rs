//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::relay::{Connection, Inbound, Opened};
use crate::ws::protocol::Event;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4();
    info!(conn_id = %conn_id, "New WebSocket connection");

    let (mut ws_sink, mut ws_stream) = socket.split();

    // The first frame decides whether this connection creates, joins or watches
    let Some(text) = next_text(conn_id, &mut ws_stream).await else {
        info!(conn_id = %conn_id, "Connection closed before init");
        return;
    };

    let Opened {
        connection,
        rx,
        replies,
    } = match Connection::open(conn_id, state.games.clone(), &text) {
        Ok(opened) => opened,
        Err(rejection) => {
            if let Err(e) = send_event(&mut ws_sink, &rejection).await {
                debug!(conn_id = %conn_id, error = %e, "Failed to deliver init rejection");
            }
            return;
        }
    };

    info!(
        conn_id = %conn_id,
        game_id = %connection.game().id,
        seat = ?connection.seat(),
        "Connection attached"
    );

    for reply in &replies {
        if let Err(e) = send_event(&mut ws_sink, reply).await {
            debug!(conn_id = %conn_id, error = %e, "WebSocket send failed");
            connection.close();
            return;
        }
    }

    run_session(conn_id, &connection, ws_sink, ws_stream, rx).await;

    connection.close();
    info!(conn_id = %conn_id, "WebSocket connection closed");
}

/// Run the attached connection with read/write split
async fn run_session(
    conn_id: Uuid,
    connection: &Connection,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut ws_stream: SplitStream<WebSocket>,
    mut game_rx: broadcast::Receiver<String>,
) {
    // Replies meant for this connection only (errors)
    let (direct_tx, mut direct_rx) = mpsc::channel::<Event>(16);

    // Spawn writer task: game broadcast + direct replies -> WebSocket
    let writer_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                frame = game_rx.recv() => match frame {
                    Ok(frame) => {
                        if let Err(e) = ws_sink.send(Message::Text(frame)).await {
                            debug!(conn_id = %conn_id, error = %e, "WebSocket send failed");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // later snapshots supersede the skipped ones
                        warn!(conn_id = %conn_id, lagged_count = n, "Client lagged, skipping {} frames", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!(conn_id = %conn_id, "Game channel closed");
                        break;
                    }
                },
                Some(event) = direct_rx.recv() => {
                    if let Err(e) = send_event(&mut ws_sink, &event).await {
                        debug!(conn_id = %conn_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
            }
        }
    });

    // Reader loop: WebSocket -> game
    while let Some(text) = next_text(conn_id, &mut ws_stream).await {
        if let Inbound::Rejected(reply) = connection.on_frame(&text) {
            if direct_tx.send(reply).await.is_err() {
                break;
            }
        }
    }

    writer_handle.abort();
}

/// Next text frame, or None once the peer is gone
async fn next_text(conn_id: Uuid, stream: &mut SplitStream<WebSocket>) -> Option<String> {
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => return Some(text),
            Ok(Message::Binary(_)) => {
                warn!(conn_id = %conn_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(conn_id = %conn_id, "Client initiated close");
                return None;
            }
            Err(e) => {
                error!(conn_id = %conn_id, error = %e, "WebSocket error");
                return None;
            }
        }
    }
    None
}

/// Send a message over WebSocket
async fn send_event(sink: &mut SplitSink<WebSocket, Message>, event: &Event) -> Result<(), String> {
    let json = event.to_json().map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
