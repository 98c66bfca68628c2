//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{ConnectionId, MessageId, RoomId},
    infrastructure::dto::websocket::ClientMessage,
    ui::state::AppState,
    usecase::{ChatError, DisconnectOutcome, FieldViolation, JoinRoomRequest, SenderRef},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (connection_id, rx) = state.hub.register().await;
    tracing::info!("Connection {connection_id} opened");

    let (sender, mut receiver) = socket.split();
    let send_task = tokio::spawn(write_frames(
        sender,
        rx,
        connection_id,
        state.config.send_timeout(),
    ));

    let state_clone = state.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on {connection_id}: {e}");
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received frame from {connection_id}: {text}");
                    handle_frame(&state_clone, connection_id, text.as_str()).await;
                }
                Message::Close(_) => {
                    tracing::info!("Connection {connection_id} requested close");
                    break;
                }
                // Ping/pong is handled by the WebSocket protocol layer
                _ => {}
            }
        }
    });

    join_first(recv_task, send_task).await;

    state.hub.unregister(&connection_id).await;
    match state.coordinator.disconnect(&connection_id).await {
        Ok(DisconnectOutcome::NotJoined) => {}
        Ok(DisconnectOutcome::Left { user }) => {
            tracing::info!("Connection {connection_id} closed, '{}' left", user.username);
        }
        Ok(DisconnectOutcome::RoomDrained { room_id, .. }) => {
            tracing::info!("Connection {connection_id} closed, room {room_id} drained");
        }
        Err(e) => tracing::error!("Failed to disconnect {connection_id}: {e}"),
    }
}

/// Wait for either task to end, then abort the other and wait until it is gone
///
/// A frame handler still running after disconnect could recreate the session.
async fn join_first(mut a: JoinHandle<()>, mut b: JoinHandle<()>) {
    tokio::select! {
        _ = &mut a => {
            b.abort();
            let _ = b.await;
        }
        _ = &mut b => {
            a.abort();
            let _ = a.await;
        }
    }
}

/// Forward queued frames to the socket, closing it if a write stalls
async fn write_frames(
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<String>,
    connection_id: ConnectionId,
    timeout: std::time::Duration,
) {
    while let Some(frame) = rx.recv().await {
        match tokio::time::timeout(timeout, sender.send(Message::Text(frame.into()))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!("Socket write to {connection_id} failed: {e}");
                break;
            }
            Err(_) => {
                tracing::warn!("Socket write to {connection_id} timed out, closing");
                break;
            }
        }
    }
}

/// Decode one inbound frame and route it to the coordinator
async fn handle_frame(state: &AppState, connection_id: ConnectionId, text: &str) {
    let result = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => route(state, connection_id, message).await,
        Err(e) => Err(ChatError::Validation(vec![FieldViolation::new(
            "payload",
            "INVALID_PAYLOAD",
            e.to_string(),
        )])),
    };

    if let Err(error) = result {
        state
            .coordinator
            .dispatcher()
            .dispatch_error(&connection_id, &error)
            .await;
    }
}

async fn route(
    state: &AppState,
    connection_id: ConnectionId,
    message: ClientMessage,
) -> Result<(), ChatError> {
    let coordinator = &state.coordinator;
    match message {
        ClientMessage::JoinRoom {
            username,
            room_name,
            avatar,
        } => {
            coordinator
                .join_room(JoinRoomRequest {
                    connection_id,
                    username,
                    room_name,
                    avatar,
                })
                .await?;
        }
        ClientMessage::SendMessage { text } => {
            coordinator.send_message(&connection_id, text).await?;
        }
        ClientMessage::SendImage { room_id, image_url } => {
            let room_id =
                RoomId::parse(&room_id).map_err(|e| ChatError::invalid("room_id", &e))?;
            coordinator
                .send_image(SenderRef::Connection(connection_id), &room_id, image_url)
                .await?;
        }
        ClientMessage::RemoveMessage { message_id } => {
            let message_id =
                MessageId::parse(&message_id).map_err(|e| ChatError::invalid("message_id", &e))?;
            coordinator.remove_message(&connection_id, &message_id).await?;
        }
    }
    Ok(())
}
