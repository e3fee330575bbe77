use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink, stream::SplitStream};
use std::time::Duration;
use taskboard_common::SyncMessage;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::api::SharedState;
use super::hub::{ConnectionId, Subscription, SyncHub};

/// How often to send WebSocket Ping frames.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// How long to wait for a Pong response before considering the connection dead.
const PONG_TIMEOUT: Duration = Duration::from_secs(60);

// ── WebSocket handler ────────────────────────────────────────────────

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let subscription = match state.hub.connect() {
        Ok(subscription) => subscription,
        Err(e) => {
            error!(error = %e, "failed to register realtime connection");
            return;
        }
    };
    let id = subscription.id();
    info!(connection = id, "client connected");

    let (sender, receiver) = socket.split();
    run_socket_loop(sender, receiver, subscription, &state.hub).await;

    // The board is left exactly as the last update made it.
    info!(connection = id, "client disconnected");
}

/// Core WebSocket loop with ping/pong keepalive.
///
/// Sends the initial `board-update`, then combines broadcast forwarding,
/// inbound `update-board` handling, and periodic ping/pong health checking
/// into a single select loop. If no Pong is received within
/// [`PONG_TIMEOUT`] after a Ping is sent, the connection is considered dead
/// and the loop exits.
async fn run_socket_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut receiver: SplitStream<WebSocket>,
    mut subscription: Subscription,
    hub: &SyncHub,
) {
    let id = subscription.id();
    let initial = subscription.initial().to_owned();
    if sender.send(Message::Text(initial.into())).await.is_err() {
        return;
    }

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    // The first tick completes immediately; consume it so the first real
    // ping fires after PING_INTERVAL has elapsed.
    ping_interval.tick().await;

    let mut last_pong = Instant::now();
    let mut awaiting_pong = false;

    loop {
        tokio::select! {
            // ── Periodic ping ───────────────────────────────────────
            _ = ping_interval.tick() => {
                if awaiting_pong && last_pong.elapsed() > PONG_TIMEOUT {
                    warn!(connection = id, "no pong received, dropping connection");
                    break;
                }
                if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
                awaiting_pong = true;
            }

            // ── Board updates from other connections ────────────────
            payload = subscription.recv() => {
                match payload {
                    Some(payload) => {
                        if sender.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // ── Client frames ───────────────────────────────────────
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match handle_client_frame(hub, id, text.as_str()) {
                            FrameOutcome::Replaced => {}
                            FrameOutcome::Ignored(event_name) => {
                                debug!(
                                    connection = id,
                                    event = event_name,
                                    "ignoring client frame"
                                );
                            }
                            FrameOutcome::Malformed(reason) => {
                                warn!(connection = id, %reason, "malformed client frame");
                            }
                            FrameOutcome::Failed(reason) => {
                                error!(connection = id, %reason, "failed to apply client board");
                            }
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        last_pong = Instant::now();
                        awaiting_pong = false;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // Binary and Ping frames carry nothing for us
                    }
                    Some(Err(e)) => {
                        debug!(connection = id, error = %e, "websocket receive error");
                        break;
                    }
                }
            }
        }
    }

    // Best-effort close frame
    let _ = sender.send(Message::Close(None)).await;
}

/// What happened to one inbound text frame.
#[derive(Debug, PartialEq, Eq)]
enum FrameOutcome {
    Replaced,
    Ignored(&'static str),
    Malformed(String),
    Failed(String),
}

fn handle_client_frame(hub: &SyncHub, origin: ConnectionId, text: &str) -> FrameOutcome {
    match SyncMessage::from_json(text) {
        Ok(SyncMessage::UpdateBoard(board)) => match hub.replace_from(origin, board) {
            Ok(()) => FrameOutcome::Replaced,
            Err(e) => FrameOutcome::Failed(e.to_string()),
        },
        Ok(other) => FrameOutcome::Ignored(other.event_name()),
        Err(e) => FrameOutcome::Malformed(e.to_string()),
    }
}

// ── Tests ────────────────────────────────────────────────────────────
