//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::{Outbound, SessionHandle};
use crate::util::rate_limit::{AimThrottle, AIM_FLUSH_INTERVAL};
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    info!(connection_id = %connection_id, "New WebSocket connection");

    let (ws_sink, ws_stream) = socket.split();
    let (session, outbound) = SessionHandle::open(state.world.clone(), state.scheduler.clone());

    run_session(connection_id, session, ws_sink, ws_stream, outbound).await;

    info!(connection_id = %connection_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    connection_id: Uuid,
    mut session: SessionHandle,
    ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    outbound: Outbound,
) {
    let mut throttle = AimThrottle::new();

    // Spawn writer task: session events and snapshots -> WebSocket
    let writer_handle = tokio::spawn(write_outbound(connection_id, ws_sink, outbound));

    // Reader loop: WebSocket -> session
    loop {
        let result = tokio::select! {
            frame = ws_stream.next() => match frame {
                Some(result) => result,
                None => break,
            },
            _ = tokio::time::sleep(AIM_FLUSH_INTERVAL), if throttle.has_pending() => {
                if let Some((x, y)) = throttle.flush() {
                    apply(connection_id, &mut session, ClientMsg::Mousemove { x, y }).await;
                }
                continue;
            }
        };

        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMsg>(&text) {
                Ok(ClientMsg::Mousemove { x, y }) => match throttle.offer(x, y) {
                    Some((x, y)) => {
                        apply(connection_id, &mut session, ClientMsg::Mousemove { x, y }).await;
                    }
                    None => debug!(connection_id = %connection_id, "Coalescing aim update"),
                },
                Ok(client_msg) => apply(connection_id, &mut session, client_msg).await,
                Err(e) => {
                    warn!(connection_id = %connection_id, error = %e, "Failed to parse client message");
                }
            },
            Ok(Message::Binary(_)) => {
                warn!(connection_id = %connection_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(connection_id = %connection_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(connection_id = %connection_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(connection_id = %connection_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Leave the world before the writer goes away
    session.disconnect();

    // Abort writer task
    writer_handle.abort();
}

/// Hand one message to the session; rejections are logged, never fatal
async fn apply(connection_id: Uuid, session: &mut SessionHandle, msg: ClientMsg) {
    if let Err(e) = session.handle(msg).await {
        warn!(connection_id = %connection_id, error = %e, "Rejected client message");
    }
}

/// Forward one-shot events and the latest snapshot to the socket.
/// Events go first so a game over is never overtaken by later state.
async fn write_outbound(
    connection_id: Uuid,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut outbound: Outbound,
) {
    let mut last_tick = 0;
    let mut events_open = true;

    loop {
        tokio::select! {
            biased;

            event = outbound.events.recv(), if events_open => match event {
                Some(msg) => {
                    if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                        debug!(connection_id = %connection_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                None => events_open = false,
            },

            changed = outbound.snapshots.changed() => {
                if changed.is_err() {
                    debug!(connection_id = %connection_id, "Snapshot channel closed");
                    break;
                }

                let snapshot = outbound.snapshots.borrow_and_update().clone();
                if snapshot.tick <= last_tick {
                    continue;
                }
                last_tick = snapshot.tick;

                if let Err(e) = send_msg(&mut ws_sink, &ServerMsg::GameState(snapshot)).await {
                    debug!(connection_id = %connection_id, error = %e, "WebSocket send failed");
                    break;
                }
            }
        }
    }
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
