//! Per-connection handler: event dispatch and outbound delivery.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register an outbound channel with the broker
//!   2. Spawn a writer task draining peer notices into the socket
//!   3. Loop: receive envelopes, dispatch to the broker, send acks
//!   4. On exit (any path), a drop guard disconnects the broker side:
//!      membership removed, empty room deleted, survivor notified

use std::sync::Arc;

use tandem_protocol::{
    Ack, ClientEnvelope, ClientEvent, Codec, RoomKey, ServerEvent,
};
use tandem_room::{PeerNotice, RelayOutcome, RoomError};
use tandem_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::TandemError;
use crate::server::ServerState;

/// Drop guard that detaches a connection from the broker when the handler
/// exits. This ensures cleanup happens even if the handler errors out.
/// `Drop` is synchronous, so the async lock is taken in a spawned task.
struct ConnGuard {
    conn_id: ConnectionId,
    state: Arc<ServerState>,
}

impl Drop for ConnGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.broker.lock().await.disconnect(conn_id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), TandemError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let conn = Arc::new(conn);

    // Register the outbound channel before anything can target this
    // connection with a notice.
    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    state.broker.lock().await.attach(conn_id, notice_tx);

    let _guard = ConnGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    // Writer task: peer notices → ServerEvent frames. Exits when the
    // broker drops the sender on disconnect, or when the socket dies.
    let writer_conn = Arc::clone(&conn);
    let writer_codec = state.codec;
    let writer = tokio::spawn(async move {
        while let Some(notice) = notice_rx.recv().await {
            let event = outbound_event(notice);
            match writer_codec.encode(&event) {
                Ok(bytes) => {
                    if writer_conn.send(&bytes).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode peer notice");
                }
            }
        }
    });

    // Read loop. No inactivity timeout: an idle connection holds its
    // room open until it actually disconnects.
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let envelope: ClientEnvelope = match state.codec.decode(&data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(
                    %conn_id, error = %e, "failed to decode envelope"
                );
                continue;
            }
        };

        dispatch(&conn, &state, conn_id, envelope).await?;
    }

    writer.abort();
    // _guard drops here → broker disconnect fires.
    Ok(())
}

/// Converts a broker notice into its wire representation.
fn outbound_event(notice: PeerNotice) -> ServerEvent {
    match notice {
        PeerNotice::PeerJoined { room } => ServerEvent::PeerJoined { room },
        PeerNotice::PeerLeft { room } => ServerEvent::PeerLeft { room },
        PeerNotice::Relay { event, data } => {
            ServerEvent::Relay { event, data }
        }
    }
}

/// Dispatches one client event to the broker and acknowledges it.
///
/// The broker lock is scoped to the room operation alone and dropped
/// before any network I/O.
async fn dispatch(
    conn: &WebSocketConnection,
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    envelope: ClientEnvelope,
) -> Result<(), TandemError> {
    match envelope.event {
        ClientEvent::CreateRoom { room, layout } => {
            let ack = match RoomKey::from_value(&room) {
                None => Ack::failure(
                    RoomError::InvalidId(room.to_string()).to_string(),
                ),
                Some(key) => {
                    let result = {
                        let mut broker = state.broker.lock().await;
                        broker.create_room(conn_id, key.clone(), layout)
                    };
                    match result {
                        Ok(()) => Ack::ok(
                            Some(key.to_value()),
                            format!("room {key} created"),
                        ),
                        Err(e) => Ack::failure(e.to_string()),
                    }
                }
            };
            send_ack(conn, state, envelope.seq, ack).await?;
        }

        ClientEvent::JoinRoom { room } => {
            let ack = match RoomKey::from_value(&room) {
                None => Ack::failure(
                    RoomError::InvalidId(room.to_string()).to_string(),
                ),
                Some(key) => {
                    let result = {
                        let mut broker = state.broker.lock().await;
                        broker.join_room(conn_id, key.clone())
                    };
                    match result {
                        Ok(layout) => {
                            Ack::ok(layout, format!("joined room {key}"))
                        }
                        Err(e) => Ack::failure(e.to_string()),
                    }
                }
            };
            send_ack(conn, state, envelope.seq, ack).await?;
        }

        ClientEvent::LeaveRoom => {
            state.broker.lock().await.leave_room(conn_id);
            // Leaving is idempotent, so the ack is always a success.
            send_ack(conn, state, envelope.seq, Ack::ok(None, "left room"))
                .await?;
        }

        ClientEvent::Relay { event, data } => {
            let outcome = {
                let broker = state.broker.lock().await;
                broker.relay(conn_id, &event, data)
            };
            match outcome {
                RelayOutcome::Forwarded(_) => {
                    send_ack(conn, state, envelope.seq, Ack::ok(None, "relayed"))
                        .await?;
                }
                // Deliberate silence: a relay from outside a session is
                // dropped without a response, even when a seq was given.
                RelayOutcome::NoRoom => {}
            }
        }
    }

    Ok(())
}

/// Sends an acknowledgment if the request asked for one. A request
/// without a `seq` is fire-and-forget.
async fn send_ack(
    conn: &WebSocketConnection,
    state: &Arc<ServerState>,
    seq: Option<u64>,
    ack: Ack,
) -> Result<(), TandemError> {
    let Some(seq) = seq else {
        return Ok(());
    };
    let bytes = state.codec.encode(&ServerEvent::ack(seq, ack))?;
    conn.send(&bytes).await.map_err(TandemError::Transport)?;
    Ok(())
}
