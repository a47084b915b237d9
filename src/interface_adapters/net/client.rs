use crate::interface_adapters::protocol::{ClientMessage, FrameDto, RunStateDto, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{ControlEvent, FrameUpdate, RunState};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    ControlClosed,
    FramesClosed,
    RunStateClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

// Outcome of handling one select branch in the client loop.
enum LoopControl {
    Continue,
    Disconnect,
}

// Minimum gap between repeated warnings of the same kind per connection.
const LOG_THROTTLE: Duration = Duration::from_secs(2);
// Malformed text messages tolerated before the socket is closed.
const MAX_INVALID_JSON: u32 = 10;

/// Serializes every frame once and fans the shared bytes out to all sockets.
pub async fn frame_serializer(
    mut frame_rx: broadcast::Receiver<FrameUpdate>,
    frame_bytes_tx: broadcast::Sender<Utf8Bytes>,
    frame_latest_tx: watch::Sender<Utf8Bytes>,
) {
    loop {
        match frame_rx.recv().await {
            Ok(frame) => {
                let msg = ServerMessage::Frame(FrameDto::from(frame));
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize frame");
                        continue;
                    }
                };

                // Convert once; every socket clones the same shared bytes.
                let bytes = Utf8Bytes::from(txt);
                // `send_replace` stores the frame even while nobody watches it,
                // so `GET /snapshot` always sees the newest one.
                let _ = frame_latest_tx.send_replace(bytes.clone());
                // No sockets connected is fine.
                let _ = frame_bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "frame serializer lagged; skipping to latest frame");
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("frame channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // Connection id for correlating logs across the socket's lifetime.
    let conn_id = state.next_conn_id();
    ws.on_upgrade(move |socket| {
        handle_socket(socket, state, conn_id).instrument(info_span!("conn", conn_id))
    })
}

// Per-connection traffic counters, logged once on disconnect.
#[derive(Debug, Default)]
struct ConnStats {
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_json: u32,
    lag_recoveries: u64,
}

struct ConnCtx {
    conn_id: u64,
    // Commands flowing into the world task.
    control_tx: mpsc::Sender<ControlEvent>,
    // Serialized frames shared by all sockets, plus the latest one for lag recovery.
    frame_bytes_rx: broadcast::Receiver<Utf8Bytes>,
    frame_latest_rx: watch::Receiver<Utf8Bytes>,
    run_state_rx: watch::Receiver<RunState>,
    stats: ConnStats,
    // Throttle timestamps for noisy warnings.
    last_control_full_log: Instant,
    last_frame_lag_log: Instant,
    last_invalid_msg_log: Instant,
    // Close frame to send when the loop decides to disconnect.
    close_frame: Option<CloseFrame>,
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, conn_id: u64) {
    // Subscribe before the first await so no frame slips between greeting and loop.
    let frame_bytes_rx = state.frame_bytes_tx.subscribe();
    let frame_latest_rx = state.frame_latest_tx.subscribe();
    let mut run_state_rx = state.run_state_tx.subscribe();

    let mut stats = ConnStats::default();
    // Copy the state out so the watch lock isn't held across the sends below.
    let current = *run_state_rx.borrow_and_update();
    let greeting = [
        ServerMessage::Legend(state.legend.clone()),
        ServerMessage::RunState(RunStateDto::from(current)),
    ];
    for msg in &greeting {
        match send_message(&mut socket, msg).await {
            Ok(bytes) => {
                stats.msgs_out += 1;
                stats.bytes_out += bytes as u64;
            }
            Err(e) => {
                warn!(error = ?e, "failed to greet client");
                let _ = socket.close().await;
                return;
            }
        }
    }

    info!("client connected");

    // Backdate the throttles so the first warning of each kind is logged.
    let now = Instant::now() - LOG_THROTTLE;
    let mut ctx = ConnCtx {
        conn_id,
        control_tx: state.control_tx.clone(),
        frame_bytes_rx,
        frame_latest_rx,
        run_state_rx,
        stats,
        last_control_full_log: now,
        last_frame_lag_log: now,
        last_invalid_msg_log: now,
        close_frame: None,
    };

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }

    let ConnStats {
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        lag_recoveries,
    } = ctx.stats;
    debug!(
        msgs_in,
        msgs_out, bytes_in, bytes_out, invalid_json, lag_recoveries, "connection stats"
    );
    info!(conn_id = ctx.conn_id, "client disconnected");
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    // Serialization failures surface as errors instead of panics.
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket.send(Message::Text(txt.into())).await?;
    Ok(bytes)
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    // Split borrows so `tokio::select!` can hold them concurrently.
    let ConnCtx {
        control_tx,
        frame_bytes_rx,
        frame_latest_rx,
        run_state_rx,
        stats,
        last_control_full_log,
        last_frame_lag_log,
        last_invalid_msg_log,
        close_frame,
        ..
    } = ctx;

    let mut fatal: Option<NetError> = None;

    loop {
        // disconnect becomes true on error or when either side closes
        let disconnect: bool = tokio::select! {
            // Incoming control command from the client
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    incoming,
                    control_tx,
                    stats,
                    last_control_full_log,
                    last_invalid_msg_log,
                    close_frame,
                ) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outgoing frame
            frame = frame_bytes_rx.recv() => {
                match frame {
                    Ok(bytes) => matches!(
                        forward_frame_bytes(bytes, socket, stats).await,
                        LoopControl::Disconnect
                    ),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(last_frame_lag_log) {
                            warn!(missed = n, "frames lagged; sending latest snapshot");
                        }

                        // Resync strategy: skip the backlog and send the newest frame.
                        let latest = frame_latest_rx.borrow().clone();
                        if latest.is_empty() {
                            false
                        } else {
                            stats.lag_recoveries += 1;
                            matches!(
                                forward_frame_bytes(latest, socket, stats).await,
                                LoopControl::Disconnect
                            )
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::FramesClosed);
                        true
                    }
                }
            }

            // Outgoing run state (start button label)
            changed = run_state_rx.changed() => {
                match changed {
                    Ok(()) => {
                        let current = *run_state_rx.borrow_and_update();
                        matches!(
                            forward_run_state(current, socket, stats).await,
                            LoopControl::Disconnect
                        )
                    }
                    Err(_) => {
                        warn!("run state channel closed; disconnecting");
                        fatal = Some(NetError::RunStateClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            // Best-effort close; the peer may already be gone.
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    control_tx: &mpsc::Sender<ControlEvent>,
    stats: &mut ConnStats,
    last_control_full_log: &mut Instant,
    last_invalid_msg_log: &mut Instant,
    close_frame: &mut Option<CloseFrame>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                stats.msgs_in += 1;
                stats.bytes_in += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(&text) {
                    // Both transports share the same command set as `POST /control`.
                    Ok(msg) => forward_control(
                        ControlEvent::from(msg),
                        control_tx,
                        last_control_full_log,
                    ),
                    Err(parse_err) => {
                        stats.invalid_json += 1;
                        if should_log(last_invalid_msg_log) {
                            warn!(
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        // A client that keeps sending garbage is cut off.
                        if stats.invalid_json > MAX_INVALID_JSON {
                            *close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }

                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                *close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!("websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

fn forward_control(
    event: ControlEvent,
    control_tx: &mpsc::Sender<ControlEvent>,
    last_control_full_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    match control_tx.try_send(event) {
        Ok(()) => Ok(LoopControl::Continue),
        // Never block the socket loop on a busy world task; drop the command instead.
        Err(mpsc::error::TrySendError::Full(_)) => {
            if should_log(last_control_full_log) {
                warn!("control channel full; dropping command");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_)) => Err(NetError::ControlClosed),
    }
}

async fn forward_frame_bytes(
    frame: Utf8Bytes,
    socket: &mut WebSocket,
    stats: &mut ConnStats,
) -> LoopControl {
    let bytes_len = frame.len();
    match socket.send(Message::Text(frame)).await {
        Ok(()) => {
            stats.msgs_out += 1;
            stats.bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Disconnect follows immediately; the loop closes the socket.
            warn!(error = ?err, "failed to send frame");
            LoopControl::Disconnect
        }
    }
}

async fn forward_run_state(
    state: RunState,
    socket: &mut WebSocket,
    stats: &mut ConnStats,
) -> LoopControl {
    let msg = ServerMessage::RunState(state.into());
    match send_message(socket, &msg).await {
        Ok(bytes) => {
            stats.msgs_out += 1;
            stats.bytes_out += bytes as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Disconnect follows immediately; the loop closes the socket.
            warn!(error = ?err, "failed to send run state");
            LoopControl::Disconnect
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ParticleCounts, ReactionSnapshot};

    fn frame(tick: u64) -> FrameUpdate {
        FrameUpdate {
            tick,
            run_state: RunState::Paused,
            reaction: ReactionSnapshot {
                time: 0.0,
                kno3_concentration: 0.5,
                charcoal_concentration: 0.3,
                sulfur_concentration: 0.2,
                temperature: 298.15,
                pressure: 101325.0,
                energy_release: 0.0,
                burn_rate: 0.0,
            },
            counts: ParticleCounts::new(375, 225, 150),
            particles: Vec::new(),
            warning: None,
        }
    }

    #[tokio::test]
    async fn when_frame_is_published_then_serializer_broadcasts_and_stores_bytes() {
        let (frame_tx, frame_rx) = broadcast::channel(8);
        let (bytes_tx, mut bytes_rx) = broadcast::channel(8);
        let (latest_tx, latest_rx) = watch::channel(Utf8Bytes::from(""));
        let handle = tokio::spawn(frame_serializer(frame_rx, bytes_tx, latest_tx));

        frame_tx.send(frame(7)).expect("serializer should be subscribed");
        let bytes = tokio::time::timeout(Duration::from_secs(2), bytes_rx.recv())
            .await
            .expect("serialized frame should arrive")
            .expect("bytes channel open");

        let value: serde_json::Value =
            serde_json::from_str(bytes.as_str()).expect("frame should be valid json");
        assert_eq!(value["type"], "Frame");
        assert_eq!(value["data"]["tick"], 7);
        assert_eq!(latest_rx.borrow().as_str(), bytes.as_str());

        drop(frame_tx);
        handle.await.expect("serializer should exit when frames close");
    }

    #[test]
    fn when_control_channel_is_full_then_command_is_dropped_without_disconnect() {
        let (tx, _rx) = mpsc::channel(1);
        let mut last = Instant::now() - LOG_THROTTLE;

        let first = forward_control(ControlEvent::Start, &tx, &mut last);
        let second = forward_control(ControlEvent::Pause, &tx, &mut last);

        assert!(matches!(first, Ok(LoopControl::Continue)));
        assert!(matches!(second, Ok(LoopControl::Continue)));
    }

    #[test]
    fn when_control_channel_is_closed_then_forward_fails() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut last = Instant::now();

        let result = forward_control(ControlEvent::Toggle, &tx, &mut last);
        assert!(matches!(result, Err(NetError::ControlClosed)));
    }

    #[test]
    fn when_too_many_invalid_messages_then_client_is_disconnected() {
        let (tx, _rx) = mpsc::channel(1);
        let mut stats = ConnStats::default();
        let mut last_full = Instant::now();
        let mut last_invalid = Instant::now();
        let mut close = None;

        for _ in 0..MAX_INVALID_JSON {
            let outcome = handle_incoming_ws(
                Some(Ok(Message::Text("not json".into()))),
                &tx,
                &mut stats,
                &mut last_full,
                &mut last_invalid,
                &mut close,
            );
            assert!(matches!(outcome, Ok(LoopControl::Continue)));
        }

        let outcome = handle_incoming_ws(
            Some(Ok(Message::Text("still not json".into()))),
            &tx,
            &mut stats,
            &mut last_full,
            &mut last_invalid,
            &mut close,
        );
        assert!(matches!(outcome, Ok(LoopControl::Disconnect)));
        assert_eq!(close.map(|f| f.code), Some(close_code::POLICY));
    }
}
