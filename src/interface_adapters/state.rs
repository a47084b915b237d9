use crate::interface_adapters::protocol::LegendDto;
use crate::use_cases::{ControlEvent, FrameUpdate, RunState};
use axum::extract::ws::Utf8Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, mpsc, watch};

pub struct AppState {
    // Control events flowing from clients into the world task.
    pub control_tx: mpsc::Sender<ControlEvent>,
    // Frames produced by the world task (use-case structs).
    pub frame_tx: broadcast::Sender<FrameUpdate>,
    // Serialized frames, shared across all connections.
    pub frame_bytes_tx: broadcast::Sender<Utf8Bytes>,
    // Latest serialized frame for lag recovery and `GET /snapshot`.
    pub frame_latest_tx: watch::Sender<Utf8Bytes>,
    // Run/pause/exhausted state for the start button.
    pub run_state_tx: watch::Sender<RunState>,
    // Drawing info sent once per connection.
    pub legend: LegendDto,
    next_conn_id: AtomicU64,
}

impl AppState {
    pub fn new(
        control_tx: mpsc::Sender<ControlEvent>,
        frame_tx: broadcast::Sender<FrameUpdate>,
        frame_bytes_tx: broadcast::Sender<Utf8Bytes>,
        frame_latest_tx: watch::Sender<Utf8Bytes>,
        run_state_tx: watch::Sender<RunState>,
        legend: LegendDto,
    ) -> Self {
        Self {
            control_tx,
            frame_tx,
            frame_bytes_tx,
            frame_latest_tx,
            run_state_tx,
            legend,
            next_conn_id: AtomicU64::new(1),
        }
    }

    /// Process-unique id for correlating connection logs.
    pub fn next_conn_id(&self) -> u64 {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }
}
