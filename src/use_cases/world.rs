use super::simulation::Simulation;
use super::types::{ControlEvent, FrameUpdate, RunState, TickOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tracing::{info, warn};

/// Fixed-step loop that owns the simulation.
///
/// Control events are applied between ticks only, so every tick runs to
/// completion before the next input or frame is seen.
pub async fn world_task(
    mut simulation: Simulation,
    mut control_rx: mpsc::Receiver<ControlEvent>,
    frame_tx: broadcast::Sender<FrameUpdate>,
    run_state_tx: watch::Sender<RunState>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) {
    let mut interval = tokio::time::interval(tick_interval);

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!("world task stopping");
                break;
            }
            _ = interval.tick() => {}
        }

        while let Ok(ev) = control_rx.try_recv() {
            simulation.handle_event(ev);
        }

        match simulation.tick() {
            TickOutcome::Rejected(err) => warn!(%err, "tick rejected; run paused"),
            TickOutcome::Exhausted => info!(
                time = simulation.model().time(),
                remaining = simulation.field().len(),
                "reaction finished"
            ),
            TickOutcome::Advanced | TickOutcome::Idle => {}
        }

        let current = simulation.run_state();
        run_state_tx.send_if_modified(|state| {
            if *state != current {
                *state = current;
                true
            } else {
                false
            }
        });

        // No subscribers is fine; frames are dropped until a client connects.
        let _ = frame_tx.send(simulation.frame());
    }
}
