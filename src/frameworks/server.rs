// Framework bootstrap for the sketch server runtime.

use crate::domain::IngredientRatios;
use crate::frameworks::config;
use crate::interface_adapters::net::{control_handler, frame_serializer, snapshot_handler, ws_handler};
use crate::interface_adapters::protocol::LegendDto;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{ControlEvent, FrameUpdate, RunState, Simulation, world::world_task};

use axum::{
    Router,
    extract::ws::Utf8Bytes,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::{Notify, broadcast, mpsc, watch};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let shutdown = Arc::new(Notify::new());
    let state = build_state(shutdown.clone())?;

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/snapshot", get(snapshot_handler))
        .route("/control", post(control_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    let served = axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    });
    shutdown.notify_one();
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_simulation() -> Result<Simulation> {
    let settings = config::simulation_settings();

    Simulation::new(config::initial_ratios(), settings)
        .or_else(|err| {
            tracing::warn!(%err, "configured ratios rejected; using defaults");
            Simulation::new(IngredientRatios::default(), settings)
        })
        .map_err(|e| std::io::Error::other(format!("failed to build simulation: {e}")))
}

fn build_state(shutdown: Arc<Notify>) -> Result<Arc<AppState>> {
    let simulation = build_simulation()?;
    let settings = *simulation.settings();
    tracing::info!(
        particles = simulation.field().len(),
        budget = settings.particle_budget,
        eviction = ?settings.eviction,
        "simulation ready"
    );

    // control_tx/rx: every client command goes to the single world task.
    let (control_tx, control_rx) =
        mpsc::channel::<ControlEvent>(config::CONTROL_CHANNEL_CAPACITY);
    let (frame_tx, _frame_rx) = broadcast::channel::<FrameUpdate>(config::FRAME_BROADCAST_CAPACITY);
    let (frame_bytes_tx, _frame_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(config::FRAME_BROADCAST_CAPACITY);
    let (frame_latest_tx, _frame_latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
    let (run_state_tx, _run_state_rx) = watch::channel::<RunState>(simulation.run_state());

    let state = Arc::new(AppState::new(
        control_tx,
        frame_tx,
        frame_bytes_tx,
        frame_latest_tx,
        run_state_tx,
        LegendDto::from(&settings),
    ));

    // Subscribe the serializer before the world task can publish its first frame.
    tokio::spawn(frame_serializer(
        state.frame_tx.subscribe(),
        state.frame_bytes_tx.clone(),
        state.frame_latest_tx.clone(),
    ));

    tokio::spawn(world_task(
        simulation,
        control_rx,
        state.frame_tx.clone(),
        state.run_state_tx.clone(),
        config::tick_interval(),
        shutdown,
    ));

    Ok(state)
}
