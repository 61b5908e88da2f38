// Framework bootstrap for the simulation server runtime.

use crate::domain::{SimClock, SnapshotStore};
use crate::frameworks::config;
use crate::interface_adapters::net::{router, serve_pilots, snapshot_serializer};
use crate::interface_adapters::snapshot::{JsonSnapshotFiles, encode_snapshot};
use crate::interface_adapters::state::AppState;
use crate::use_cases::autosave::autosave_task;
use crate::use_cases::scheduler::TickScheduler;
use crate::use_cases::{
    CommandBatch, Simulation, SimulationSettings, WorldChannels, WorldSettings, WorldUpdate,
    world_task,
};

use std::net::SocketAddr;
use std::{io::Result, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, watch};

/// Everything `run` needs besides the two bound sockets.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub save_path: String,
    pub tick_rate: f64,
    pub gravity: bool,
    pub autosave_path: Option<String>,
    pub autosave_period: Duration,
}

impl ServerSettings {
    pub fn from_env() -> Self {
        Self {
            save_path: config::save_path(),
            tick_rate: config::tick_rate(),
            gravity: config::gravity_enabled(),
            autosave_path: config::autosave_path(),
            autosave_period: config::autosave_period(),
        }
    }
}

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

pub async fn run(
    pilot_listener: TcpListener,
    http_listener: TcpListener,
    settings: ServerSettings,
) -> Result<()> {
    let store: Arc<dyn SnapshotStore> = Arc::new(JsonSnapshotFiles);
    let (state, command_rx) = build_state(&settings, store).await?;

    // Subscribe before the world loop starts so the first update is not missed.
    tokio::spawn(snapshot_serializer(
        state.world_tx.subscribe(),
        state.snapshot_latest_tx.clone(),
    ));

    // Spawn the world loop. It owns the command receiver for the life of the process.
    let world_settings = WorldSettings {
        tick_period: TickScheduler::period_for(settings.tick_rate),
        max_ticks_per_batch: config::MAX_TICKS_PER_BATCH,
    };
    tokio::spawn(world_task(
        state.sim.clone(),
        WorldChannels {
            command_rx,
            world_tx: state.world_tx.clone(),
            shutdown: state.shutdown_tx.subscribe(),
        },
        state.store.clone(),
        world_settings,
    ));

    if let Some(path) = settings.autosave_path.clone() {
        tokio::spawn(autosave_task(
            state.sim.clone(),
            state.store.clone(),
            path,
            settings.autosave_period,
            state.shutdown_tx.subscribe(),
        ));
    }

    let pilot_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = serve_pilots(pilot_listener, pilot_state).await {
            tracing::error!(error = %e, "pilot listener failed");
        }
    });

    let address = http_listener.local_addr()?;
    tracing::info!(%address, "http viewer listening");

    let signal_state = state.clone();
    let result = axum::serve(http_listener, router(state.clone()))
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
            signal_state.shutdown_tx.send_replace(true);
        })
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        });

    state.shutdown_tx.send_replace(true);
    result
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let pilot_address = SocketAddr::from(([0, 0, 0, 0], config::pilot_port()));
    let http_address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listeners with error handling
    let pilot_listener = TcpListener::bind(pilot_address)
        .await
        .inspect_err(|e| {
            tracing::error!(address = %pilot_address, error = %e, "failed to bind pilot port");
        })?;
    let http_listener = TcpListener::bind(http_address)
        .await
        .inspect_err(|e| {
            tracing::error!(address = %http_address, error = %e, "failed to bind http port");
        })?;

    run(pilot_listener, http_listener, ServerSettings::from_env()).await
}

// The command receiver is returned separately: only the world loop may own it.
async fn build_state(
    settings: &ServerSettings,
    store: Arc<dyn SnapshotStore>,
) -> Result<(Arc<AppState>, mpsc::Receiver<CommandBatch>)> {
    // A corrupt startup snapshot is fatal: there is no world to fall back to.
    let save_path = settings.save_path.clone();
    let loader = store.clone();
    let bodies = tokio::task::spawn_blocking(move || loader.load(&save_path))
        .await
        .map_err(std::io::Error::other)?
        .map_err(|e| {
            tracing::error!(path = %settings.save_path, error = %e, "failed to load startup snapshot");
            std::io::Error::other(format!("failed to load {}: {e}", settings.save_path))
        })?;
    tracing::info!(
        path = %settings.save_path,
        bodies = bodies.len(),
        tick_rate = settings.tick_rate,
        gravity = settings.gravity,
        "startup snapshot loaded"
    );

    let initial = encode_snapshot(&bodies).map_err(std::io::Error::other)?;
    let sim = Simulation::new(
        bodies,
        SimClock::new(settings.tick_rate),
        SimulationSettings {
            gravity: settings.gravity,
            ..Default::default()
        },
    )
    .into_shared();

    let (command_tx, command_rx) = mpsc::channel(config::COMMAND_CHANNEL_CAPACITY);
    let (world_tx, _world_rx) = broadcast::channel::<WorldUpdate>(config::WORLD_BROADCAST_CAPACITY);
    let (snapshot_latest_tx, _snapshot_latest_rx) = watch::channel::<Arc<str>>(initial.into());
    let (shutdown_tx, _shutdown_rx) = watch::channel(false);

    let state = Arc::new(AppState {
        sim,
        command_tx,
        world_tx,
        snapshot_latest_tx,
        store,
        shutdown_tx,
    });
    Ok((state, command_rx))
}
