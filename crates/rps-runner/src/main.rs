//! Headless runner: drives a terrain until it absorbs or is interrupted.

mod checkpoint;
mod telemetry;

use anyhow::{Context, Result};
use checkpoint::{Checkpoint, CheckpointStore};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rps_core::RunnerConfig;
use rps_world::{Driver, SharedTerrain, Terrain};
use tokio::signal;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

const CONFIG_ENV: &str = "RPS_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = load_config()?;

    telemetry::init_tracing(&config.log)?;

    info!(
        size = config.terrain.size,
        topology = ?config.terrain.topology,
        seed = ?config.seed,
        "Starting rps runner"
    );

    // A resumed run reseeds from config.seed; the rng state is not checkpointed.
    let rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let terrain = SharedTerrain::new(Terrain::from_config(&config.terrain, rng)?);
    let store = config.checkpoint_path.as_deref().map(CheckpointStore::new);

    let was_running = restore_or_reset(&terrain, store.as_ref()).await;

    let mut driver = Driver::new(config.driver.clone())?;
    if terrain.is_absorbed() {
        info!("Terrain already absorbed; nothing to run");
    } else if was_running || config.autostart {
        driver.start();
    }

    if driver.is_running() {
        tokio::select! {
            _ = run_loop(&terrain, &mut driver, &config) => {}
            _ = shutdown_signal() => {}
        }
    }

    let counts = terrain.counts();
    info!(
        iterations = terrain.iterations(),
        counts = %counts,
        absorbed = terrain.is_absorbed(),
        "Run finished"
    );

    if let Some(store) = &store {
        let checkpoint = Checkpoint::new(driver.is_running(), terrain.snapshot());
        if let Err(e) = store.save(&checkpoint).await {
            error!("Failed to save checkpoint: {}", e);
        }
    }

    Ok(())
}

fn load_config() -> Result<RunnerConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => RunnerConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path)),
        Err(_) => Ok(RunnerConfig::default()),
    }
}

/// Restore the checkpoint if there is one, otherwise start from a fresh
/// random terrain. Returns the checkpoint's running flag.
async fn restore_or_reset(terrain: &SharedTerrain, store: Option<&CheckpointStore>) -> bool {
    if let Some(store) = store {
        match store.load().await {
            Ok(Some(checkpoint)) => match terrain.restore(&checkpoint.terrain) {
                Ok(()) => return checkpoint.running,
                Err(e) => warn!("Ignoring checkpoint: {}", e),
            },
            Ok(None) => {}
            Err(e) => warn!("Failed to load checkpoint: {}", e),
        }
    }

    terrain.reset();
    false
}

async fn run_loop(terrain: &SharedTerrain, driver: &mut Driver, config: &RunnerConfig) {
    let mut clock = interval(driver.sleep_interval());
    clock.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while driver.is_running() {
        clock.tick().await;
        let report = driver.tick(terrain);

        if report.tick % config.report_every == 0 {
            info!(
                tick = report.tick,
                iterations = report.iterations,
                counts = %report.counts,
                "Progress"
            );
        }

        if config.max_ticks.is_some_and(|max| report.tick >= max) {
            info!(tick = report.tick, "Tick limit reached");
            break;
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
