//! Headless AI-vs-AI battle.
//!
//! Builds a skirmish from the built-in blueprints, lets the planner play
//! both fleets, records the replay and checks it rebuilds the final state.
mod config;
mod dirs;

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, ensure};
use serde_json::json;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use battle_core::{BattleConfig, FleetId};
use battle_runtime::{
    BattleRuntime, Blueprint, FileReplayLog, PlannerConfig, RuntimeConfig, load_replay, skirmish,
};

use config::SimConfig;

const DESIGNS: [Blueprint; 4] = [
    Blueprint::Frigate,
    Blueprint::Destroyer,
    Blueprint::Scout,
    Blueprint::Sentinel,
];

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SimConfig::from_env();
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    let session = format!("battle-{}-{timestamp}", config.seed);

    let log_dir = config.log_dir.clone().unwrap_or_else(dirs::log_dir);
    let _guard = setup_logging(&log_dir, &session)?;
    for warning in &config.warnings {
        warn!(target: "battle_sim", "{warning}");
    }

    let battle = skirmish(BattleConfig::default(), config.fleet_size, &DESIGNS)
        .context("failed to assemble the skirmish")?;
    let replay_path = config
        .replay_dir
        .clone()
        .unwrap_or_else(dirs::replay_dir)
        .join(&session);
    let replay = FileReplayLog::create(&replay_path)
        .with_context(|| format!("failed to create replay in {}", replay_path.display()))?;

    let [blue, red] = config.personalities;
    let runtime_config = RuntimeConfig {
        planner_timeout: config.planner_timeout,
        planner: PlannerConfig::default()
            .with_personality(FleetId(1), blue)
            .with_personality(FleetId(2), red),
        ..RuntimeConfig::default()
    };
    let mut runtime = BattleRuntime::builder()
        .config(runtime_config)
        .battle(battle)
        .seed(config.seed)
        .replay(replay)
        .build()
        .await?;
    info!(
        target: "battle_sim",
        session = %session,
        seed = config.seed,
        fleet_size = config.fleet_size,
        blue = %blue,
        red = %red,
        "battle starting"
    );

    let handle = runtime.handle();
    let summary = runtime.run_to_completion(config.max_cycles).await?;
    let live = handle.query_battle().await?;
    let digest = live.state_digest()?;
    drop(handle);
    runtime.shutdown().await?;

    let replayed = load_replay(&FileReplayLog::open(&replay_path)?)?;
    ensure!(
        replayed.state_digest()? == digest,
        "replay in {} does not rebuild the final battle",
        replay_path.display()
    );
    info!(target: "battle_sim", replay = %replay_path.display(), "replay verified");

    let survivors: Vec<_> = live
        .fleets
        .iter()
        .map(|fleet| {
            json!({
                "fleet": fleet.name,
                "alive": live.allies_of(fleet.id).count(),
            })
        })
        .collect();
    let report = json!({
        "session": session,
        "seed": config.seed,
        "outcome": summary.outcome,
        "cycle": summary.cycle,
        "actions": summary.actions,
        "fallbacks": summary.fallbacks,
        "survivors": survivors,
        "digest": digest,
        "replay": replay_path.display().to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Logs to stderr and to `<log_dir>/<session>.log`.
///
/// The returned guard flushes the file writer when dropped.
fn setup_logging(log_dir: &Path, session: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(log_dir, format!("{session}.log"));
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    info!(
        target: "battle_sim",
        log = %log_dir.join(format!("{session}.log")).display(),
        "logging initialized"
    );
    Ok(guard)
}
