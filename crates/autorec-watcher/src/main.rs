//! Game Auto-Recorder watcher entry point.
//!
//! Polls the desktop for configured games and starts OBS recording while one
//! of them runs.  Usually launched in the background by `autorec-manager
//! start`, but can be run in a terminal for debugging.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ AppPaths::resolve()     -- --data-dir / AUTOREC_HOME / platform dir
//!  └─ load_or_create_settings() -- settings.toml, CLI flags override
//!  └─ WatchGamesUseCase::run()
//!       ├─ NativeProbe        (windows + process table)
//!       ├─ ObsWebSocketHost   (obs-websocket v5)
//!       ├─ GamesFile          (games_config.json, reloaded every tick)
//!       └─ StateFile          (game_state)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use autorec_watcher::application::record_games::{RecordingHost, WatchGamesUseCase};
use autorec_watcher::infrastructure::enumeration::NativeProbe;
use autorec_watcher::infrastructure::obs::{ObsConnection, ObsWebSocketHost};
use autorec_watcher::infrastructure::process::is_process_alive;
use autorec_watcher::infrastructure::storage::games_file::GamesFile;
use autorec_watcher::infrastructure::storage::runtime::{PidFile, StateFile};
use autorec_watcher::infrastructure::storage::settings::{clamp_interval_ms, load_or_create_settings, AppSettings};
use autorec_watcher::infrastructure::storage::AppPaths;

// ── CLI ───────────────────────────────────────────────────────────────────────

/// Command-line arguments.  Anything not given falls back to `settings.toml`.
#[derive(Debug, Parser)]
#[command(
    name = "autorec-watcher",
    about = "Starts and stops OBS recording while a configured game is running",
    version
)]
struct Cli {
    /// Directory holding games_config.json, settings.toml and runtime files.
    #[arg(long, env = "AUTOREC_HOME")]
    data_dir: Option<PathBuf>,

    /// Milliseconds between polls (clamped to 1000..=30000).
    #[arg(long, env = "AUTOREC_INTERVAL_MS")]
    interval_ms: Option<u64>,

    /// obs-websocket host.
    #[arg(long)]
    obs_host: Option<String>,

    /// obs-websocket port.
    #[arg(long)]
    obs_port: Option<u16>,

    /// obs-websocket server password.
    #[arg(long, env = "OBS_WEBSOCKET_PASSWORD", hide_env_values = true)]
    obs_password: Option<String>,
}

impl Cli {
    /// Applies CLI overrides on top of the loaded settings.
    fn apply_to(&self, settings: &mut AppSettings) {
        if let Some(ms) = self.interval_ms {
            settings.watcher.check_interval_ms = clamp_interval_ms(ms);
        }
        if let Some(host) = &self.obs_host {
            settings.obs.host = host.clone();
        }
        if let Some(port) = self.obs_port {
            settings.obs.port = port;
        }
        if let Some(password) = &self.obs_password {
            settings.obs.password = Some(password.clone());
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = AppPaths::resolve(cli.data_dir.clone()).context("failed to locate the data directory")?;
    paths.ensure_root().context("failed to create the data directory")?;

    let mut settings = load_or_create_settings(&paths.settings_file()).context("failed to load settings")?;
    cli.apply_to(&mut settings);

    // Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.watcher.log_level)),
        )
        .init();

    let pid_file = PidFile::new(paths.pid_file());
    let state_file = StateFile::new(paths.state_file());
    let my_pid = std::process::id();

    match pid_file.read() {
        Ok(Some(pid)) if pid != my_pid && is_process_alive(pid) => {
            anyhow::bail!("another watcher is already running (PID {pid})");
        }
        Ok(_) => {}
        Err(e) => warn!("ignoring unreadable PID file: {e}"),
    }
    pid_file.write(my_pid).context("failed to write PID file")?;

    let connection: ObsConnection = settings.obs.to_connection();
    info!(
        "Game Auto-Recorder watcher starting (PID {my_pid}, data dir {}, OBS {})",
        paths.root().display(),
        connection.url()
    );

    let host = Arc::new(ObsWebSocketHost::new(connection));
    let mut use_case = WatchGamesUseCase::new(
        Arc::new(NativeProbe::new()),
        Arc::clone(&host) as Arc<dyn RecordingHost>,
        Arc::new(GamesFile::new(paths.games_file())),
        Arc::new(state_file.clone()),
    );

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                error!("failed to listen for Ctrl+C signal: {e}");
                // Keep the sender alive so the watch loop is not torn down.
                std::future::pending::<()>().await;
            }
        }
    });

    use_case
        .run(settings.watcher.check_interval(), shutdown_rx)
        .await;

    // A recording the watcher started is left running on exit.
    if let Some(game) = use_case.owned_game() {
        info!("leaving the recording for {game} running");
    }
    host.disconnect().await;

    if let Err(e) = pid_file.remove() {
        warn!("could not remove PID file: {e}");
    }
    if let Err(e) = state_file.remove() {
        warn!("could not remove state file: {e}");
    }

    info!("Game Auto-Recorder watcher stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
