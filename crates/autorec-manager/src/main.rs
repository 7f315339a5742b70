//! Game Auto-Recorder manager entry point.
//!
//! One subcommand per action: control the background watcher, inspect the
//! desktop to find a selector, and edit the watched-games list.  Results go to
//! stdout; diagnostics go to stderr through `tracing` (quiet unless
//! `RUST_LOG` is set).
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ AppPaths::resolve()          -- --data-dir / AUTOREC_HOME / platform dir
//!  ├─ WatcherControl               start | stop | status | monitor
//!  ├─ NativeProbe + inspect_windows windows | search | detect
//!  └─ ManageGamesUseCase<GamesStore> games | add | remove | toggle | enable | disable
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::error;
use tracing_subscriber::EnvFilter;

use autorec_core::SystemSnapshot;
use autorec_manager::application::inspect_windows::{render_search, render_suggestion, render_window_list};
use autorec_manager::application::manage_games::{
    describe_entry, render_game_list, GameRef, ManageGamesUseCase,
};
use autorec_manager::application::status::StatusReport;
use autorec_manager::infrastructure::watcher_control::monitor_state;
use autorec_manager::infrastructure::{GamesStore, WatcherControl};
use autorec_watcher::application::record_games::SystemProbe;
use autorec_watcher::infrastructure::enumeration::NativeProbe;
use autorec_watcher::infrastructure::storage::AppPaths;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "autorec-manager",
    about = "Manage the Game Auto-Recorder games list and background watcher",
    version
)]
struct Cli {
    /// Directory holding games_config.json and the watcher's runtime files.
    #[arg(long, global = true, env = "AUTOREC_HOME")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the watcher in the background.
    Start {
        /// Watcher executable (default: next to this program).
        #[arg(long)]
        watcher_path: Option<PathBuf>,
    },
    /// Stop the background watcher.
    Stop,
    /// Show whether the watcher runs and what it is doing.
    Status,
    /// Print watcher state changes until Ctrl+C.
    Monitor {
        /// Milliseconds between reads of the state file.
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
    /// List visible windows.
    Windows,
    /// List windows whose title or executable contains TERM.
    Search { term: String },
    /// Suggest the window of the game that is running now.
    Detect,
    /// List watched games.
    Games,
    /// Add a game.
    Add {
        name: String,
        /// Text to look for in window titles and executable names.
        selector: String,
        /// Add the game without enabling it.
        #[arg(long)]
        disabled: bool,
    },
    /// Remove a game (by number or selector).
    Remove { game: GameRef },
    /// Enable a disabled game or disable an enabled one.
    Toggle { game: GameRef },
    /// Enable a game.
    Enable { game: GameRef },
    /// Disable a game.
    Disable { game: GameRef },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let paths = AppPaths::resolve(cli.data_dir.clone()).context("failed to locate the data directory")?;
    let games = ManageGamesUseCase::new(GamesStore::new(&paths));

    match cli.command {
        // ── Watcher control ──────────────────────────────────────────────────
        Command::Start { watcher_path } => {
            let exe = WatcherControl::locate_watcher(watcher_path)
                .context("failed to locate the watcher executable")?;
            let control = WatcherControl::new(paths.clone(), exe);
            let pid = control.start_watcher().await.context("failed to start the watcher")?;
            println!("Watcher started (PID {pid}). Log: {}", paths.log_file().display());
        }
        Command::Stop => {
            let control = WatcherControl::new(paths.clone(), PathBuf::new());
            let pid = control.stop_watcher().context("failed to stop the watcher")?;
            println!("Watcher stopped (PID {pid}).");
        }
        Command::Status => {
            let control = WatcherControl::new(paths.clone(), PathBuf::new());
            let pid = control.watcher_pid().context("failed to read the PID file")?;
            let config = games.list().context("failed to read the games list")?;
            print!("{}", StatusReport::new(pid, control.current_state(), &config));
        }
        Command::Monitor { interval_ms } => {
            let control = WatcherControl::new(paths.clone(), PathBuf::new());
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        let _ = shutdown_tx.send(true);
                    }
                    Err(e) => {
                        error!("failed to listen for Ctrl+C signal: {e}");
                        std::future::pending::<()>().await;
                    }
                }
            });
            println!("Monitoring {} (Ctrl+C to stop)", control.state_file().path().display());
            monitor_state(
                control.state_file(),
                Duration::from_millis(interval_ms.max(50)),
                shutdown_rx,
                |line| println!("{line}"),
            )
            .await;
        }

        // ── Desktop inspection ───────────────────────────────────────────────
        Command::Windows => print!("{}", render_window_list(&take_snapshot()?)),
        Command::Search { term } => print!("{}", render_search(&term, &take_snapshot()?)),
        Command::Detect => print!("{}", render_suggestion(&take_snapshot()?)),

        // ── Games list ───────────────────────────────────────────────────────
        Command::Games => {
            let config = games.list().context("failed to read the games list")?;
            print!("{}", render_game_list(&config));
        }
        Command::Add {
            name,
            selector,
            disabled,
        } => {
            let entry = games
                .add_game(&name, &selector, !disabled)
                .context("failed to add game")?;
            println!("Added {}", describe_entry(&entry));
        }
        Command::Remove { game } => {
            let removed = games.remove_game(&game).context("failed to remove game")?;
            println!("Removed {}", removed.entry.name);
            if removed.icon_removed {
                println!("Deleted icon {}", removed.entry.icon_path);
            }
        }
        Command::Toggle { game } => {
            let entry = games.toggle_game(&game).context("failed to toggle game")?;
            println!("{}", describe_entry(&entry));
        }
        Command::Enable { game } => {
            let entry = games.set_game_enabled(&game, true).context("failed to enable game")?;
            println!("{}", describe_entry(&entry));
        }
        Command::Disable { game } => {
            let entry = games.set_game_enabled(&game, false).context("failed to disable game")?;
            println!("{}", describe_entry(&entry));
        }
    }

    Ok(())
}

fn take_snapshot() -> anyhow::Result<SystemSnapshot> {
    NativeProbe::new()
        .snapshot()
        .context("failed to enumerate windows")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_with_defaults() {
        let cli = Cli::parse_from(["autorec-manager", "add", "Elden Ring", "ELDEN RING"]);

        match cli.command {
            Command::Add {
                name,
                selector,
                disabled,
            } => {
                assert_eq!(name, "Elden Ring");
                assert_eq!(selector, "ELDEN RING");
                assert!(!disabled);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_game_argument_accepts_number_or_selector() {
        let by_index = Cli::parse_from(["autorec-manager", "toggle", "3"]);
        let by_selector = Cli::parse_from(["autorec-manager", "remove", "hades.exe"]);

        assert!(matches!(by_index.command, Command::Toggle { game: GameRef::Index(3) }));
        assert!(matches!(
            by_selector.command,
            Command::Remove { game: GameRef::Selector(ref s) } if s == "hades.exe"
        ));
    }

    #[test]
    fn test_data_dir_is_global() {
        let cli = Cli::parse_from(["autorec-manager", "games", "--data-dir", "/tmp/autorec"]);

        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/autorec")));
        assert!(matches!(cli.command, Command::Games));
    }

    #[test]
    fn test_start_accepts_watcher_path() {
        let cli = Cli::parse_from(["autorec-manager", "start", "--watcher-path", "bin/autorec-watcher"]);
        assert!(matches!(
            cli.command,
            Command::Start { watcher_path: Some(ref p) } if p == &PathBuf::from("bin/autorec-watcher")
        ));
    }

    #[test]
    fn test_monitor_default_interval() {
        let cli = Cli::parse_from(["autorec-manager", "monitor"]);
        assert!(matches!(cli.command, Command::Monitor { interval_ms: 500 }));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["autorec-manager"]).is_err());
        assert!(Cli::try_parse_from(["autorec-manager", "add", "only-name"]).is_err());
    }
}
