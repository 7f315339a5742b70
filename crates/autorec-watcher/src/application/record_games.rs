//! WatchGamesUseCase: polls the desktop and toggles recording.
//!
//! Every tick the use case reloads the games list, takes a fresh
//! [`SystemSnapshot`], asks the domain which enabled game (if any) is running,
//! and lets the [`RecordingController`] decide whether to start or stop the
//! host's recording.  The resulting [`WatcherState`] is published whenever it
//! changes so the manager CLI can show it.
//!
//! # Ownership
//!
//! The watcher only stops recordings it started itself.  If the host is
//! already recording when a game appears, the watcher reports
//! [`WatcherState::Detected`] and leaves that recording alone.
//!
//! All OS, network and file access is behind the traits below, so the use
//! case is fully unit-testable.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use autorec_core::{find_running_game, Detection, GameEntry, GamesConfig, SystemSnapshot, WatcherState};
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

// ── Errors ────────────────────────────────────────────────────────────────────

/// Error type for desktop enumeration.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
    #[error("{call} failed: {message}")]
    Os { call: &'static str, message: String },
}

/// Error type for calls into the recording host.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host could not be reached or the connection dropped.
    #[error("host unreachable: {0}")]
    Unreachable(String),
    /// The host requires a password and none is configured.
    #[error("host requires authentication but no password is configured")]
    AuthenticationRequired,
    /// The host did not answer in time.
    #[error("host did not respond within {0:?}")]
    Timeout(Duration),
    /// The host answered with a failure status.
    #[error("{request} rejected with code {code}: {comment}")]
    Rejected {
        request: &'static str,
        code: u16,
        comment: String,
    },
    /// The host sent something the client could not make sense of.
    #[error("protocol error: {0}")]
    Protocol(String),
}

// ── Seams ─────────────────────────────────────────────────────────────────────

/// Trait for reading the visible windows and the process table.
///
/// The production implementation calls Win32; tests serve fixed snapshots.
pub trait SystemProbe: Send + Sync {
    fn snapshot(&self) -> Result<SystemSnapshot, ProbeError>;
}

/// Trait for the application that does the actual recording.
///
/// Infrastructure implementations talk to OBS; test implementations record calls.
#[async_trait]
pub trait RecordingHost: Send + Sync {
    /// Returns `true` if the host is currently recording.
    async fn is_recording(&self) -> Result<bool, HostError>;
    /// Starts recording.  Succeeds if the host was already recording.
    async fn start_recording(&self) -> Result<(), HostError>;
    /// Stops recording.  Succeeds if the host was not recording.
    async fn stop_recording(&self) -> Result<(), HostError>;
}

/// Trait for loading the watched-games list.
pub trait GamesSource: Send + Sync {
    fn load_games(&self) -> Result<GamesConfig, String>;
}

/// Trait for making the watcher state visible outside the process.
pub trait StatePublisher: Send + Sync {
    fn publish(&self, state: &WatcherState) -> Result<(), String>;
}

// ── Recording controller ──────────────────────────────────────────────────────

/// What the controller did on one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerAction {
    /// Recording was started for this game; the watcher now owns it.
    Started { game: String },
    /// The game is running but the host was already recording.
    AlreadyRecording { game: String },
    /// The watcher's own recording continues.
    StillRecording { game: String },
    /// The watcher's recording was stopped because no game is running.
    Stopped { game: String },
    /// No game is running and the watcher owns nothing.
    Idle,
}

impl ControllerAction {
    /// Maps the action to the state shown to the user.
    pub fn to_state(&self) -> WatcherState {
        match self {
            ControllerAction::Started { game } | ControllerAction::StillRecording { game } => {
                WatcherState::Recording { game: game.clone() }
            }
            ControllerAction::AlreadyRecording { game } => WatcherState::Detected { game: game.clone() },
            ControllerAction::Stopped { .. } | ControllerAction::Idle => WatcherState::Idle,
        }
    }
}

/// Decides when to start and stop the host's recording.
///
/// Holds the name of the game whose recording the watcher owns, if any.
pub struct RecordingController {
    host: Arc<dyn RecordingHost>,
    owned: Option<String>,
}

impl RecordingController {
    pub fn new(host: Arc<dyn RecordingHost>) -> Self {
        Self { host, owned: None }
    }

    /// Returns the game whose recording the watcher started, if any.
    pub fn owned_game(&self) -> Option<&str> {
        self.owned.as_deref()
    }

    /// Applies one detection result.
    ///
    /// # Errors
    ///
    /// Returns the host error unchanged.  Ownership is only released after a
    /// successful stop, so a failed stop is retried on the next call.
    pub async fn on_detection(&mut self, running: Option<&GameEntry>) -> Result<ControllerAction, HostError> {
        match (running, self.owned.take()) {
            (Some(game), Some(_)) => {
                // Follow the running game if the player switched titles.
                self.owned = Some(game.name.clone());
                Ok(ControllerAction::StillRecording {
                    game: game.name.clone(),
                })
            }
            (Some(game), None) => {
                if self.host.is_recording().await? {
                    return Ok(ControllerAction::AlreadyRecording {
                        game: game.name.clone(),
                    });
                }
                self.host.start_recording().await?;
                self.owned = Some(game.name.clone());
                Ok(ControllerAction::Started {
                    game: game.name.clone(),
                })
            }
            (None, Some(owned)) => match self.host.stop_recording().await {
                Ok(()) => Ok(ControllerAction::Stopped { game: owned }),
                Err(e) => {
                    self.owned = Some(owned);
                    Err(e)
                }
            },
            (None, None) => Ok(ControllerAction::Idle),
        }
    }
}

// ── Use case ──────────────────────────────────────────────────────────────────

/// The watcher's poll loop.
pub struct WatchGamesUseCase {
    probe: Arc<dyn SystemProbe>,
    games: Arc<dyn GamesSource>,
    publisher: Arc<dyn StatePublisher>,
    controller: RecordingController,
    last_games: GamesConfig,
    state: WatcherState,
    published: Option<WatcherState>,
}

impl WatchGamesUseCase {
    pub fn new(
        probe: Arc<dyn SystemProbe>,
        host: Arc<dyn RecordingHost>,
        games: Arc<dyn GamesSource>,
        publisher: Arc<dyn StatePublisher>,
    ) -> Self {
        Self {
            probe,
            games,
            publisher,
            controller: RecordingController::new(host),
            last_games: GamesConfig::default(),
            state: WatcherState::Idle,
            published: None,
        }
    }

    /// Returns the state after the most recent tick.
    pub fn state(&self) -> &WatcherState {
        &self.state
    }

    /// Returns the game whose recording the watcher owns, if any.
    pub fn owned_game(&self) -> Option<&str> {
        self.controller.owned_game()
    }

    /// Runs one poll cycle and returns the resulting state.
    ///
    /// Never fails: every error is logged and the watcher carries on.
    pub async fn tick(&mut self) -> WatcherState {
        match self.games.load_games() {
            Ok(games) => self.last_games = games,
            Err(e) => warn!("could not reload games list, keeping previous one: {e}"),
        }

        let snapshot = match self.probe.snapshot() {
            Ok(s) => s,
            Err(e) => {
                warn!("desktop enumeration failed, skipping tick: {e}");
                return self.state.clone();
            }
        };

        let detection = find_running_game(&self.last_games, &snapshot);
        if let Some(Detection { game, source }) = &detection {
            debug!("'{}' matched {source}", game.name);
        }

        let next = match self
            .controller
            .on_detection(detection.as_ref().map(|d| &d.game))
            .await
        {
            Ok(action) => {
                log_action(&action);
                action.to_state()
            }
            Err(e) => {
                warn!("recording host call failed: {e}");
                WatcherState::HostUnavailable
            }
        };

        self.set_state(next);
        self.state.clone()
    }

    /// Ticks every `period` until `shutdown` turns `true` or its sender is
    /// dropped.  Missed ticks are skipped rather than bunched up.
    pub async fn run(&mut self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("watching for games every {} ms", period.as_millis());
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("watch loop stopped");
    }

    fn set_state(&mut self, next: WatcherState) {
        if self.state != next {
            info!("state: {} -> {}", self.state, next);
        }
        self.state = next;

        // A failed publish is retried on the next tick.
        if self.published.as_ref() != Some(&self.state) {
            match self.publisher.publish(&self.state) {
                Ok(()) => self.published = Some(self.state.clone()),
                Err(e) => warn!("could not publish watcher state: {e}"),
            }
        }
    }
}

fn log_action(action: &ControllerAction) {
    match action {
        ControllerAction::Started { game } => info!("game detected: {game}; recording started"),
        ControllerAction::AlreadyRecording { game } => {
            info!("game detected: {game}; host already recording, leaving it alone")
        }
        ControllerAction::Stopped { game } => info!("game closed: {game}; recording stopped"),
        ControllerAction::StillRecording { .. } | ControllerAction::Idle => {}
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
