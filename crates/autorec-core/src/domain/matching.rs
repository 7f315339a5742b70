//! Selector matching: decides which configured game is running.
//!
//! A game is running iff its selector is a case-insensitive substring of
//! some visible window title or of some running executable name.  Window
//! titles are the more reliable signal for games (launchers often spawn
//! differently named executables), so they are checked first.
//!
//! Only enabled games take part, in list order, and the first game that
//! matches wins.  This runs once per watcher poll over a few hundred strings,
//! so each title is lowercased once per call rather than once per game.

use std::fmt;

use tracing::trace;

use crate::domain::games::{GameEntry, GamesConfig};
use crate::domain::snapshot::{SystemSnapshot, WindowInfo};

/// Window titles that belong to the desktop shell or to OBS itself.
const SYSTEM_TITLES: &[&str] = &["program manager", "settings", "task manager", "obs"];

/// Executables that are never the game the user wants to add.
const SYSTEM_PROCESSES: &[&str] = &[
    "explorer.exe",
    "cmd.exe",
    "powershell.exe",
    "code.exe",
    "chrome.exe",
    "firefox.exe",
    "msedge.exe",
    "obs64.exe",
    "obs32.exe",
    "searchhost.exe",
    "textinputhost.exe",
    "shellexperiencehost.exe",
];

/// What in the snapshot made a selector match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSource {
    /// The selector was found in a visible window title.
    WindowTitle { pid: u32, title: String },
    /// The selector was found in a running executable name.
    ProcessName { pid: u32, exe_name: String },
}

impl MatchSource {
    pub fn pid(&self) -> u32 {
        match self {
            MatchSource::WindowTitle { pid, .. } | MatchSource::ProcessName { pid, .. } => *pid,
        }
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchSource::WindowTitle { title, .. } => write!(f, "window '{title}'"),
            MatchSource::ProcessName { exe_name, .. } => write!(f, "process {exe_name}"),
        }
    }
}

/// A running game and the evidence for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub game: GameEntry,
    pub source: MatchSource,
}

/// A visible window returned by [`search_windows`], with its owner's
/// executable name when the process table knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowMatch<'a> {
    pub window: &'a WindowInfo,
    pub exe_name: Option<&'a str>,
}

/// Returns `true` if `selector` occurs in `haystack`, ignoring case.
///
/// A blank selector never matches anything.
pub fn selector_matches(selector: &str, haystack: &str) -> bool {
    if selector.trim().is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&selector.to_lowercase())
}

/// Lowercased copies of every title and executable name in a snapshot.
struct LoweredSnapshot {
    titles: Vec<String>,
    exe_names: Vec<String>,
}

impl LoweredSnapshot {
    fn new(snapshot: &SystemSnapshot) -> Self {
        Self {
            titles: snapshot.windows().iter().map(|w| w.title.to_lowercase()).collect(),
            exe_names: snapshot
                .processes()
                .iter()
                .map(|p| p.exe_name.to_lowercase())
                .collect(),
        }
    }
}

/// Finds the first enabled game in `config` that is running in `snapshot`.
pub fn find_running_game(config: &GamesConfig, snapshot: &SystemSnapshot) -> Option<Detection> {
    let mut lowered: Option<LoweredSnapshot> = None;

    for game in config.enabled_games() {
        if game.selector.trim().is_empty() {
            continue;
        }
        let needle = game.selector.to_lowercase();
        let lowered = lowered.get_or_insert_with(|| LoweredSnapshot::new(snapshot));

        if let Some(i) = lowered.titles.iter().position(|t| t.contains(&needle)) {
            let window = &snapshot.windows()[i];
            trace!(game = %game.name, title = %window.title, "selector matched window title");
            return Some(Detection {
                game: game.clone(),
                source: MatchSource::WindowTitle {
                    pid: window.pid,
                    title: window.title.clone(),
                },
            });
        }

        if let Some(i) = lowered.exe_names.iter().position(|n| n.contains(&needle)) {
            let process = &snapshot.processes()[i];
            trace!(game = %game.name, exe = %process.exe_name, "selector matched process name");
            return Some(Detection {
                game: game.clone(),
                source: MatchSource::ProcessName {
                    pid: process.pid,
                    exe_name: process.exe_name.clone(),
                },
            });
        }
    }

    None
}

/// Returns the visible windows whose title or owning executable contains
/// `term`, ignoring case.  An empty term returns every window.
pub fn search_windows<'a>(term: &str, snapshot: &'a SystemSnapshot) -> Vec<WindowMatch<'a>> {
    let term = term.to_lowercase();
    snapshot
        .windows()
        .iter()
        .map(|window| WindowMatch {
            window,
            exe_name: snapshot.process_name(window.pid),
        })
        .filter(|m| {
            m.window.title.to_lowercase().contains(&term)
                || m.exe_name.is_some_and(|n| n.to_lowercase().contains(&term))
        })
        .collect()
}

/// Picks the window most likely to be the game the user just launched.
///
/// Skips shell, browser, editor and OBS windows.  When every window is
/// filtered out, the first visible window is returned instead.
pub fn suggest_selector(snapshot: &SystemSnapshot) -> Option<&WindowInfo> {
    let is_system = |window: &WindowInfo| {
        let exe = snapshot
            .process_name(window.pid)
            .map(str::to_lowercase)
            .unwrap_or_default();
        if SYSTEM_PROCESSES.contains(&exe.as_str()) {
            return true;
        }
        let title = window.title.to_lowercase();
        SYSTEM_TITLES.iter().any(|s| title.contains(s))
    };

    snapshot
        .windows()
        .iter()
        .find(|w| !is_system(w))
        .or_else(|| snapshot.windows().first())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::ProcessInfo;

    fn snapshot(windows: &[(&str, u32)], processes: &[(u32, &str)]) -> SystemSnapshot {
        SystemSnapshot::new(
            windows
                .iter()
                .map(|(t, p)| WindowInfo {
                    title: t.to_string(),
                    pid: *p,
                })
                .collect(),
            processes
                .iter()
                .map(|(p, n)| ProcessInfo {
                    pid: *p,
                    exe_name: n.to_string(),
                })
                .collect(),
        )
    }

    fn config(entries: &[(&str, &str, bool)]) -> GamesConfig {
        let mut cfg = GamesConfig::new();
        for (name, selector, enabled) in entries {
            cfg.add_game(name, selector, *enabled).unwrap();
        }
        cfg
    }

    fn desktop() -> SystemSnapshot {
        snapshot(
            &[
                ("Program Manager", 100),
                ("ELDEN RING™", 200),
                ("Inbox - Outlook", 300),
            ],
            &[
                (100, "explorer.exe"),
                (200, "eldenring.exe"),
                (300, "OUTLOOK.EXE"),
                (400, "steam.exe"),
            ],
        )
    }

    // ── selector_matches ──────────────────────────────────────────────────────

    #[test]
    fn test_selector_matches_ignores_case() {
        assert!(selector_matches("elden ring", "ELDEN RING™"));
        assert!(selector_matches("RING", "elden ring"));
    }

    #[test]
    fn test_selector_matches_requires_substring() {
        assert!(!selector_matches("elden lord", "ELDEN RING"));
    }

    #[test]
    fn test_blank_selector_never_matches() {
        assert!(!selector_matches("", "anything"));
        assert!(!selector_matches("   ", "a b c"));
    }

    // ── find_running_game ─────────────────────────────────────────────────────

    #[test]
    fn test_detects_game_by_window_title() {
        // Arrange
        let cfg = config(&[("Elden Ring", "elden ring", true)]);

        // Act
        let detection = find_running_game(&cfg, &desktop()).expect("should detect");

        // Assert
        assert_eq!(detection.game.name, "Elden Ring");
        assert_eq!(
            detection.source,
            MatchSource::WindowTitle {
                pid: 200,
                title: "ELDEN RING™".to_string()
            }
        );
    }

    #[test]
    fn test_detects_game_by_executable_without_window() {
        // steam.exe has no visible window but is in the process table.
        let cfg = config(&[("Steam", "STEAM.exe", true)]);
        let detection = find_running_game(&cfg, &desktop()).expect("should detect");
        assert_eq!(
            detection.source,
            MatchSource::ProcessName {
                pid: 400,
                exe_name: "steam.exe".to_string()
            }
        );
        assert_eq!(detection.source.pid(), 400);
    }

    #[test]
    fn test_window_title_is_preferred_over_process_name() {
        // "ring" occurs in both the title and the executable name.
        let cfg = config(&[("Elden Ring", "ring", true)]);
        let detection = find_running_game(&cfg, &desktop()).unwrap();
        assert!(matches!(detection.source, MatchSource::WindowTitle { .. }));
    }

    #[test]
    fn test_disabled_game_is_not_detected() {
        let cfg = config(&[("Elden Ring", "elden ring", false)]);
        assert!(find_running_game(&cfg, &desktop()).is_none());
    }

    #[test]
    fn test_first_enabled_game_in_list_order_wins() {
        let cfg = config(&[
            ("Disabled", "outlook", false),
            ("Steam", "steam", true),
            ("Elden Ring", "elden", true),
        ]);
        let detection = find_running_game(&cfg, &desktop()).unwrap();
        assert_eq!(detection.game.name, "Steam");
    }

    #[test]
    fn test_no_match_returns_none() {
        let cfg = config(&[("Hades", "hades", true)]);
        assert!(find_running_game(&cfg, &desktop()).is_none());
    }

    #[test]
    fn test_empty_config_or_snapshot_returns_none() {
        assert!(find_running_game(&GamesConfig::new(), &desktop()).is_none());
        let cfg = config(&[("Hades", "hades", true)]);
        assert!(find_running_game(&cfg, &SystemSnapshot::default()).is_none());
    }

    #[test]
    fn test_blank_selector_loaded_from_disk_is_skipped() {
        // add_game rejects blank selectors, but a hand-edited file may contain one.
        let cfg: GamesConfig =
            serde_json::from_str(r#"{"games":[{"name":"Blank","selector":""}]}"#).unwrap();
        assert!(find_running_game(&cfg, &desktop()).is_none());
    }

    #[test]
    fn test_detection_iff_selector_is_substring_of_some_title_or_exe() {
        let snap = desktop();
        let haystacks: Vec<String> = snap
            .windows()
            .iter()
            .map(|w| w.title.clone())
            .chain(snap.processes().iter().map(|p| p.exe_name.clone()))
            .collect();

        for selector in ["elden", "OUTLOOK", "manager", "steam", "hades", "exe", "zzz", "™"] {
            let cfg = config(&[("Game", selector, true)]);
            let expected = haystacks.iter().any(|h| selector_matches(selector, h));
            assert_eq!(
                find_running_game(&cfg, &snap).is_some(),
                expected,
                "selector {selector:?}"
            );
        }
    }

    // ── search_windows ────────────────────────────────────────────────────────

    #[test]
    fn test_search_windows_matches_title_or_owner_exe() {
        let snap = desktop();

        let by_title = search_windows("inbox", &snap);
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].exe_name, Some("OUTLOOK.EXE"));

        let by_exe = search_windows("EXPLORER", &snap);
        assert_eq!(by_exe.len(), 1);
        assert_eq!(by_exe[0].window.title, "Program Manager");
    }

    #[test]
    fn test_search_windows_ignores_windowless_processes() {
        assert!(search_windows("steam", &desktop()).is_empty());
    }

    #[test]
    fn test_search_windows_empty_term_returns_all() {
        assert_eq!(search_windows("", &desktop()).len(), 3);
    }

    // ── suggest_selector ──────────────────────────────────────────────────────

    #[test]
    fn test_suggest_selector_skips_system_windows() {
        let window = desktop();
        let suggestion = suggest_selector(&window).unwrap();
        assert_eq!(suggestion.title, "ELDEN RING™");
    }

    #[test]
    fn test_suggest_selector_falls_back_to_first_window() {
        let snap = snapshot(
            &[("Task Manager", 1), ("OBS 30.1.2 - Profile", 2)],
            &[(1, "Taskmgr.exe"), (2, "obs64.exe")],
        );
        assert_eq!(suggest_selector(&snap).unwrap().title, "Task Manager");
    }

    #[test]
    fn test_suggest_selector_none_without_windows() {
        assert!(suggest_selector(&SystemSnapshot::default()).is_none());
    }
}
