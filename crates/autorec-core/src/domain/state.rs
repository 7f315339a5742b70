//! Watcher status as shown to the user.
//!
//! The watcher rewrites a one-line state file whenever its state changes and
//! the manager reads it back for `status` and `monitor`.  The line format is:
//!
//! ```text
//! IDLE
//! RECORDING: Elden Ring
//! DETECTED: Elden Ring
//! HOST_UNAVAILABLE
//! ```

use std::fmt;
use std::str::FromStr;

/// What the watcher is currently doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatcherState {
    /// No enabled game is running and the watcher owns no recording.
    Idle,
    /// The watcher started a recording for this game and will stop it when
    /// the game closes.
    Recording { game: String },
    /// This game is running, but OBS was already recording when it was
    /// detected, so the watcher left the recording alone.
    Detected { game: String },
    /// OBS could not be reached or rejected the last request.
    HostUnavailable,
}

const IDLE: &str = "IDLE";
const RECORDING_PREFIX: &str = "RECORDING: ";
const DETECTED_PREFIX: &str = "DETECTED: ";
const HOST_UNAVAILABLE: &str = "HOST_UNAVAILABLE";

impl fmt::Display for WatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatcherState::Idle => f.write_str(IDLE),
            WatcherState::Recording { game } => write!(f, "{RECORDING_PREFIX}{game}"),
            WatcherState::Detected { game } => write!(f, "{DETECTED_PREFIX}{game}"),
            WatcherState::HostUnavailable => f.write_str(HOST_UNAVAILABLE),
        }
    }
}

/// Error returned when a state line is not in any known format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised watcher state line: '{0}'")]
pub struct ParseStateError(pub String);

impl FromStr for WatcherState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        if line == IDLE {
            Ok(WatcherState::Idle)
        } else if line == HOST_UNAVAILABLE {
            Ok(WatcherState::HostUnavailable)
        } else if let Some(game) = line.strip_prefix(RECORDING_PREFIX) {
            Ok(WatcherState::Recording {
                game: game.to_string(),
            })
        } else if let Some(game) = line.strip_prefix(DETECTED_PREFIX) {
            Ok(WatcherState::Detected {
                game: game.to_string(),
            })
        } else {
            Err(ParseStateError(line.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_lines_render_as_documented() {
        assert_eq!(WatcherState::Idle.to_string(), "IDLE");
        assert_eq!(
            WatcherState::Recording {
                game: "Elden Ring".to_string()
            }
            .to_string(),
            "RECORDING: Elden Ring"
        );
        assert_eq!(
            WatcherState::Detected {
                game: "Hades".to_string()
            }
            .to_string(),
            "DETECTED: Hades"
        );
        assert_eq!(WatcherState::HostUnavailable.to_string(), "HOST_UNAVAILABLE");
    }

    #[test]
    fn test_parse_accepts_trailing_newline() {
        let state: WatcherState = "RECORDING: Elden Ring\n".parse().unwrap();
        assert_eq!(
            state,
            WatcherState::Recording {
                game: "Elden Ring".to_string()
            }
        );
    }

    #[test]
    fn test_parse_game_name_containing_colon() {
        let state: WatcherState = "DETECTED: Halo: Reach".parse().unwrap();
        assert_eq!(
            state,
            WatcherState::Detected {
                game: "Halo: Reach".to_string()
            }
        );
    }

    #[test]
    fn test_parse_unknown_line_is_error() {
        assert!("recording elden ring".parse::<WatcherState>().is_err());
        assert!("".parse::<WatcherState>().is_err());
    }
}
