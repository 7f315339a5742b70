//! Output for `windows`, `search` and `detect`.
//!
//! These commands help the user pick a selector: they show what the watcher
//! would see on its next poll.

use std::fmt::Write as _;

use autorec_core::domain::matching::{search_windows, suggest_selector, WindowMatch};
use autorec_core::SystemSnapshot;

/// Numbered list of every visible window with its executable.
pub fn render_window_list(snapshot: &SystemSnapshot) -> String {
    let all = search_windows("", snapshot);
    if all.is_empty() {
        return "No visible windows found.\n".to_string();
    }
    let mut out = format!("Visible windows ({}):\n", all.len());
    write_matches(&mut out, &all);
    out
}

/// Windows whose title or executable contains `term`.
pub fn render_search(term: &str, snapshot: &SystemSnapshot) -> String {
    let found = search_windows(term, snapshot);
    if found.is_empty() {
        return format!("No windows match '{term}'.\n");
    }
    let mut out = format!("Windows matching '{term}' ({}):\n", found.len());
    write_matches(&mut out, &found);
    out
}

/// The most likely game window and the command that would add it.
pub fn render_suggestion(snapshot: &SystemSnapshot) -> String {
    let Some(window) = suggest_selector(snapshot) else {
        return "No visible windows found. Start the game and try again.\n".to_string();
    };

    let mut out = format!("Detected window: {}\n", window.title);
    if let Some(exe) = snapshot.process_name(window.pid) {
        let _ = writeln!(out, "Executable:      {exe}");
    }
    let _ = writeln!(
        out,
        "Add it with:     autorec-manager add \"{0}\" \"{0}\"",
        window.title
    );
    out
}

fn write_matches(out: &mut String, matches: &[WindowMatch<'_>]) {
    for (i, m) in matches.iter().enumerate() {
        let exe = m.exe_name.unwrap_or("?");
        let _ = writeln!(out, "  {:>3}. {}  [{exe}, PID {}]", i + 1, m.window.title, m.window.pid);
    }
}
