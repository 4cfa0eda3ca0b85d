//! Finder windows through AppleScript
//!
//! Compiled everywhere so the listing parser stays testable; only selected
//! as the window source on macOS.

use crate::window::{WindowEnumerator, WindowId};
use crate::WatchError;
use std::collections::BTreeMap;
use std::process::Command;

/// One `id<TAB>posix path` line per Finder window. Windows whose target has
/// no POSIX path (Recents, AirDrop) fail inside the `try` and are skipped.
const FINDER_SCRIPT: &str = r#"
set listing to ""
tell application "Finder"
    repeat with w in (every Finder window)
        try
            set listing to listing & (id of w as text) & tab & (POSIX path of (target of w as alias)) & linefeed
        end try
    end repeat
end tell
return listing
"#;

/// Enumerates open Finder windows via `osascript`
#[derive(Debug, Default, Clone, Copy)]
pub struct FinderWindows;

impl WindowEnumerator for FinderWindows {
    fn enumerate(&mut self) -> Result<BTreeMap<WindowId, String>, WatchError> {
        let output = Command::new("osascript")
            .arg("-e")
            .arg(FINDER_SCRIPT)
            .output()?;

        if !output.status.success() {
            return Err(WatchError::Enumeration(format!(
                "osascript exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(parse_listing(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse the script output; malformed lines are dropped
pub fn parse_listing(listing: &str) -> BTreeMap<WindowId, String> {
    listing
        .lines()
        .filter_map(|line| {
            let (id, path) = line.split_once('\t')?;
            let id = id.trim().parse::<WindowId>().ok()?;
            let path = path.trim_end_matches(['\r', '\n']);
            (!path.trim().is_empty()).then(|| (id, path.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing() {
        let listing = "101\t/Users/me/Documents/\n202\t/Volumes/Data/My Stuff/\n";

        let windows = parse_listing(listing);

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[&101], "/Users/me/Documents/");
        assert_eq!(windows[&202], "/Volumes/Data/My Stuff/");
    }

    #[test]
    fn test_parse_listing_drops_malformed_lines() {
        let listing = "not-a-number\t/tmp/\n303\n404\t\n\n505\t/tmp/\r\n";

        let windows = parse_listing(listing);

        assert_eq!(windows.keys().copied().collect::<Vec<_>>(), vec![505]);
        assert_eq!(windows[&505], "/tmp/");
    }

    #[test]
    fn test_empty_listing() {
        assert!(parse_listing("").is_empty());
    }
}
