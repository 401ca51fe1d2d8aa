//! Leading track-number parsing.

use lazy_static::lazy_static;
use regex::Regex;

use super::classify::stem_of;

lazy_static! {
    // 1-2 digit track number, optional dash-family separator, non-empty title
    static ref TRACK_RE: Regex =
        Regex::new(r"^\s*(\d{1,2})\s*(?:[-\u{2010}\u{2013}\u{2014}\u{2212}]\s*|\s+)?(.+)$")
            .unwrap();
}

/// Parses `(track number, trimmed title)` from a filename stem.
///
/// When `ignore_no_space` is set, filenames without any space are rejected
/// outright. Names like `01intro.mp3` are more often hashes or rip artifacts
/// than numbered tracks, so the guard trades recall for precision.
pub fn extract_track_info(filename: &str, ignore_no_space: bool) -> Option<(u32, String)> {
    if ignore_no_space && !filename.contains(' ') {
        return None;
    }
    let caps = TRACK_RE.captures(stem_of(filename))?;
    let track: u32 = caps.get(1)?.as_str().parse().ok()?;
    let rest = caps.get(2)?.as_str().trim().to_string();
    Some((track, rest))
}
