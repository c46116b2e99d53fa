use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static REP_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s*(?:[-–—]|to)?\s*(\d+)?\s*(?:reps?)?\s*$").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepRange {
    pub start: u32,
    pub end: u32,
}

impl RepRange {
    /// Read a prescribed reps string such as "8", "10-12" or "8 – 10 reps".
    /// Anything else ("AMRAP", "30s") is left to the caller as free-form text.
    pub fn parse(reps: &str) -> Option<Self> {
        let lowered = reps.to_lowercase();
        let captures = REP_RANGE.captures(&lowered)?;

        let start: u32 = captures.get(1)?.as_str().parse().ok()?;
        let end: u32 = match captures.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => start,
        };

        if end < start {
            return None;
        }

        Some(Self { start, end })
    }
}
