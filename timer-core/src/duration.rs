//! Millisecond counts split into display parts, and the display string.

use serde::{Deserialize, Serialize};

const MS_PER_SECOND: u64 = 1000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Elapsed time broken into hours, minutes, seconds and milliseconds.
///
/// Always derived from a millisecond count. Minutes and seconds stay below 60,
/// milliseconds below 1000; hours are unbounded.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct DurationParts {
    pub h: u64,
    pub m: u64,
    pub s: u64,
    pub ms: u64,
}

impl DurationParts {
    pub const ZERO: DurationParts = DurationParts { h: 0, m: 0, s: 0, ms: 0 };
}

/// Split a millisecond count into its parts.
pub fn parse_duration(ms: u64) -> DurationParts {
    DurationParts {
        h: ms / MS_PER_HOUR,
        m: (ms / MS_PER_MINUTE) % 60,
        s: (ms / MS_PER_SECOND) % 60,
        ms: ms % MS_PER_SECOND,
    }
}

/// Render parts for display.
///
/// The hour number is written only when non-zero, unpadded and directly in
/// front of the minutes. Minutes and seconds are two digits joined by `:`;
/// with `show_ms` the milliseconds follow a `.` as three digits.
pub fn format_duration(d: &DurationParts, show_ms: bool) -> String {
    let mut out = String::new();
    if d.h > 0 {
        out.push_str(&d.h.to_string());
    }
    out.push_str(&format!("{:02}:{:02}", d.m, d.s));
    if show_ms {
        out.push_str(&format!(".{:03}", d.ms));
    }
    out
}

/// Format a millisecond count directly.
pub fn format_ms(ms: u64, show_ms: bool) -> String {
    format_duration(&parse_duration(ms), show_ms)
}
