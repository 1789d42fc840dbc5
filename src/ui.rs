use std::fmt::Write as _;
use std::io::{self, Write};

use timer_core::{format_ms, TimerState, TimerStatus};

const MAX_VISIBLE_LAPS: usize = 10;

fn status_tag(status: TimerStatus) -> &'static str {
    match status {
        TimerStatus::Stopped => "stopped",
        TimerStatus::Ongoing => "running",
        TimerStatus::Paused => "paused",
    }
}

/// The single-line display, redrawn in place.
pub fn live_line(state: &TimerState) -> String {
    let label = state
        .sections
        .last()
        .and_then(|s| s.label.as_deref())
        .map(|l| format!("  ({})", l))
        .unwrap_or_default();
    format!("[{:7}] {}{}", status_tag(state.status), state.duration_str, label)
}

pub fn draw_live(state: &TimerState) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "\r\x1b[2K{}", live_line(state))?;
    out.flush()
}

/// Full listing: total, every section, most recent laps first.
pub fn status_report(state: &TimerState, show_ms: bool) -> String {
    let mut out = String::new();
    writeln!(out, "STOPWATCH  {}", live_line(state)).ok();

    if state.sections.is_empty() {
        writeln!(out, "  no sections").ok();
    }
    for (i, section) in state.sections.iter().enumerate() {
        let end = if section.to.is_some() { "" } else { "  <- open" };
        writeln!(
            out,
            "  #{:<2} {:>12}  {}{}",
            i + 1,
            format_ms(section.duration, show_ms),
            section.label.as_deref().unwrap_or("-"),
            end
        )
        .ok();
    }

    if !state.laps.is_empty() {
        writeln!(out, "  laps:").ok();
        let total = state.laps.len();
        for (idx, lap) in state.laps.iter().enumerate().rev().take(MAX_VISIBLE_LAPS) {
            writeln!(
                out,
                "  Lap {:2}: {}  (+{})",
                idx + 1,
                format_ms(lap.duration_since_start, show_ms),
                format_ms(lap.duration_since_last_lap, show_ms)
            )
            .ok();
        }
        if total > MAX_VISIBLE_LAPS {
            writeln!(out, "  ... {} earlier", total - MAX_VISIBLE_LAPS).ok();
        }
    }
    out
}

pub fn help_text() -> &'static str {
    "enter/t [label]  start, pause or resume\n\
     s [label]        start (from stopped)\n\
     p                pause\n\
     r [label]        resume\n\
     l                lap\n\
     x                stop\n\
     reset            clear everything\n\
     ?                status\n\
     export <file>    write state as JSON\n\
     import <file>    load state from JSON\n\
     q                quit"
}
