//! The timer data model: status, sections, laps and the running total.

use serde::{Deserialize, Serialize};

use crate::duration::{format_duration, parse_duration, DurationParts};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Stopped,
    Ongoing,
    Paused,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    Ongoing,
    Stopped,
}

/// One contiguous interval during which the timer was running.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub from: u64,
    pub to: Option<u64>,
    pub label: Option<String>,
    /// Live length while open, fixed `to - from` once closed.
    pub duration: u64,
    pub duration_parts: DurationParts,
    pub status: SectionStatus,
}

impl Section {
    pub fn open(from: u64, label: Option<String>) -> Self {
        Self {
            from,
            to: None,
            label,
            duration: 0,
            duration_parts: DurationParts::ZERO,
            status: SectionStatus::Ongoing,
        }
    }

    pub fn is_open(&self) -> bool {
        self.to.is_none()
    }

    /// Close at `at`, freezing the length. A closed section is left alone.
    pub fn close(&mut self, at: u64) {
        if !self.is_open() {
            return;
        }
        let at = at.max(self.from);
        self.to = Some(at);
        self.set_duration(at - self.from);
        self.status = SectionStatus::Stopped;
    }

    /// Length as of `now`.
    pub fn length_at(&self, now: u64) -> u64 {
        match self.to {
            Some(to) => to.saturating_sub(self.from),
            None => now.saturating_sub(self.from),
        }
    }

    fn set_duration(&mut self, ms: u64) {
        self.duration = ms;
        self.duration_parts = parse_duration(ms);
    }
}

/// A point-in-time mark recorded while running.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lap {
    pub timestamp: u64,
    pub duration_since_last_lap: u64,
    pub duration_since_start: u64,
}

/// Everything a timer knows about itself. Also the persisted blob.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    pub start_time: u64,
    pub end_time: Option<u64>,
    pub duration: DurationParts,
    pub duration_str: String,
    pub sections: Vec<Section>,
    pub laps: Vec<Lap>,
}

impl TimerState {
    pub fn initial(now: u64, show_ms: bool) -> Self {
        Self {
            status: TimerStatus::Stopped,
            start_time: now,
            end_time: None,
            duration: DurationParts::ZERO,
            duration_str: format_duration(&DurationParts::ZERO, show_ms),
            sections: Vec::new(),
            laps: Vec::new(),
        }
    }

    pub fn last_section(&self) -> Option<&Section> {
        self.sections.last()
    }

    /// The open section, which can only ever be the last one.
    pub fn open_section(&self) -> Option<&Section> {
        self.sections.last().filter(|s| s.is_open())
    }

    pub fn open_section_mut(&mut self) -> Option<&mut Section> {
        self.sections.last_mut().filter(|s| s.is_open())
    }

    pub fn has_open_section(&self) -> bool {
        self.open_section().is_some()
    }

    pub fn last_lap(&self) -> Option<&Lap> {
        self.laps.last()
    }

    /// Closed sections at their fixed length plus the open one up to `now`.
    pub fn total_duration_ms(&self, now: u64) -> u64 {
        self.sections
            .iter()
            .fold(0u64, |total, s| total.saturating_add(s.length_at(now)))
    }

    /// Recompute the open section's live length and the total as of `now`.
    pub fn refresh(&mut self, now: u64, show_ms: bool) {
        if let Some(section) = self.open_section_mut() {
            let live = now.saturating_sub(section.from);
            section.set_duration(live);
        }
        self.duration = parse_duration(self.total_duration_ms(now));
        self.duration_str = format_duration(&self.duration, show_ms);
    }

    /// Close the open section, if any, and bring the total up to date.
    pub fn close_open_section(&mut self, now: u64, show_ms: bool) {
        if let Some(section) = self.open_section_mut() {
            section.close(now);
        }
        self.refresh(now, show_ms);
    }

    /// Sections are well formed and agree with the status: only the last
    /// section may be open, it is open exactly when the status is `Ongoing`,
    /// and no section ends before it starts or before the previous one ends.
    pub fn is_consistent(&self) -> bool {
        let n = self.sections.len();
        let open_ok = self
            .sections
            .iter()
            .enumerate()
            .all(|(i, s)| !s.is_open() || i + 1 == n);
        let bounds_ok = self.sections.iter().all(|s| s.to.map_or(true, |to| to >= s.from));
        let ordered = self.sections.windows(2).all(|w| match w[0].to {
            Some(to) => w[1].from >= to,
            None => false,
        });
        let status_ok = (self.status == TimerStatus::Ongoing) == self.has_open_section();
        open_ok && bounds_ok && ordered && status_ok
    }
}
