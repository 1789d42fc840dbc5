//! Named timer events and the listeners registered for them.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerEvent {
    Start,
    Stop,
    Pause,
    Resume,
    Lap,
    Reset,
}

impl TimerEvent {
    pub const ALL: [TimerEvent; 6] = [
        TimerEvent::Start,
        TimerEvent::Stop,
        TimerEvent::Pause,
        TimerEvent::Resume,
        TimerEvent::Lap,
        TimerEvent::Reset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerEvent::Start => "start",
            TimerEvent::Stop => "stop",
            TimerEvent::Pause => "pause",
            TimerEvent::Resume => "resume",
            TimerEvent::Lap => "lap",
            TimerEvent::Reset => "reset",
        }
    }
}

impl fmt::Display for TimerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listener callback. Identity is the `Rc` allocation, so the same handle
/// can be registered more than once and removed again by passing it to `off`.
pub type Listener = Rc<dyn Fn()>;

#[derive(Default)]
pub struct Listeners {
    by_event: HashMap<TimerEvent, Vec<Listener>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, event: TimerEvent, listener: Listener) {
        self.by_event.entry(event).or_default().push(listener);
    }

    /// Remove the first registration of `listener` for `event`.
    pub fn off(&mut self, event: TimerEvent, listener: &Listener) -> bool {
        let Some(list) = self.by_event.get_mut(&event) else {
            return false;
        };
        match list.iter().position(|l| Rc::ptr_eq(l, listener)) {
            Some(idx) => {
                list.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Call every listener for `event` in registration order.
    pub fn emit(&self, event: TimerEvent) {
        if let Some(list) = self.by_event.get(&event) {
            for listener in list {
                listener();
            }
        }
    }

    pub fn count(&self, event: TimerEvent) -> usize {
        self.by_event.get(&event).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> Listener {
        let log = log.clone();
        Rc::new(move || log.borrow_mut().push(tag))
    }

    #[test]
    fn test_emit_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();
        listeners.on(TimerEvent::Start, recorder(&log, "a"));
        listeners.on(TimerEvent::Start, recorder(&log, "b"));
        listeners.on(TimerEvent::Stop, recorder(&log, "c"));

        listeners.emit(TimerEvent::Start);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        listeners.emit(TimerEvent::Lap);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_duplicates_and_off_removes_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();
        let a = recorder(&log, "a");
        let b = recorder(&log, "b");
        listeners.on(TimerEvent::Lap, a.clone());
        listeners.on(TimerEvent::Lap, b.clone());
        listeners.on(TimerEvent::Lap, a.clone());

        assert!(listeners.off(TimerEvent::Lap, &a));
        assert_eq!(listeners.count(TimerEvent::Lap), 2);
        listeners.emit(TimerEvent::Lap);
        assert_eq!(*log.borrow(), vec!["b", "a"]);
    }

    #[test]
    fn test_off_unknown_is_noop() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();
        let a = recorder(&log, "a");
        let b = recorder(&log, "b");
        assert!(!listeners.off(TimerEvent::Pause, &a));

        listeners.on(TimerEvent::Pause, a.clone());
        assert!(!listeners.off(TimerEvent::Pause, &b));
        assert!(!listeners.off(TimerEvent::Resume, &a));
        assert_eq!(listeners.count(TimerEvent::Pause), 1);
    }

    #[test]
    fn test_event_names() {
        let names: Vec<_> = TimerEvent::ALL.iter().map(|e| e.to_string()).collect();
        assert_eq!(names, vec!["start", "stop", "pause", "resume", "lap", "reset"]);
    }
}
