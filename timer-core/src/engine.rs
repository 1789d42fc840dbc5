//! The stopwatch state machine.
//!
//! `Timer` owns one `TimerState` and is its only writer. Operations whose
//! precondition does not hold return `Ok(())` without touching anything, so
//! callers never need to check the status first. After a successful
//! transition the new state is published to subscribers, then the listeners
//! for that event run, then the state is written to storage if configured.

use crate::clock::{Clock, SystemClock};
use crate::error::TimerError;
use crate::events::{Listener, Listeners, TimerEvent};
use crate::options::TimerOptions;
use crate::persist::{Persistence, Storage};
use crate::state::{Lap, Section, TimerState, TimerStatus};
use crate::store::{Store, SubscriptionId};
use crate::tick::Ticker;

pub struct Timer<C: Clock = SystemClock> {
    clock: C,
    show_ms: bool,
    store: Store<TimerState>,
    listeners: Listeners,
    ticker: Ticker,
    persistence: Option<Persistence>,
}

impl Timer<SystemClock> {
    /// A timer on the wall clock.
    pub fn system(opts: TimerOptions) -> Result<Self, TimerError> {
        Timer::new(SystemClock, opts)
    }
}

impl<C: Clock> Timer<C> {
    /// Build a timer. With `opts.persist` set, state stored under that id is
    /// restored first.
    pub fn new(clock: C, opts: TimerOptions) -> Result<Self, TimerError> {
        let persistence = opts.persist.as_ref().map(Persistence::from_options);
        Self::build(clock, &opts, persistence)
    }

    /// Build a persisted timer on a caller-supplied medium. `opts.persist` is
    /// ignored.
    pub fn with_storage(
        clock: C,
        opts: TimerOptions,
        id: &str,
        storage: Box<dyn Storage>,
    ) -> Result<Self, TimerError> {
        Self::build(clock, &opts, Some(Persistence::new(id, storage)))
    }

    fn build(
        clock: C,
        opts: &TimerOptions,
        persistence: Option<Persistence>,
    ) -> Result<Self, TimerError> {
        let ticker = Ticker::new(opts.update_interval_ms)?;
        let now = clock.now_ms();
        let restored = match &persistence {
            Some(p) => p.load()?,
            None => None,
        };
        let was_restored = restored.is_some();
        let state = restored.unwrap_or_else(|| TimerState::initial(now, opts.show_ms));

        let mut timer = Self {
            clock,
            show_ms: opts.show_ms,
            store: Store::new(state),
            listeners: Listeners::new(),
            ticker,
            persistence,
        };

        if was_restored {
            log::info!(
                "Restored timer {} ({:?}, {} sections)",
                timer.persistence_key().unwrap_or_default(),
                timer.state().status,
                timer.state().sections.len()
            );
            if timer.state().has_open_section() {
                timer.start_tick(now);
                let show_ms = timer.show_ms;
                timer.store.update(|s| s.refresh(now, show_ms));
            }
        }
        Ok(timer)
    }

    fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn state(&self) -> &TimerState {
        self.store.get()
    }

    /// An owned copy of the current state.
    pub fn snapshot(&self) -> TimerState {
        self.store.snapshot()
    }

    pub fn status(&self) -> TimerStatus {
        self.state().status
    }

    pub fn show_ms(&self) -> bool {
        self.show_ms
    }

    pub fn persistence_key(&self) -> Option<&str> {
        self.persistence.as_ref().map(Persistence::key)
    }

    fn is_running(&self) -> bool {
        let state = self.state();
        state.status == TimerStatus::Ongoing && state.has_open_section()
    }

    /// Clear everything and open the first section. Only from `Stopped`.
    pub fn start(&mut self, label: Option<&str>) -> Result<(), TimerError> {
        let state = self.state();
        if state.status != TimerStatus::Stopped || state.has_open_section() {
            return Ok(());
        }
        let now = self.now();
        let mut fresh = TimerState::initial(now, self.show_ms);
        fresh.sections.push(Section::open(now, label.map(str::to_owned)));
        fresh.status = TimerStatus::Ongoing;

        self.start_tick(now);
        self.store.set(fresh);
        self.commit(TimerEvent::Start)
    }

    /// Close the open section, if any, and record the end time. Always
    /// applies; a stopped timer can only be started again.
    pub fn stop(&mut self) -> Result<(), TimerError> {
        let now = self.now();
        let show_ms = self.show_ms;
        self.cancel_tick();
        self.store.update(|s| {
            s.close_open_section(now, show_ms);
            s.status = TimerStatus::Stopped;
            s.end_time = Some(now);
        });
        self.commit(TimerEvent::Stop)
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        if !self.is_running() {
            return Ok(());
        }
        let now = self.now();
        let show_ms = self.show_ms;
        self.cancel_tick();
        self.store.update(|s| {
            s.close_open_section(now, show_ms);
            s.status = TimerStatus::Paused;
        });
        self.commit(TimerEvent::Pause)
    }

    /// Open a new section after a pause.
    pub fn resume(&mut self, label: Option<&str>) -> Result<(), TimerError> {
        let state = self.state();
        if state.status != TimerStatus::Paused || state.has_open_section() {
            return Ok(());
        }
        let now = self.now();
        let show_ms = self.show_ms;
        self.start_tick(now);
        self.store.update(|s| {
            s.sections.push(Section::open(now, label.map(str::to_owned)));
            s.status = TimerStatus::Ongoing;
            s.refresh(now, show_ms);
        });
        self.commit(TimerEvent::Resume)
    }

    /// Throw the state away and go back to a fresh stopped timer.
    pub fn reset(&mut self) -> Result<(), TimerError> {
        let now = self.now();
        self.cancel_tick();
        self.store.set(TimerState::initial(now, self.show_ms));
        self.commit(TimerEvent::Reset)
    }

    /// Record a lap. Only while running.
    pub fn lap(&mut self) -> Result<(), TimerError> {
        if !self.is_running() {
            return Ok(());
        }
        let now = self.now();
        self.store.update(|s| {
            let section_start = s.last_section().map_or(s.start_time, |sec| sec.from);
            let previous = s.last_lap().map_or(section_start, |lap| lap.timestamp);
            s.laps.push(Lap {
                timestamp: now,
                duration_since_last_lap: now.saturating_sub(previous),
                duration_since_start: now.saturating_sub(s.start_time),
            });
        });
        self.commit(TimerEvent::Lap)
    }

    /// Start when stopped, pause when running, resume when paused.
    pub fn toggle(&mut self, label: Option<&str>) -> Result<(), TimerError> {
        match self.status() {
            TimerStatus::Stopped => self.start(label),
            TimerStatus::Ongoing => self.pause(),
            TimerStatus::Paused => self.resume(label),
        }
    }

    /// Run a tick if one is due. Returns whether the state was recomputed.
    pub fn poll(&mut self) -> bool {
        let now = self.now();
        if !self.ticker.fire(now) {
            return false;
        }
        self.tick(now)
    }

    fn tick(&mut self, now: u64) -> bool {
        if !self.state().has_open_section() {
            log::debug!("Tick with no open section, cancelling");
            self.cancel_tick();
            return false;
        }
        let show_ms = self.show_ms;
        self.store.update(|s| s.refresh(now, show_ms));
        log::trace!("tick {}", self.state().duration_str);
        true
    }

    /// Milliseconds until the next tick is due, `None` when not ticking.
    pub fn next_tick_in(&self) -> Option<u64> {
        self.ticker.remaining_ms(self.now())
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    fn start_tick(&mut self, now: u64) {
        self.ticker.start(now);
    }

    fn cancel_tick(&mut self) {
        self.ticker.cancel();
    }

    pub fn on(&mut self, event: TimerEvent, listener: Listener) {
        self.listeners.on(event, listener);
    }

    pub fn off(&mut self, event: TimerEvent, listener: &Listener) -> bool {
        self.listeners.off(event, listener)
    }

    /// Subscribe to every published state, ticks included.
    pub fn subscribe<F>(&mut self, f: F) -> SubscriptionId
    where
        F: FnMut(&TimerState) + 'static,
    {
        self.store.subscribe(f)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// The current state, for transfer elsewhere.
    pub fn save(&self) -> TimerState {
        self.snapshot()
    }

    /// Replace the current state wholesale. Ticking follows whether the new
    /// state has an open section. A malformed state is refused and the
    /// current one is kept.
    pub fn load(&mut self, state: TimerState) -> Result<(), TimerError> {
        if !state.is_consistent() {
            log::warn!("Refusing to load inconsistent state ({:?}, {} sections)", state.status, state.sections.len());
            return Err(TimerError::InconsistentState);
        }
        let now = self.now();
        let show_ms = self.show_ms;
        let open = state.has_open_section();
        self.store.set(state);
        if open {
            self.start_tick(now);
            self.store.update(|s| s.refresh(now, show_ms));
        } else {
            self.cancel_tick();
        }
        self.persist()
    }

    fn commit(&mut self, event: TimerEvent) -> Result<(), TimerError> {
        log::debug!("{} -> {:?} {}", event, self.state().status, self.state().duration_str);
        self.listeners.emit(event);
        self.persist()
    }

    fn persist(&mut self) -> Result<(), TimerError> {
        let Some(persistence) = self.persistence.as_mut() else {
            return Ok(());
        };
        persistence.save(self.store.get()).map_err(|e| {
            log::warn!("Failed to save timer state under {}: {}", persistence.key(), e);
            e
        })
    }
}
