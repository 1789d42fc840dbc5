//! Property-based tests for the timer state machine
//!
//! Random operation sequences with random clock advances must keep sections
//! tiling time, keep the total equal to time spent running, and keep lap
//! deltas consistent with their timestamps.

use proptest::prelude::*;
use timer_core::{Clock, ManualClock, Timer, TimerOptions, TimerState, TimerStatus};

const T0: u64 = 1_600_000_000_000;

#[derive(Debug, Clone)]
enum Op {
    Start(Option<String>),
    Stop,
    Pause,
    Resume(Option<String>),
    Toggle,
    Lap,
    Reset,
    Poll,
    Advance(u64),
}

fn arb_label() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-z]{1,8}")
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arb_label().prop_map(Op::Start),
        Just(Op::Stop),
        Just(Op::Pause),
        arb_label().prop_map(Op::Resume),
        Just(Op::Toggle),
        Just(Op::Lap),
        Just(Op::Reset),
        Just(Op::Poll),
        (0u64..5_000).prop_map(Op::Advance),
        (0u64..5_000).prop_map(Op::Advance),
    ]
}

fn new_timer() -> (Timer<ManualClock>, ManualClock) {
    let clock = ManualClock::new(T0);
    let timer = Timer::new(clock.clone(), TimerOptions::default()).unwrap();
    (timer, clock)
}

fn apply(timer: &mut Timer<ManualClock>, clock: &ManualClock, op: &Op) {
    match op {
        Op::Start(label) => timer.start(label.as_deref()).unwrap(),
        Op::Stop => timer.stop().unwrap(),
        Op::Pause => timer.pause().unwrap(),
        Op::Resume(label) => timer.resume(label.as_deref()).unwrap(),
        Op::Toggle => timer.toggle(None).unwrap(),
        Op::Lap => timer.lap().unwrap(),
        Op::Reset => timer.reset().unwrap(),
        Op::Poll => {
            timer.poll();
        }
        Op::Advance(ms) => clock.advance(*ms),
    }
}

fn open_sections(state: &TimerState) -> usize {
    state.sections.iter().filter(|s| s.to.is_none()).count()
}

proptest! {
    /// At most one section is open, and only the last one.
    #[test]
    fn sections_never_overlap(ops in prop::collection::vec(arb_op(), 0..80)) {
        let (mut timer, clock) = new_timer();
        for op in &ops {
            apply(&mut timer, &clock, op);
            let state = timer.state();
            prop_assert!(state.is_consistent());
            prop_assert!(open_sections(state) <= 1);
            if open_sections(state) == 1 {
                prop_assert!(state.sections.last().unwrap().to.is_none());
            }
            prop_assert_eq!(state.status == TimerStatus::Ongoing, state.has_open_section());
            prop_assert_eq!(timer.is_ticking(), state.has_open_section());
        }
    }

    /// The total equals the time spent in the ongoing status since the last
    /// fresh start, whatever the pause/resume pattern.
    #[test]
    fn total_is_time_spent_running(ops in prop::collection::vec(arb_op(), 0..80)) {
        let (mut timer, clock) = new_timer();
        let mut expected = 0u64;
        for op in &ops {
            let before = timer.status();
            match op {
                Op::Advance(ms) if before == TimerStatus::Ongoing => expected += ms,
                Op::Start(_) | Op::Toggle if before == TimerStatus::Stopped => expected = 0,
                Op::Reset => expected = 0,
                _ => {}
            }
            apply(&mut timer, &clock, op);
        }
        prop_assert_eq!(timer.state().total_duration_ms(clock.now_ms()), expected);
    }

    /// Lap deltas agree with lap timestamps and section boundaries.
    #[test]
    fn lap_deltas_consistent(ops in prop::collection::vec(arb_op(), 0..80)) {
        let (mut timer, clock) = new_timer();
        for op in &ops {
            let laps_before = timer.state().laps.len();
            apply(&mut timer, &clock, op);
            let state = timer.state();
            if state.laps.len() == laps_before + 1 {
                let lap = state.laps[laps_before];
                prop_assert_eq!(lap.timestamp, clock.now_ms());
                prop_assert_eq!(lap.duration_since_start, lap.timestamp - state.start_time);
                let base = match laps_before {
                    0 => state.sections.last().unwrap().from,
                    n => state.laps[n - 1].timestamp,
                };
                prop_assert_eq!(lap.duration_since_last_lap, lap.timestamp - base);
            }
        }
    }

    /// Operations whose precondition fails leave the state untouched.
    #[test]
    fn invalid_transitions_are_noops(
        ops in prop::collection::vec(arb_op(), 0..40),
        advance in 0u64..1_000,
    ) {
        let (mut timer, clock) = new_timer();
        for op in &ops {
            apply(&mut timer, &clock, op);
        }
        clock.advance(advance);
        let before = timer.snapshot();
        match before.status {
            TimerStatus::Stopped => {
                timer.pause().unwrap();
                timer.resume(Some("nope")).unwrap();
                timer.lap().unwrap();
            }
            TimerStatus::Paused => {
                timer.pause().unwrap();
                timer.start(None).unwrap();
                timer.lap().unwrap();
            }
            TimerStatus::Ongoing => {
                timer.start(Some("again")).unwrap();
                timer.resume(None).unwrap();
            }
        }
        prop_assert_eq!(timer.snapshot(), before);
    }

    /// Saved state reloads into an identical timer, through JSON as well.
    #[test]
    fn save_load_round_trip(ops in prop::collection::vec(arb_op(), 0..40)) {
        let (mut timer, clock) = new_timer();
        for op in &ops {
            apply(&mut timer, &clock, op);
        }
        // Bring any live section up to the current instant first.
        timer.load(timer.save()).unwrap();
        let saved = timer.save();

        let json = serde_json::to_string(&saved).unwrap();
        let decoded: TimerState = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(&decoded, &saved);

        let (mut other, other_clock) = new_timer();
        other_clock.set(clock.now_ms());
        other.load(decoded).unwrap();
        prop_assert_eq!(other.save(), saved);
        prop_assert_eq!(other.is_ticking(), timer.is_ticking());
    }
}

#[test]
fn reset_equals_fresh_timer() {
    let (mut timer, clock) = new_timer();
    timer.start(Some("a")).unwrap();
    clock.advance(1_234);
    timer.lap().unwrap();
    timer.pause().unwrap();
    clock.advance(10);
    timer.resume(Some("b")).unwrap();
    timer.reset().unwrap();

    let fresh = Timer::new(clock.clone(), TimerOptions::default()).unwrap();
    assert_eq!(timer.snapshot(), fresh.snapshot());
}
