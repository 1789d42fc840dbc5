//! Stopwatch logic with no platform dependencies.
//!
//! A [`Timer`] tracks elapsed time across start/pause/resume/stop cycles as a
//! list of contiguous [`Section`]s, records [`Lap`]s, and keeps a formatted
//! running total. Time comes from a host-supplied [`Clock`]; the host loop
//! drives live updates by calling [`Timer::poll`]. State can be persisted to
//! any [`Storage`] medium and picked up again by a later timer.

pub mod clock;
pub mod duration;
pub mod engine;
pub mod error;
pub mod events;
pub mod options;
pub mod persist;
pub mod state;
pub mod store;
pub mod tick;

pub use clock::{Clock, ManualClock, SystemClock};
pub use duration::{format_duration, format_ms, parse_duration, DurationParts};
pub use engine::Timer;
pub use error::{StorageError, TimerError};
pub use events::{Listener, TimerEvent};
pub use options::{PersistOptions, TimerOptions, DEFAULT_UPDATE_INTERVAL_MS};
pub use persist::{storage_key, FileStorage, MemoryStorage, Persistence, Storage, StorageKind};
pub use state::{Lap, Section, SectionStatus, TimerState, TimerStatus};
pub use store::{Store, SubscriptionId};
