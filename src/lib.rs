//! Stopwatch and countdown timers for the browser.
//!
//! Both timers share one drift-free [`engine::TimerEngine`]: the value shown is
//! always recomputed from a monotonic clock and a couple of anchor timestamps,
//! never summed from frame-to-frame increments. Controllers wrap an engine with
//! a per-frame [`render_loop::RenderLoop`] and talk to the page only through the
//! small traits in [`sinks`] and [`preferences`], so everything except the
//! [`browser`] adapters runs and is tested natively.

pub mod browser;
pub mod clock;
pub mod config;
pub mod controller;
pub mod engine;
pub mod format;
pub mod input;
pub mod laps;
pub mod preferences;
pub mod render_loop;
pub mod shortcuts;
pub mod sinks;

pub use clock::{Instant, ManualClock, MonotonicClock};
pub use controller::{CountdownController, StopwatchController};
pub use engine::{Direction, Tick, TimerEngine, TimerState};
pub use input::DurationInput;
pub use laps::{LapRecorder, LapRow};
pub use preferences::{Mode, Preferences, SettingsStore};
pub use render_loop::{FrameScheduler, ManualFrames, RenderLoop};
pub use sinks::{AlertSink, DisplaySink};
