//! Drift-free timer state machine shared by the stopwatch and the countdown.
//!
//! The engine never accumulates per-frame increments. It remembers the clock
//! reading at which the current run segment began (`anchor`) plus the time banked
//! from earlier segments (`accumulated`), and derives the current value from a
//! fresh clock reading every time it is asked. Frame-rate jitter therefore
//! cannot make the displayed time drift.

use crate::clock::{Instant, MonotonicClock};
use crate::config::DEFAULT_COUNTDOWN_MS;
use crate::laps::LapRecorder;
use log::debug;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    CountUp,
    CountDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Only reachable when counting down.
    Finished,
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerState::Idle => "idle",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Result of polling the engine once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Elapsed time (count-up) or remaining time (count-down).
    pub value: Duration,
    /// True only for the single poll that moved a countdown into `Finished`.
    pub just_finished: bool,
}

pub struct TimerEngine<C> {
    clock: C,
    direction: Direction,
    state: TimerState,
    anchor: Option<Instant>,
    /// Count-up time banked from earlier run segments, in both directions.
    accumulated: Duration,
    /// Countdown length for the current run cycle; zero while idle.
    target: Duration,
    /// Staged countdown length, read only when starting from idle.
    configured: Duration,
    finished_already: bool,
}

impl<C: MonotonicClock> TimerEngine<C> {
    pub fn new(clock: C, direction: Direction) -> Self {
        Self {
            clock,
            direction,
            state: TimerState::Idle,
            anchor: None,
            accumulated: Duration::ZERO,
            target: Duration::ZERO,
            configured: Duration::ZERO,
            finished_already: false,
        }
    }

    pub fn count_up(clock: C) -> Self {
        Self::new(clock, Direction::CountUp)
    }

    pub fn count_down(clock: C) -> Self {
        Self::new(clock, Direction::CountDown)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Countdown length fixed for the current run cycle (zero before the first start).
    pub fn target(&self) -> Duration {
        self.target
    }

    pub fn configured(&self) -> Duration {
        self.configured
    }

    /// Stage the countdown length for the next start from idle. A running
    /// countdown keeps the target it started with.
    pub fn configure(&mut self, duration: Duration) {
        self.configured = duration;
    }

    /// Begin or resume a run segment. Returns `false` (and does nothing) unless
    /// the engine is idle or paused.
    pub fn start(&mut self) -> bool {
        match self.state {
            TimerState::Idle => {
                if self.direction == Direction::CountDown {
                    self.target = if self.configured.is_zero() {
                        Duration::from_millis(DEFAULT_COUNTDOWN_MS)
                    } else {
                        self.configured
                    };
                    self.finished_already = false;
                }
            }
            TimerState::Paused => {}
            TimerState::Running | TimerState::Finished => return false,
        }
        self.anchor = Some(self.clock.now());
        debug!("{:?} timer {} -> running", self.direction, self.state);
        self.state = TimerState::Running;
        true
    }

    /// Bank the current segment and stop the clock. A no-op unless running.
    ///
    /// A countdown that has already run out finishes instead, and `false` is
    /// returned just as for any other non-pause.
    pub fn pause(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        let elapsed = self.count_up_value(self.clock.now());
        if self.direction == Direction::CountDown && self.poll_countdown(elapsed).just_finished {
            return false;
        }
        self.accumulated = elapsed;
        self.anchor = None;
        self.state = TimerState::Paused;
        debug!("{:?} timer paused at {:?}", self.direction, self.accumulated);
        true
    }

    /// Return to idle from any state, forgetting all banked time.
    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.anchor = None;
        self.accumulated = Duration::ZERO;
        self.target = Duration::ZERO;
        self.finished_already = false;
        debug!("{:?} timer reset", self.direction);
    }

    /// Current elapsed (count-up) or remaining (count-down) time.
    ///
    /// For a running countdown that has reached zero this moves the engine to
    /// `Finished`; see [`TimerEngine::poll`] to learn whether that happened.
    pub fn sample(&mut self) -> Duration {
        self.poll().value
    }

    /// Like [`TimerEngine::sample`], also reporting whether this call finished the countdown.
    pub fn poll(&mut self) -> Tick {
        let now = self.clock.now();
        let elapsed = self.count_up_value(now);
        match self.direction {
            Direction::CountUp => Tick {
                value: elapsed,
                just_finished: false,
            },
            Direction::CountDown => self.poll_countdown(elapsed),
        }
    }

    /// Record a lap at the current elapsed time. Only a running count-up engine
    /// takes laps; otherwise nothing is recorded.
    pub fn lap(&mut self, laps: &mut LapRecorder) -> Option<Duration> {
        if self.direction != Direction::CountUp || self.state != TimerState::Running {
            return None;
        }
        let mark = self.sample();
        laps.record(mark);
        Some(mark)
    }

    fn count_up_value(&self, now: Instant) -> Duration {
        match (self.state, self.anchor) {
            (TimerState::Running, Some(anchor)) => self.accumulated + (now - anchor),
            _ => self.accumulated,
        }
    }

    fn poll_countdown(&mut self, elapsed: Duration) -> Tick {
        match self.state {
            TimerState::Idle => Tick {
                value: self.configured,
                just_finished: false,
            },
            TimerState::Finished => Tick {
                value: Duration::ZERO,
                just_finished: false,
            },
            TimerState::Paused => Tick {
                value: self.target.saturating_sub(elapsed),
                just_finished: false,
            },
            TimerState::Running if elapsed < self.target => Tick {
                value: self.target - elapsed,
                just_finished: false,
            },
            TimerState::Running => {
                self.state = TimerState::Finished;
                self.anchor = None;
                self.accumulated = self.target;
                let just_finished = !self.finished_already;
                self.finished_already = true;
                debug!("countdown of {:?} finished", self.target);
                Tick {
                    value: Duration::ZERO,
                    just_finished,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn stopwatch() -> (ManualClock, TimerEngine<ManualClock>) {
        let clock = ManualClock::new();
        (clock.clone(), TimerEngine::count_up(clock))
    }

    fn countdown(configured_ms: u64) -> (ManualClock, TimerEngine<ManualClock>) {
        let clock = ManualClock::new();
        let mut engine = TimerEngine::count_down(clock.clone());
        engine.configure(ms(configured_ms));
        (clock, engine)
    }

    #[test]
    fn idle_count_up_reads_zero() {
        let (clock, mut engine) = stopwatch();
        clock.advance_ms(5_000);
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.sample(), Duration::ZERO);
    }

    #[test]
    fn sample_is_zero_after_reset_from_every_state() {
        let (clock, mut engine) = stopwatch();

        engine.reset();
        assert_eq!(engine.sample(), Duration::ZERO);

        engine.start();
        clock.advance_ms(300);
        engine.reset();
        assert_eq!(engine.sample(), Duration::ZERO);

        engine.start();
        clock.advance_ms(300);
        engine.pause();
        clock.advance_ms(300);
        engine.reset();
        assert_eq!(engine.sample(), Duration::ZERO);
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn pausing_twice_is_the_same_as_once() {
        let (clock, mut engine) = stopwatch();
        engine.start();
        clock.advance_ms(700);
        assert!(engine.pause());
        let once = (engine.state(), engine.sample());

        clock.advance_ms(400);
        assert!(!engine.pause());
        assert_eq!((engine.state(), engine.sample()), once);
    }

    #[test]
    fn pause_from_idle_is_ignored() {
        let (_clock, mut engine) = stopwatch();
        assert!(!engine.pause());
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn start_while_running_keeps_the_anchor() {
        let (clock, mut engine) = stopwatch();
        engine.start();
        clock.advance_ms(100);
        assert!(!engine.start());
        clock.advance_ms(100);
        assert_eq!(engine.sample(), ms(200));
    }

    #[test]
    fn running_count_up_never_decreases() {
        let (clock, mut engine) = stopwatch();
        engine.start();
        let mut last = engine.sample();
        for step in [0, 16, 17, 0, 33, 1, 250] {
            clock.advance_ms(step);
            let now = engine.sample();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, ms(317));
    }

    #[test]
    fn pause_and_resume_is_lossless() {
        let (clock, mut engine) = stopwatch();
        engine.start();
        clock.advance_ms(1_500);
        engine.pause();
        clock.advance_ms(60_000);
        engine.start();
        clock.advance_ms(2_250);
        engine.pause();
        assert_eq!(engine.sample(), ms(3_750));
    }

    #[test]
    fn laps_only_while_running() {
        let (clock, mut engine) = stopwatch();
        let mut laps = LapRecorder::new();

        assert_eq!(engine.lap(&mut laps), None);
        engine.start();
        clock.advance_ms(1_000);
        assert_eq!(engine.lap(&mut laps), Some(ms(1_000)));
        engine.pause();
        assert_eq!(engine.lap(&mut laps), None);
        assert_eq!(laps.marks(), &[ms(1_000)]);
    }

    #[test]
    fn stopwatch_scenario() {
        let (clock, mut engine) = stopwatch();
        let mut laps = LapRecorder::new();

        engine.start();
        clock.advance_ms(5_000);
        assert_eq!(engine.lap(&mut laps), Some(ms(5_000)));
        assert_eq!(laps.splits().collect::<Vec<_>>(), vec![ms(5_000)]);

        clock.advance_ms(3_000);
        engine.pause();
        assert_eq!(engine.sample(), ms(8_000));

        engine.start();
        clock.advance_ms(2_000);
        assert_eq!(engine.sample(), ms(10_000));
    }

    #[test]
    fn idle_countdown_shows_configured_duration() {
        let (_clock, mut engine) = countdown(90_000);
        assert_eq!(engine.sample(), ms(90_000));
        assert_eq!(engine.target(), Duration::ZERO);
    }

    #[test]
    fn countdown_counts_down_and_pauses() {
        let (clock, mut engine) = countdown(10_000);
        engine.start();
        clock.advance_ms(4_000);
        assert_eq!(engine.sample(), ms(6_000));
        engine.pause();
        clock.advance_ms(30_000);
        assert_eq!(engine.sample(), ms(6_000));
        engine.start();
        clock.advance_ms(1_000);
        assert_eq!(engine.sample(), ms(5_000));
    }

    #[test]
    fn countdown_finishes_exactly_once() {
        let (clock, mut engine) = countdown(1_000);
        engine.start();
        clock.advance_ms(999);
        assert!(!engine.poll().just_finished);

        clock.advance_ms(1);
        let tick = engine.poll();
        assert!(tick.just_finished);
        assert_eq!(tick.value, Duration::ZERO);
        assert_eq!(engine.state(), TimerState::Finished);

        let mut repeats = 0;
        for _ in 0..50 {
            clock.advance_ms(16);
            let tick = engine.poll();
            assert_eq!(tick.value, Duration::ZERO);
            if tick.just_finished {
                repeats += 1;
            }
        }
        assert_eq!(repeats, 0);
    }

    #[test]
    fn finished_countdown_only_restarts_after_reset() {
        let (clock, mut engine) = countdown(1_000);
        engine.start();
        clock.advance_ms(2_000);
        engine.sample();
        assert!(!engine.start());
        assert!(!engine.pause());
        assert_eq!(engine.state(), TimerState::Finished);

        engine.reset();
        assert!(engine.start());
        clock.advance_ms(1_000);
        assert!(engine.poll().just_finished);
    }

    #[test]
    fn pausing_an_expired_countdown_finishes_it() {
        let (clock, mut engine) = countdown(1_000);
        engine.start();
        clock.advance_ms(1_200);
        assert!(!engine.pause());
        assert_eq!(engine.state(), TimerState::Finished);
        assert_eq!(engine.sample(), Duration::ZERO);
    }

    #[test]
    fn zero_duration_falls_back_to_one_minute() {
        let (_clock, mut engine) = countdown(0);
        engine.start();
        assert_eq!(engine.target(), ms(60_000));
        assert_eq!(engine.sample(), ms(60_000));
    }

    #[test]
    fn configuring_mid_run_only_stages_the_next_run() {
        let (clock, mut engine) = countdown(10_000);
        engine.start();
        clock.advance_ms(1_000);
        engine.configure(ms(300_000));
        assert_eq!(engine.target(), ms(10_000));
        assert_eq!(engine.sample(), ms(9_000));

        engine.reset();
        assert_eq!(engine.sample(), ms(300_000));
        engine.start();
        assert_eq!(engine.target(), ms(300_000));
    }

    #[test]
    fn count_up_never_finishes() {
        let (clock, mut engine) = stopwatch();
        engine.start();
        clock.advance(Duration::from_secs(100 * 3600));
        assert!(!engine.poll().just_finished);
        assert_eq!(engine.state(), TimerState::Running);
    }
}
