//! UI-facing stopwatch and countdown controllers.
//!
//! Each controller owns one [`TimerEngine`] and one [`RenderLoop`]. Commands
//! change the engine synchronously and start or stop the loop; the loop only
//! ever reads the engine and pushes text to the display sink.

use crate::clock::MonotonicClock;
use crate::engine::{TimerEngine, TimerState};
use crate::format::{format_countdown, format_stopwatch};
use crate::input::DurationInput;
use crate::laps::{LapRecorder, LapRow};
use crate::render_loop::{FrameScheduler, RenderLoop};
use crate::sinks::{AlertSink, DisplaySink};
use log::info;
use std::cell::{Ref, RefCell, RefMut};
use std::ops::ControlFlow;
use std::rc::Rc;
use std::time::Duration;

struct StopwatchCore<C, D> {
    engine: TimerEngine<C>,
    laps: LapRecorder,
    display: D,
}

impl<C: MonotonicClock, D: DisplaySink> StopwatchCore<C, D> {
    fn render_now(&mut self) {
        let elapsed = self.engine.sample();
        self.display.render(&format_stopwatch(elapsed));
    }

    fn render_laps(&mut self) {
        let rows = self.laps.rows_newest_first();
        self.display.render_laps(&rows);
    }
}

/// Count-up timer with laps.
pub struct StopwatchController<C, S, D>
where
    S: FrameScheduler + 'static,
{
    core: Rc<RefCell<StopwatchCore<C, D>>>,
    render_loop: RenderLoop<S>,
}

impl<C, S, D> StopwatchController<C, S, D>
where
    C: MonotonicClock + 'static,
    S: FrameScheduler + 'static,
    D: DisplaySink + 'static,
{
    pub fn new(clock: C, scheduler: S, display: D) -> Self {
        let mut core = StopwatchCore {
            engine: TimerEngine::count_up(clock),
            laps: LapRecorder::new(),
            display,
        };
        core.render_now();
        core.render_laps();
        Self {
            core: Rc::new(RefCell::new(core)),
            render_loop: RenderLoop::new(scheduler),
        }
    }

    /// Start or resume. Returns `false` if already running.
    pub fn start(&mut self) -> bool {
        let mut core = self.core.borrow_mut();
        if !core.engine.start() {
            return false;
        }
        core.render_now();
        drop(core);

        let frame_core = Rc::clone(&self.core);
        self.render_loop.start(move || {
            frame_core.borrow_mut().render_now();
            ControlFlow::Continue(())
        });
        true
    }

    /// Pause a running stopwatch. Any pending frame is cancelled before this returns.
    pub fn pause(&mut self) -> bool {
        self.render_loop.stop();
        let mut core = self.core.borrow_mut();
        let paused = core.engine.pause();
        if paused {
            core.render_now();
        }
        paused
    }

    /// Pause when running, otherwise start.
    pub fn toggle(&mut self) -> bool {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Back to zero with no laps. Does nothing on a stopwatch that was never started.
    pub fn reset(&mut self) -> bool {
        if !self.can_reset() {
            return false;
        }
        self.render_loop.stop();
        let mut core = self.core.borrow_mut();
        core.engine.reset();
        core.laps.clear();
        core.render_now();
        core.render_laps();
        true
    }

    /// Record a lap and re-render the lap list. Only while running.
    pub fn lap(&mut self) -> Option<Duration> {
        let mut guard = self.core.borrow_mut();
        let core = &mut *guard;
        let mark = core.engine.lap(&mut core.laps)?;
        core.render_laps();
        info!("lap {} at {:?}", core.laps.len(), mark);
        Some(mark)
    }

    pub fn state(&self) -> TimerState {
        self.core.borrow().engine.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == TimerState::Running
    }

    pub fn can_lap(&self) -> bool {
        self.is_running()
    }

    pub fn can_reset(&self) -> bool {
        self.state() != TimerState::Idle
    }

    pub fn elapsed(&self) -> Duration {
        self.core.borrow_mut().engine.sample()
    }

    pub fn laps(&self) -> Vec<LapRow> {
        self.core.borrow().laps.rows_newest_first()
    }

    pub fn display(&self) -> Ref<'_, D> {
        Ref::map(self.core.borrow(), |core| &core.display)
    }

    pub fn frames_running(&self) -> bool {
        self.render_loop.is_running()
    }
}

struct CountdownCore<C, D, A> {
    engine: TimerEngine<C>,
    display: D,
    alert: A,
    completion_signalled: bool,
}

impl<C: MonotonicClock, D: DisplaySink, A: AlertSink> CountdownCore<C, D, A> {
    fn render_now(&mut self) {
        let remaining = self.engine.sample();
        self.display.render(&format_countdown(remaining));
    }

    /// Fire the completion alert the first time the engine is seen finished,
    /// and tell the render loop whether to keep going.
    fn settle(&mut self) -> ControlFlow<()> {
        match self.engine.state() {
            TimerState::Running => ControlFlow::Continue(()),
            TimerState::Finished => {
                if !self.completion_signalled {
                    self.completion_signalled = true;
                    info!("countdown of {:?} complete", self.engine.target());
                    self.alert.signal_completion();
                }
                ControlFlow::Break(())
            }
            TimerState::Idle | TimerState::Paused => ControlFlow::Break(()),
        }
    }

    fn frame(&mut self) -> ControlFlow<()> {
        self.render_now();
        self.settle()
    }
}

/// Count-down timer with a one-shot completion alert.
///
/// Completion is noticed by polling on each frame, so it can trail the true
/// deadline by up to one frame.
pub struct CountdownController<C, S, D, A>
where
    S: FrameScheduler + 'static,
{
    core: Rc<RefCell<CountdownCore<C, D, A>>>,
    render_loop: RenderLoop<S>,
}

impl<C, S, D, A> CountdownController<C, S, D, A>
where
    C: MonotonicClock + 'static,
    S: FrameScheduler + 'static,
    D: DisplaySink + 'static,
    A: AlertSink + 'static,
{
    pub fn new(clock: C, scheduler: S, display: D, alert: A) -> Self {
        let mut core = CountdownCore {
            engine: TimerEngine::count_down(clock),
            display,
            alert,
            completion_signalled: false,
        };
        core.render_now();
        Self {
            core: Rc::new(RefCell::new(core)),
            render_loop: RenderLoop::new(scheduler),
        }
    }

    /// Stage the duration for the next run. The readout follows it only while idle;
    /// a run in progress keeps its own target.
    pub fn configure(&mut self, input: DurationInput) {
        let mut core = self.core.borrow_mut();
        core.engine.configure(input.as_duration());
        if core.engine.state() == TimerState::Idle {
            core.render_now();
        }
    }

    /// Start from idle or resume from pause, returning the target of the run.
    /// A zero configured duration runs for one minute instead. A finished
    /// countdown has to be reset first.
    pub fn start(&mut self) -> Option<Duration> {
        let mut core = self.core.borrow_mut();
        if !core.engine.start() {
            return None;
        }
        let target = core.engine.target();
        core.render_now();
        drop(core);

        let frame_core = Rc::clone(&self.core);
        self.render_loop
            .start(move || frame_core.borrow_mut().frame());
        Some(target)
    }

    /// Pause a running countdown. Any pending frame is cancelled before this returns.
    /// If the time ran out in the meantime the countdown finishes instead.
    pub fn pause(&mut self) -> bool {
        self.render_loop.stop();
        let mut core = self.core.borrow_mut();
        let paused = core.engine.pause();
        if core.engine.state() != TimerState::Idle {
            core.render_now();
        }
        let _ = core.settle();
        paused
    }

    pub fn toggle(&mut self) -> bool {
        if self.is_running() {
            self.pause()
        } else {
            self.start().is_some()
        }
    }

    /// Back to idle, showing the configured duration again.
    pub fn reset(&mut self) {
        self.render_loop.stop();
        let mut core = self.core.borrow_mut();
        core.engine.reset();
        core.completion_signalled = false;
        core.render_now();
    }

    /// Remaining time right now. Noticing completion here behaves exactly like
    /// noticing it on a frame.
    pub fn remaining(&mut self) -> Duration {
        let mut core = self.core.borrow_mut();
        let remaining = core.engine.sample();
        if core.engine.state() == TimerState::Finished {
            core.render_now();
            let _ = core.settle();
            drop(core);
            self.render_loop.stop();
        }
        remaining
    }

    pub fn state(&self) -> TimerState {
        self.core.borrow().engine.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == TimerState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state() == TimerState::Finished
    }

    pub fn configured(&self) -> Duration {
        self.core.borrow().engine.configured()
    }

    pub fn display(&self) -> Ref<'_, D> {
        Ref::map(self.core.borrow(), |core| &core.display)
    }

    pub fn alert(&self) -> Ref<'_, A> {
        Ref::map(self.core.borrow(), |core| &core.alert)
    }

    /// Adjust the alert between runs, e.g. to turn the beep on or off.
    pub fn alert_mut(&mut self) -> RefMut<'_, A> {
        RefMut::map(self.core.borrow_mut(), |core| &mut core.alert)
    }

    pub fn frames_running(&self) -> bool {
        self.render_loop.is_running()
    }
}
