//! Per-frame callback loop.
//!
//! A [`RenderLoop`] keeps at most one frame request outstanding and re-arms
//! itself after each frame until it is stopped or its callback breaks. Where the
//! frames come from is behind [`FrameScheduler`]: the browser's
//! `requestAnimationFrame` in the app, [`ManualFrames`] in tests.

use log::warn;
use std::cell::{Cell, RefCell};
use std::ops::ControlFlow;
use std::rc::{Rc, Weak};

/// Source of display frames.
///
/// Implementations only ever need to hold one outstanding request for a given
/// loop; a request is either fired once or cancelled.
pub trait FrameScheduler {
    type Handle;

    /// Arrange for `callback` to run once on the next frame. `None` means frames
    /// are unavailable in this environment.
    fn request_frame(&self, callback: Rc<dyn Fn()>) -> Option<Self::Handle>;

    fn cancel_frame(&self, handle: Self::Handle);
}

type FrameFn = Box<dyn FnMut() -> ControlFlow<()>>;

struct Shared<S: FrameScheduler> {
    scheduler: S,
    pending: RefCell<Option<S::Handle>>,
    on_frame: RefCell<Option<FrameFn>>,
    // Bumped on every start/stop so frames from an older registration are inert.
    generation: Cell<u64>,
    active: Cell<bool>,
}

pub struct RenderLoop<S: FrameScheduler + 'static> {
    shared: Rc<Shared<S>>,
}

impl<S: FrameScheduler + 'static> RenderLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            shared: Rc::new(Shared {
                scheduler,
                pending: RefCell::new(None),
                on_frame: RefCell::new(None),
                generation: Cell::new(0),
                active: Cell::new(false),
            }),
        }
    }

    /// Run `on_frame` once per frame until [`RenderLoop::stop`] is called or the
    /// callback returns `ControlFlow::Break`. Any previous registration is
    /// stopped first.
    pub fn start<F>(&self, on_frame: F)
    where
        F: FnMut() -> ControlFlow<()> + 'static,
    {
        self.stop();
        let generation = self.shared.bump_generation();
        *self.shared.on_frame.borrow_mut() = Some(Box::new(on_frame));
        self.shared.active.set(true);
        Shared::schedule(&self.shared, generation);
    }

    /// Cancel the pending frame, if any. Safe to call at any time, including from
    /// inside the frame callback.
    pub fn stop(&self) {
        let shared = &self.shared;
        shared.bump_generation();
        shared.active.set(false);
        let pending = shared.pending.borrow_mut().take();
        if let Some(handle) = pending {
            shared.scheduler.cancel_frame(handle);
        }
        let callback = shared.on_frame.borrow_mut().take();
        drop(callback);
    }

    pub fn is_running(&self) -> bool {
        self.shared.active.get()
    }

    pub fn scheduler(&self) -> &S {
        &self.shared.scheduler
    }
}

impl<S: FrameScheduler + 'static> Drop for RenderLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<S: FrameScheduler + 'static> Shared<S> {
    fn bump_generation(&self) -> u64 {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        next
    }

    fn schedule(shared: &Rc<Self>, generation: u64) {
        let weak: Weak<Self> = Rc::downgrade(shared);
        let callback: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(shared) = weak.upgrade() {
                Shared::run_frame(&shared, generation);
            }
        });
        match shared.scheduler.request_frame(callback) {
            Some(handle) => *shared.pending.borrow_mut() = Some(handle),
            None => {
                warn!("display frames unavailable, render loop not started");
                shared.active.set(false);
                let callback = shared.on_frame.borrow_mut().take();
                drop(callback);
            }
        }
    }

    fn run_frame(shared: &Rc<Self>, generation: u64) {
        if shared.generation.get() != generation {
            return;
        }
        let fired = shared.pending.borrow_mut().take();
        drop(fired);
        let taken = shared.on_frame.borrow_mut().take();
        let Some(mut on_frame) = taken else {
            return;
        };

        let flow = on_frame();

        // The callback may have stopped or restarted this loop.
        if shared.generation.get() != generation {
            return;
        }
        match flow {
            ControlFlow::Continue(()) => {
                *shared.on_frame.borrow_mut() = Some(on_frame);
                Shared::schedule(shared, generation);
            }
            ControlFlow::Break(()) => {
                shared.bump_generation();
                shared.active.set(false);
            }
        }
    }
}

#[derive(Default)]
struct ManualQueue {
    next_id: u64,
    queued: Vec<(u64, Rc<dyn Fn()>)>,
}

/// Frames fired by hand. Clones share one queue.
#[derive(Clone, Default)]
pub struct ManualFrames {
    queue: Rc<RefCell<ManualQueue>>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback requested before this call and return how many ran.
    /// Requests made while firing wait for the next call.
    pub fn fire(&self) -> usize {
        let due = std::mem::take(&mut self.queue.borrow_mut().queued);
        let count = due.len();
        for (_, callback) in due {
            callback();
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().queued.len()
    }
}

impl FrameScheduler for ManualFrames {
    type Handle = u64;

    fn request_frame(&self, callback: Rc<dyn Fn()>) -> Option<u64> {
        let mut queue = self.queue.borrow_mut();
        queue.next_id += 1;
        let id = queue.next_id;
        queue.queued.push((id, callback));
        Some(id)
    }

    fn cancel_frame(&self, handle: u64) {
        self.queue.borrow_mut().queued.retain(|(id, _)| *id != handle);
    }
}
