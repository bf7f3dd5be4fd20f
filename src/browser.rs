//! Browser-backed implementations of the timer seams.
//!
//! Every API used here is optional at runtime. When something is missing the
//! adapter logs it and carries on without that feature.

use crate::clock::{Instant, MonotonicClock};
use crate::config::{
    ANNOUNCE_DELAY_MS, BEEP_ATTACK_SEC, BEEP_DECAY_SEC, BEEP_FREQUENCY_HZ, BEEP_PEAK_GAIN,
    BEEP_STOP_SEC, FINISHED_ANNOUNCEMENT, LIVE_REGION_ID, VIBRATION_PATTERN_MS,
};
use crate::preferences::SettingsStore;
use crate::render_loop::FrameScheduler;
use crate::sinks::AlertSink;
use gloo_timers::callback::Timeout;
use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AudioContext, AudioScheduledSourceNode, OscillatorType, Performance, Storage, Window};

/// A browser capability that could not be used.
#[derive(Debug)]
pub enum EnvError {
    NoWindow,
    Unsupported(&'static str),
    Js { context: &'static str, message: String },
}

impl EnvError {
    fn js(context: &'static str) -> impl FnOnce(JsValue) -> EnvError {
        move |value| EnvError::Js {
            context,
            message: format!("{:?}", value),
        }
    }
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvError::NoWindow => write!(f, "no window object available"),
            EnvError::Unsupported(feature) => write!(f, "{} is not supported here", feature),
            EnvError::Js { context, message } => write!(f, "{} failed: {}", context, message),
        }
    }
}

impl std::error::Error for EnvError {}

fn window() -> Result<Window, EnvError> {
    web_sys::window().ok_or(EnvError::NoWindow)
}

/// `performance.now()`, falling back to `Date.now()` where there is no
/// Performance API. Readings are clamped so they never go backwards.
pub struct PerformanceClock {
    performance: Option<Performance>,
    last: Cell<Instant>,
}

impl PerformanceClock {
    pub fn new() -> Self {
        let performance = window().ok().and_then(|w| w.performance());
        if performance.is_none() {
            warn!("performance.now() unavailable, timing falls back to Date.now()");
        }
        Self {
            performance,
            last: Cell::new(Instant::ORIGIN),
        }
    }
}

impl Default for PerformanceClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for PerformanceClock {
    fn now(&self) -> Instant {
        let millis = match &self.performance {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        };
        let reading = Instant::from_millis_f64(millis).max(self.last.get());
        self.last.set(reading);
        reading
    }
}

/// `requestAnimationFrame` with one long-lived JS closure per scheduler.
///
/// The closure is never dropped while it runs; each request just parks the
/// callback in `slot` and the closure takes it out when the frame fires.
pub struct AnimationFrames {
    slot: Rc<RefCell<Option<Rc<dyn Fn()>>>>,
    closure: Closure<dyn FnMut()>,
}

impl AnimationFrames {
    pub fn new() -> Self {
        let slot: Rc<RefCell<Option<Rc<dyn Fn()>>>> = Rc::new(RefCell::new(None));
        let fired = Rc::clone(&slot);
        let closure = Closure::wrap(Box::new(move || {
            let callback = fired.borrow_mut().take();
            if let Some(callback) = callback {
                callback();
            }
        }) as Box<dyn FnMut()>);
        Self { slot, closure }
    }

    fn request(&self) -> Result<i32, EnvError> {
        window()?
            .request_animation_frame(self.closure.as_ref().unchecked_ref())
            .map_err(EnvError::js("requestAnimationFrame"))
    }
}

impl Default for AnimationFrames {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for AnimationFrames {
    type Handle = i32;

    fn request_frame(&self, callback: Rc<dyn Fn()>) -> Option<i32> {
        *self.slot.borrow_mut() = Some(callback);
        match self.request() {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("{}", e);
                self.slot.borrow_mut().take();
                None
            }
        }
    }

    fn cancel_frame(&self, handle: i32) {
        let cancelled = window().and_then(|w| {
            w.cancel_animation_frame(handle)
                .map_err(EnvError::js("cancelAnimationFrame"))
        });
        if let Err(e) = cancelled {
            debug!("{}", e);
        }
        // Even if the browser still fires it, the frame finds nothing to run.
        self.slot.borrow_mut().take();
    }
}

/// `window.localStorage`. Reads and writes fail quietly (private mode, quota,
/// disabled storage).
pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    pub fn new() -> Self {
        let storage = window().and_then(|w| {
            w.local_storage()
                .map_err(EnvError::js("localStorage"))?
                .ok_or(EnvError::Unsupported("localStorage"))
        });
        match storage {
            Ok(storage) => Self {
                storage: Some(storage),
            },
            Err(e) => {
                warn!("settings will not persist: {}", e);
                Self { storage: None }
            }
        }
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        let storage = self.storage.as_ref()?;
        match storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                debug!("reading {} failed: {:?}", key, e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.set_item(key, value) {
                debug!("writing {} failed: {:?}", key, e);
            }
        }
    }
}

/// Completion feedback: screen-reader announcement, vibration and an optional beep.
pub struct BrowserAlert {
    beep_enabled: bool,
    audio: Option<AudioContext>,
}

impl BrowserAlert {
    pub fn new(beep_enabled: bool) -> Self {
        Self {
            beep_enabled,
            audio: None,
        }
    }

    pub fn beep_enabled(&self) -> bool {
        self.beep_enabled
    }

    pub fn set_beep_enabled(&mut self, enabled: bool) {
        self.beep_enabled = enabled;
    }

    /// Put `message` into the live region. It is cleared first and written a
    /// moment later so assistive technology reports repeats too.
    pub fn announce(&self, message: &'static str) -> Result<(), EnvError> {
        let live = window()?
            .document()
            .and_then(|d| d.get_element_by_id(LIVE_REGION_ID))
            .ok_or(EnvError::Unsupported("live region"))?;
        live.set_text_content(Some(""));
        Timeout::new(ANNOUNCE_DELAY_MS, move || {
            live.set_text_content(Some(message));
        })
        .forget();
        Ok(())
    }

    pub fn vibrate(&self) -> Result<(), EnvError> {
        let navigator = window()?.navigator();
        let supported = js_sys::Reflect::has(&navigator, &JsValue::from_str("vibrate"))
            .unwrap_or(false);
        if !supported {
            return Err(EnvError::Unsupported("vibration"));
        }
        let pattern: js_sys::Array = VIBRATION_PATTERN_MS
            .iter()
            .map(|&ms| JsValue::from(ms))
            .collect();
        navigator.vibrate_with_pattern(&pattern);
        Ok(())
    }

    /// Short 880 Hz sine with a quick attack and exponential decay.
    pub fn beep(&mut self) -> Result<(), EnvError> {
        if self.audio.is_none() {
            self.audio = Some(AudioContext::new().map_err(EnvError::js("AudioContext"))?);
        }
        let ctx = match &self.audio {
            Some(ctx) => ctx,
            None => return Err(EnvError::Unsupported("Web Audio")),
        };

        let oscillator = ctx
            .create_oscillator()
            .map_err(EnvError::js("createOscillator"))?;
        let gain = ctx.create_gain().map_err(EnvError::js("createGain"))?;
        oscillator.set_type(OscillatorType::Sine);
        oscillator.frequency().set_value(BEEP_FREQUENCY_HZ);
        // Start quiet to avoid a pop.
        gain.gain().set_value(0.001);
        oscillator
            .connect_with_audio_node(&gain)
            .map_err(EnvError::js("connect oscillator"))?;
        gain.connect_with_audio_node(&ctx.destination())
            .map_err(EnvError::js("connect gain"))?;

        let now = ctx.current_time();
        gain.gain()
            .exponential_ramp_to_value_at_time(BEEP_PEAK_GAIN, now + BEEP_ATTACK_SEC)
            .map_err(EnvError::js("gain attack"))?;
        let source: &AudioScheduledSourceNode = oscillator.as_ref();
        source
            .start_with_when(now)
            .map_err(EnvError::js("oscillator start"))?;
        gain.gain()
            .exponential_ramp_to_value_at_time(0.0001, now + BEEP_DECAY_SEC)
            .map_err(EnvError::js("gain decay"))?;
        source
            .stop_with_when(now + BEEP_STOP_SEC)
            .map_err(EnvError::js("oscillator stop"))?;
        Ok(())
    }
}

impl AlertSink for BrowserAlert {
    fn signal_completion(&mut self) {
        if let Err(e) = self.announce(FINISHED_ANNOUNCEMENT) {
            debug!("announcement skipped: {}", e);
        }
        if let Err(e) = self.vibrate() {
            debug!("vibration skipped: {}", e);
        }
        if self.beep_enabled {
            if let Err(e) = self.beep() {
                debug!("beep skipped: {}", e);
            }
        }
    }
}
