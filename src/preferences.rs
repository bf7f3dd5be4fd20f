//! Persisted user preferences on top of a best-effort key-value store.
//!
//! Only two things survive a reload: which tab was open and the last countdown
//! duration that was entered. A store that cannot read or write simply behaves
//! as if nothing had been saved.

use crate::config::{KEY_ACTIVE_TAB, KEY_COUNTDOWN_INPUT};
use crate::input::DurationInput;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// String key-value storage. Implementations swallow their own failures.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store for tests and environments without `localStorage`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }
}

/// The two timer tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Stopwatch,
    Countdown,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Stopwatch => "stopwatch",
            Mode::Countdown => "countdown",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown timer mode {:?}", self.0)
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stopwatch" => Ok(Mode::Stopwatch),
            "countdown" => Ok(Mode::Countdown),
            other => Err(UnknownMode(other.to_owned())),
        }
    }
}

/// Typed access to the saved preferences.
pub struct Preferences<S> {
    store: S,
}

impl<S: SettingsStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Last active tab; anything unreadable means the stopwatch.
    pub fn active_mode(&self) -> Mode {
        match self.store.get(KEY_ACTIVE_TAB) {
            Some(raw) => raw.parse::<Mode>().unwrap_or_else(|e: UnknownMode| {
                debug!("ignoring saved tab: {}", e);
                Mode::default()
            }),
            None => Mode::default(),
        }
    }

    pub fn set_active_mode(&mut self, mode: Mode) {
        self.store.set(KEY_ACTIVE_TAB, mode.as_str());
    }

    /// Last entered countdown duration, if one was saved and is readable.
    pub fn countdown_input(&self) -> Option<DurationInput> {
        let raw = self.store.get(KEY_COUNTDOWN_INPUT)?;
        match serde_json::from_str::<DurationInput>(&raw) {
            Ok(input) => Some(input.normalized()),
            Err(e) => {
                debug!("ignoring saved countdown input {:?}: {}", raw, e);
                None
            }
        }
    }

    pub fn set_countdown_input(&mut self, input: DurationInput) {
        match serde_json::to_string(&input) {
            Ok(json) => self.store.set(KEY_COUNTDOWN_INPUT, &json),
            Err(e) => warn!("could not encode countdown input: {}", e),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_stopwatch_when_nothing_saved() {
        let prefs = Preferences::new(MemoryStore::new());
        assert_eq!(prefs.active_mode(), Mode::Stopwatch);
        assert_eq!(prefs.countdown_input(), None);
    }

    #[test]
    fn remembers_active_mode() {
        let mut prefs = Preferences::new(MemoryStore::new());
        prefs.set_active_mode(Mode::Countdown);
        assert_eq!(prefs.store().get(KEY_ACTIVE_TAB).as_deref(), Some("countdown"));
        assert_eq!(prefs.active_mode(), Mode::Countdown);
    }

    #[test]
    fn unknown_mode_falls_back_to_stopwatch() {
        let mut store = MemoryStore::new();
        store.set(KEY_ACTIVE_TAB, "egg-timer");
        assert_eq!(Preferences::new(store).active_mode(), Mode::Stopwatch);
    }

    #[test]
    fn countdown_input_round_trips_as_json() {
        let mut prefs = Preferences::new(MemoryStore::new());
        let input = DurationInput::clamped(0, 10, 0);
        prefs.set_countdown_input(input);
        assert_eq!(
            prefs.store().get(KEY_COUNTDOWN_INPUT).as_deref(),
            Some(r#"{"h":0,"m":10,"s":0}"#)
        );
        assert_eq!(prefs.countdown_input(), Some(input));
    }

    #[test]
    fn corrupt_or_out_of_range_input_is_tolerated() {
        let mut store = MemoryStore::new();
        store.set(KEY_COUNTDOWN_INPUT, "{not json");
        assert_eq!(Preferences::new(store).countdown_input(), None);

        let mut store = MemoryStore::new();
        store.set(KEY_COUNTDOWN_INPUT, r#"{"h":1,"m":90,"s":70}"#);
        assert_eq!(
            Preferences::new(store).countdown_input(),
            Some(DurationInput::clamped(1, 59, 59))
        );
    }
}
