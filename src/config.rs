//! Application-level configuration constants.

// Countdown
pub const DEFAULT_COUNTDOWN_MS: u64 = 60_000;
pub const MAX_HOURS: u8 = 99;
pub const MAX_MINUTES: u8 = 59;
pub const MAX_SECONDS: u8 = 59;
pub const QUICK_PRESET_MINUTES: [u64; 4] = [1, 5, 10, 15];

// Persistence keys
pub const KEY_ACTIVE_TAB: &str = "timer.activeTab";
pub const KEY_COUNTDOWN_INPUT: &str = "timer.countdown.input";

// Completion feedback
pub const FINISHED_ANNOUNCEMENT: &str = "Countdown finished.";
pub const LIVE_REGION_ID: &str = "live";
pub const ANNOUNCE_DELAY_MS: u32 = 10;
pub const VIBRATION_PATTERN_MS: [u32; 3] = [120, 80, 120];
pub const BEEP_FREQUENCY_HZ: f32 = 880.0;
pub const BEEP_PEAK_GAIN: f32 = 0.15;
pub const BEEP_ATTACK_SEC: f64 = 0.01;
pub const BEEP_DECAY_SEC: f64 = 0.35;
pub const BEEP_STOP_SEC: f64 = 0.4;
