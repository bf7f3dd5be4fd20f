//! Countdown duration input: the H/M/S value handed to the timers, and the
//! text clean-up applied to the three input fields before anything reaches them.

use crate::config::{MAX_HOURS, MAX_MINUTES, MAX_SECONDS};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Compiled regex for stripping everything but digits
static NON_DIGIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d]").unwrap());

/// A validated countdown length. Fields are always within their field maxima.
///
/// Serialized as `{"h":..,"m":..,"s":..}` for the settings store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationInput {
    #[serde(rename = "h")]
    hours: u8,
    #[serde(rename = "m")]
    minutes: u8,
    #[serde(rename = "s")]
    seconds: u8,
}

impl DurationInput {
    /// Build from raw field values, clamping each to its range.
    pub fn clamped(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours: hours.min(u32::from(MAX_HOURS)) as u8,
            minutes: minutes.min(u32::from(MAX_MINUTES)) as u8,
            seconds: seconds.min(u32::from(MAX_SECONDS)) as u8,
        }
    }

    /// Split a duration into fields, dropping sub-second parts and capping at
    /// 99:59:59.
    pub fn from_duration(d: Duration) -> Self {
        let total = d.as_secs();
        let max_total =
            u64::from(MAX_HOURS) * 3600 + u64::from(MAX_MINUTES) * 60 + u64::from(MAX_SECONDS);
        let total = total.min(max_total);
        Self {
            hours: (total / 3600) as u8,
            minutes: ((total % 3600) / 60) as u8,
            seconds: (total % 60) as u8,
        }
    }

    pub fn from_minutes(minutes: u64) -> Self {
        Self::from_duration(Duration::from_secs(minutes * 60))
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(
            u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds),
        )
    }

    pub fn is_zero(&self) -> bool {
        self.as_duration().is_zero()
    }

    /// Re-apply the field maxima, e.g. after deserializing untrusted settings.
    pub fn normalized(self) -> Self {
        Self::clamped(
            u32::from(self.hours),
            u32::from(self.minutes),
            u32::from(self.seconds),
        )
    }

    /// Fields as two-digit strings, ready for the input boxes.
    pub fn field_texts(&self) -> [String; 3] {
        [pad2(self.hours), pad2(self.minutes), pad2(self.seconds)]
    }
}

/// Which of the three input boxes a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Hours,
    Minutes,
    Seconds,
}

impl Field {
    pub fn max(self) -> u32 {
        match self {
            Field::Hours => u32::from(MAX_HOURS),
            Field::Minutes => u32::from(MAX_MINUTES),
            Field::Seconds => u32::from(MAX_SECONDS),
        }
    }
}

fn pad2(n: u8) -> String {
    format!("{:02}", n)
}

/// Strip everything that is not a digit. Applied on every keystroke.
pub fn digits_only(raw: &str) -> String {
    NON_DIGIT_REGEX.replace_all(raw, "").into_owned()
}

/// Parse the digits of a field, treating empty or overflowing text as zero
/// or the maximum respectively, then clamp to `0..=max`.
pub fn parse_field(raw: &str, max: u32) -> u32 {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return 0;
    }
    // All digits, so the only parse failure is overflow.
    digits.parse::<u32>().map_or(max, |n| n.min(max))
}

/// Canonical two-digit text for a field when it loses focus.
pub fn sanitize_field(raw: &str, max: u32) -> String {
    format!("{:02}", parse_field(raw, max))
}

/// Arrow-key stepping: one up or down, clamped to `0..=max`.
pub fn step_field(raw: &str, max: u32, up: bool) -> String {
    let current = parse_field(raw, max);
    let next = if up {
        (current + 1).min(max)
    } else {
        current.saturating_sub(1)
    };
    format!("{:02}", next)
}

/// Read the three raw field texts into a clamped duration.
pub fn read_fields(hours: &str, minutes: &str, seconds: &str) -> DurationInput {
    DurationInput::clamped(
        parse_field(hours, Field::Hours.max()),
        parse_field(minutes, Field::Minutes.max()),
        parse_field(seconds, Field::Seconds.max()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_each_field() {
        let input = DurationInput::clamped(150, 75, 60);
        assert_eq!((input.hours(), input.minutes(), input.seconds()), (99, 59, 59));
    }

    #[test]
    fn duration_round_trips_through_fields() {
        let input = DurationInput::clamped(1, 2, 3);
        assert_eq!(input.as_duration(), Duration::from_secs(3723));
        assert_eq!(DurationInput::from_duration(input.as_duration()), input);
    }

    #[test]
    fn from_duration_caps_at_the_largest_input() {
        let input = DurationInput::from_duration(Duration::from_secs(500 * 3600));
        assert_eq!(input, DurationInput::clamped(99, 59, 59));
    }

    #[test]
    fn presets_split_into_minutes() {
        assert_eq!(DurationInput::from_minutes(15), DurationInput::clamped(0, 15, 0));
        assert_eq!(DurationInput::from_minutes(90), DurationInput::clamped(1, 30, 0));
    }

    #[test]
    fn sanitizes_field_text() {
        assert_eq!(digits_only("1a2 b3"), "123");
        assert_eq!(sanitize_field("", 59), "00");
        assert_eq!(sanitize_field("7", 59), "07");
        assert_eq!(sanitize_field("x75", 59), "59");
        assert_eq!(sanitize_field("99999999999999", 99), "99");
    }

    #[test]
    fn arrow_steps_stay_in_range() {
        assert_eq!(step_field("58", 59, true), "59");
        assert_eq!(step_field("59", 59, true), "59");
        assert_eq!(step_field("00", 59, false), "00");
        assert_eq!(step_field("", 99, true), "01");
    }

    #[test]
    fn reads_raw_fields() {
        let input = read_fields("1", "xx", "75");
        assert_eq!(input, DurationInput::clamped(1, 0, 59));
        assert!(read_fields("", "", "").is_zero());
    }

    #[test]
    fn serializes_with_short_keys() {
        let json = serde_json::to_string(&DurationInput::clamped(0, 5, 30)).unwrap();
        assert_eq!(json, r#"{"h":0,"m":5,"s":30}"#);
    }
}
