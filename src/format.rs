//! Readout formatting. Everything is truncated to 10 ms.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub centis: u64,
}

impl TimeParts {
    pub fn from_duration(d: Duration) -> Self {
        let total_secs = d.as_secs();
        Self {
            hours: total_secs / 3600,
            minutes: (total_secs % 3600) / 60,
            seconds: total_secs % 60,
            centis: u64::from(d.subsec_millis() / 10),
        }
    }

    /// `HH:MM:SS` without the fraction.
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }

    /// Two-digit hundredths of a second.
    pub fn centis(&self) -> String {
        format!("{:02}", self.centis)
    }
}

/// Stopwatch readout, lap split and lap total: `HH:MM:SS.cc`.
pub fn format_stopwatch(d: Duration) -> String {
    let parts = TimeParts::from_duration(d);
    format!("{}.{}", parts.clock(), parts.centis())
}

/// Countdown readout: `HH:MM:SS`.
pub fn format_countdown(d: Duration) -> String {
    TimeParts::from_duration(d).clock()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopwatch_truncates_to_hundredths() {
        assert_eq!(format_stopwatch(Duration::ZERO), "00:00:00.00");
        assert_eq!(format_stopwatch(Duration::from_millis(1_239)), "00:00:01.23");
        assert_eq!(format_stopwatch(Duration::from_millis(3_723_990)), "01:02:03.99");
    }

    #[test]
    fn countdown_drops_the_fraction() {
        assert_eq!(format_countdown(Duration::from_millis(59_999)), "00:00:59");
        assert_eq!(format_countdown(Duration::from_millis(60_000)), "00:01:00");
    }

    #[test]
    fn hours_do_not_wrap() {
        let d = Duration::from_secs(123 * 3600 + 4);
        assert_eq!(format_countdown(d), "123:00:04");
    }
}
