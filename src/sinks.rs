//! Output seams the controllers talk to.

use crate::laps::LapRow;

/// Receives formatted readouts. Knows nothing about timing.
pub trait DisplaySink {
    fn render(&mut self, text: &str);

    /// Lap list, newest first. Sinks without a lap list ignore it.
    fn render_laps(&mut self, _rows: &[LapRow]) {}
}

/// Notified once per countdown completion. How (sound, vibration, announcement)
/// is up to the implementation, which must tolerate any of those being missing.
pub trait AlertSink {
    fn signal_completion(&mut self);
}

/// Sink that keeps everything it was given; handy for tests and headless use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    pub frames: Vec<String>,
    pub laps: Vec<LapRow>,
    pub completions: usize,
}

impl RecordingSink {
    pub fn last(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }
}

impl DisplaySink for RecordingSink {
    fn render(&mut self, text: &str) {
        self.frames.push(text.to_owned());
    }

    fn render_laps(&mut self, rows: &[LapRow]) {
        self.laps = rows.to_vec();
    }
}

impl AlertSink for RecordingSink {
    fn signal_completion(&mut self) {
        self.completions += 1;
    }
}
