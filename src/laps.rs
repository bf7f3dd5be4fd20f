//! Append-only lap log for the stopwatch.

use std::time::Duration;

/// One row of the lap list as the UI shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapRow {
    /// 1-based lap number.
    pub number: usize,
    /// Time since the previous lap mark.
    pub split: Duration,
    /// Elapsed time at the moment the lap was taken.
    pub total: Duration,
}

/// Ordered lap marks, each the elapsed time captured when the lap was taken.
///
/// Marks are only ever appended or cleared all at once. Since marks come from a
/// running count-up engine they are non-decreasing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LapRecorder {
    marks: Vec<Duration>,
}

impl LapRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: Duration) {
        debug_assert!(
            self.marks.last().map_or(true, |last| *last <= value),
            "lap marks must be non-decreasing"
        );
        self.marks.push(value);
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    pub fn marks(&self) -> &[Duration] {
        &self.marks
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Delta of each mark from the one before it. The first split is the first mark.
    pub fn splits(&self) -> impl Iterator<Item = Duration> + '_ {
        self.marks.iter().scan(Duration::ZERO, |previous, &mark| {
            let split = mark.saturating_sub(*previous);
            *previous = mark;
            Some(split)
        })
    }

    /// Display rows with the newest lap first.
    pub fn rows_newest_first(&self) -> Vec<LapRow> {
        let mut rows: Vec<LapRow> = self
            .marks
            .iter()
            .zip(self.splits())
            .enumerate()
            .map(|(idx, (&total, split))| LapRow {
                number: idx + 1,
                split,
                total,
            })
            .collect();
        rows.reverse();
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn splits_are_deltas_between_marks() {
        let mut laps = LapRecorder::new();
        for mark in [1200, 3400, 3400] {
            laps.record(ms(mark));
        }
        let splits: Vec<_> = laps.splits().collect();
        assert_eq!(splits, vec![ms(1200), ms(2200), ms(0)]);
    }

    #[test]
    fn rows_are_numbered_and_newest_first() {
        let mut laps = LapRecorder::new();
        laps.record(ms(5000));
        laps.record(ms(7500));

        let rows = laps.rows_newest_first();
        assert_eq!(
            rows,
            vec![
                LapRow { number: 2, split: ms(2500), total: ms(7500) },
                LapRow { number: 1, split: ms(5000), total: ms(5000) },
            ]
        );
    }

    #[test]
    fn clear_empties_everything() {
        let mut laps = LapRecorder::new();
        laps.record(ms(10));
        laps.clear();
        assert!(laps.is_empty());
        assert_eq!(laps.splits().count(), 0);
        assert!(laps.rows_newest_first().is_empty());
    }
}
