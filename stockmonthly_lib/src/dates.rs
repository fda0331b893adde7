//! Which monthly snapshots a run covers.

use std::fmt;

use chrono::Datelike;

/// A (year, month) pair naming one monthly snapshot.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetDate {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl TargetDate {
    /// First month for which snapshots exist.
    pub const EPOCH: TargetDate = TargetDate {
        year: 2021,
        month: 6,
    };

    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The month containing `date`.
    pub fn of(date: &impl Datelike) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month.
    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for TargetDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Months to process for a run happening at `now`.
///
/// With `only_current_month` this is just the month containing `now`.
/// Otherwise it is every month from [`TargetDate::EPOCH`] up to, but not
/// including, the month containing `now`, oldest first.
pub fn target_dates(only_current_month: bool, now: impl Datelike) -> Vec<TargetDate> {
    let current = TargetDate::of(&now);
    if only_current_month {
        return vec![current];
    }

    let mut dates = Vec::new();
    let mut cursor = TargetDate::EPOCH;
    while cursor < current {
        dates.push(cursor);
        cursor = cursor.next();
    }
    dates
}
