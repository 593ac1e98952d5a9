use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Inclusive calendar-day window every report is scoped to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, counting both endpoints.
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    /// The immediately preceding window of identical length: no gap, no
    /// overlap. `[d, d+6]` yields `[d-7, d-1]`.
    pub fn previous(&self) -> Self {
        let length = self.day_count();
        let end = self.start - Duration::days(1);
        let start = end - Duration::days(length - 1);
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::DateWindow;
    use crate::errors::DomainError;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).expect("valid date")
    }

    #[test]
    fn rejects_inverted_bounds() {
        let error = DateWindow::new(day(10), day(9)).expect_err("start after end");
        assert!(matches!(error, DomainError::InvalidWindow { .. }));
    }

    #[test]
    fn single_day_window_has_day_count_one() {
        let window = DateWindow::new(day(5), day(5)).expect("window");
        assert_eq!(window.day_count(), 1);
        assert!(window.contains(day(5)));
        assert!(!window.contains(day(6)));
    }

    #[test]
    fn previous_window_is_adjacent_and_equal_length() {
        let window = DateWindow::new(day(8), day(14)).expect("window");
        let previous = window.previous();
        assert_eq!(previous.start(), day(1));
        assert_eq!(previous.end(), day(7));
        assert_eq!(previous.day_count(), window.day_count());
    }
}
