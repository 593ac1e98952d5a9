use chrono::NaiveDate;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid date window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::DomainError;

    #[test]
    fn invalid_window_message_names_both_bounds() {
        let error = DomainError::InvalidWindow {
            start: NaiveDate::from_ymd_opt(2026, 2, 10).expect("date"),
            end: NaiveDate::from_ymd_opt(2026, 2, 1).expect("date"),
        };
        let message = error.to_string();
        assert!(message.contains("2026-02-10"));
        assert!(message.contains("2026-02-01"));
    }
}
