//! Age computation from a date of birth.
//!
//! Customer and staff accounts must belong to adults. Dates are calendar
//! dates with no time zone; callers pass "today" explicitly so results are
//! reproducible in tests.

use chrono::{Datelike, Local, NaiveDate};

/// Minimum age for an account holder.
pub const MIN_ADULT_AGE: u32 = 18;

/// Full years elapsed between `birth` and `today`.
///
/// A year only counts once the birthday has been reached: someone born on
/// 2000-06-15 is 23 on 2024-06-14 and 24 on 2024-06-15. Returns 0 when
/// `birth` is in the future.
///
/// ```
/// use chrono::NaiveDate;
/// use hazel_lab_core::age_on;
///
/// let birth = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
/// let today = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
/// assert_eq!(age_on(birth, today), 23);
/// ```
#[must_use]
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// Whether someone born on `birth` is at least [`MIN_ADULT_AGE`] on `today`.
#[must_use]
pub fn is_adult_on(birth: NaiveDate, today: NaiveDate) -> bool {
    age_on(birth, today) >= MIN_ADULT_AGE
}

/// Today's date in the local time zone.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_before_and_on_birthday() {
        let birth = date(2000, 6, 15);
        assert_eq!(age_on(birth, date(2024, 6, 14)), 23);
        assert_eq!(age_on(birth, date(2024, 6, 15)), 24);
        assert_eq!(age_on(birth, date(2024, 12, 31)), 24);
    }

    #[test]
    fn test_age_earlier_month() {
        assert_eq!(age_on(date(2000, 9, 1), date(2024, 3, 1)), 23);
    }

    #[test]
    fn test_age_future_birth_is_zero() {
        assert_eq!(age_on(date(2030, 1, 1), date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_leap_day_birthday() {
        let birth = date(2004, 2, 29);
        assert_eq!(age_on(birth, date(2022, 2, 28)), 17);
        assert_eq!(age_on(birth, date(2022, 3, 1)), 18);
    }

    #[test]
    fn test_is_adult_boundary() {
        let birth = date(2006, 10, 19);
        assert!(!is_adult_on(birth, date(2024, 10, 18)));
        assert!(is_adult_on(birth, date(2024, 10, 19)));
    }
}
