use chrono::NaiveDate;

/// Inclusive day count of a leave range: both endpoints count, so a
/// single-day leave is 1 day.
pub fn inclusive_days(from_date: NaiveDate, to_date: NaiveDate) -> i64 {
    (to_date - from_date).num_days() + 1
}

/// Remaining balance is always derived from allocated and used, never stored
/// as an independent source of truth.
pub fn remaining_days(allocated_days: i32, used_days: i32) -> i32 {
    allocated_days - used_days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn three_day_range_is_inclusive() {
        assert_eq!(inclusive_days(d(2024, 3, 1), d(2024, 3, 3)), 3);
    }

    #[test]
    fn single_day_leave_counts_one() {
        assert_eq!(inclusive_days(d(2024, 3, 1), d(2024, 3, 1)), 1);
    }

    #[test]
    fn range_across_month_boundary() {
        assert_eq!(inclusive_days(d(2024, 2, 28), d(2024, 3, 2)), 4);
    }

    #[test]
    fn remaining_is_allocated_minus_used() {
        assert_eq!(remaining_days(20, 0), 20);
        assert_eq!(remaining_days(20, 5), 15);
        assert_eq!(remaining_days(5, 7), -2);
    }
}
