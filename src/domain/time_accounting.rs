use chrono::NaiveDateTime;
use derive_more::Display;

/// Hours above which a session starts counting as overtime.
pub const STANDARD_WORKDAY_HOURS: f64 = 8.0;

#[derive(Debug, Display, PartialEq)]
pub enum TimeAccountingError {
    #[display(fmt = "punch-out is earlier than punch-in")]
    PunchOutBeforePunchIn,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkedHours {
    pub working_hours: f64,
    pub overtime_hours: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts a completed punch-in/punch-out pair into working and overtime
/// hours. Working hours are the elapsed time rounded to 2 decimals, overtime
/// is whatever exceeds the standard workday. Out-of-order punches are
/// rejected so a negative duration never reaches the attendance table.
pub fn session_hours(
    punch_in: NaiveDateTime,
    punch_out: NaiveDateTime,
) -> Result<WorkedHours, TimeAccountingError> {
    if punch_out < punch_in {
        return Err(TimeAccountingError::PunchOutBeforePunchIn);
    }

    let elapsed_ms = (punch_out - punch_in).num_milliseconds();
    let working_hours = round2(elapsed_ms as f64 / 3_600_000.0);
    let overtime_hours = round2((working_hours - STANDARD_WORKDAY_HOURS).max(0.0));

    Ok(WorkedHours {
        working_hours,
        overtime_hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn full_day_without_overtime() {
        let worked = session_hours(at(9, 0), at(17, 0)).unwrap();
        assert_eq!(worked.working_hours, 8.0);
        assert_eq!(worked.overtime_hours, 0.0);
    }

    #[test]
    fn overtime_above_eight_hours() {
        let worked = session_hours(at(9, 0), at(19, 30)).unwrap();
        assert_eq!(worked.working_hours, 10.5);
        assert_eq!(worked.overtime_hours, 2.5);
    }

    #[test]
    fn short_session_rounds_to_two_decimals() {
        // 25 minutes = 0.41666.. hours
        let worked = session_hours(at(9, 0), at(9, 25)).unwrap();
        assert_eq!(worked.working_hours, 0.42);
        assert_eq!(worked.overtime_hours, 0.0);
    }

    #[test]
    fn zero_length_session() {
        let worked = session_hours(at(9, 0), at(9, 0)).unwrap();
        assert_eq!(worked.working_hours, 0.0);
        assert_eq!(worked.overtime_hours, 0.0);
    }

    #[test]
    fn punch_out_before_punch_in_is_rejected() {
        assert_eq!(
            session_hours(at(17, 0), at(9, 0)),
            Err(TimeAccountingError::PunchOutBeforePunchIn)
        );
    }
}
