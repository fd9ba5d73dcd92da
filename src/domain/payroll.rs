use chrono::{Datelike, NaiveDate, Weekday};

/// Provident fund contribution rate applied to basic salary.
pub const PF_RATE: f64 = 0.12;

/// Overtime is paid at double the derived hourly rate.
pub const OVERTIME_MULTIPLIER: f64 = 2.0;

const HOURS_PER_DAY: f64 = 8.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Weekdays (Mon-Fri) in the given month.
pub fn working_days_in_month(year: i32, month: u32) -> i32 {
    let mut days = 0;
    let mut date = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d,
        None => return 0,
    };
    while date.month() == month {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            days += 1;
        }
        date = match date.succ_opt() {
            Some(d) => d,
            None => break,
        };
    }
    days
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayrollBreakdown {
    pub basic_salary: f64,
    pub working_days: i32,
    pub present_days: i32,
    pub overtime_hours: f64,
    pub overtime_amount: f64,
    pub pf_deduction: f64,
    pub lwp_deduction: f64,
    pub net_salary: f64,
}

/// Derives the full monthly pay breakdown. Net salary is always computed
/// here, never trusted from any caller:
/// net = basic + overtime - PF - leave-without-pay.
pub fn compute_payroll(
    basic_salary: f64,
    working_days: i32,
    present_days: i32,
    overtime_hours: f64,
) -> PayrollBreakdown {
    let working_days = working_days.max(1);
    let daily_rate = basic_salary / working_days as f64;
    let hourly_rate = daily_rate / HOURS_PER_DAY;

    let overtime_amount = round2(overtime_hours * hourly_rate * OVERTIME_MULTIPLIER);
    let pf_deduction = round2(basic_salary * PF_RATE);
    let lwp_days = (working_days - present_days).max(0);
    let lwp_deduction = round2(lwp_days as f64 * daily_rate);
    let net_salary = round2(basic_salary + overtime_amount - pf_deduction - lwp_deduction);

    PayrollBreakdown {
        basic_salary,
        working_days,
        present_days,
        overtime_hours,
        overtime_amount,
        pf_deduction,
        lwp_deduction,
        net_salary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_count_for_known_months() {
        // March 2024: 21 weekdays
        assert_eq!(working_days_in_month(2024, 3), 21);
        // February 2024 (leap): 21 weekdays
        assert_eq!(working_days_in_month(2024, 2), 21);
    }

    #[test]
    fn full_attendance_without_overtime() {
        let p = compute_payroll(42000.0, 21, 21, 0.0);
        assert_eq!(p.overtime_amount, 0.0);
        assert_eq!(p.lwp_deduction, 0.0);
        assert_eq!(p.pf_deduction, 5040.0);
        assert_eq!(p.net_salary, 42000.0 - 5040.0);
    }

    #[test]
    fn absent_days_are_deducted() {
        let p = compute_payroll(42000.0, 21, 19, 0.0);
        // two unpaid days at 2000/day
        assert_eq!(p.lwp_deduction, 4000.0);
        assert_eq!(p.net_salary, 42000.0 - 5040.0 - 4000.0);
    }

    #[test]
    fn overtime_is_paid_double_hourly() {
        let p = compute_payroll(42000.0, 21, 21, 4.0);
        // hourly = 42000 / 21 / 8 = 250, doubled = 500
        assert_eq!(p.overtime_amount, 2000.0);
        assert_eq!(p.net_salary, 42000.0 + 2000.0 - 5040.0);
    }

    #[test]
    fn overfull_presence_never_goes_negative_on_lwp() {
        let p = compute_payroll(42000.0, 21, 25, 0.0);
        assert_eq!(p.lwp_deduction, 0.0);
    }
}
