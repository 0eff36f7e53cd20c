use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::{attendance::AttendanceRecord, profile::UserProfile};

/// Whole hours of one record, split at the 8-hour regular boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitHours {
    pub regular: i64,
    pub overtime: i64,
}

/// Splits a completed record into regular/overtime whole hours.
/// Durations are truncated to whole hours; anything above 8 is overtime.
pub fn split_hours(check_in: NaiveDateTime, check_out: NaiveDateTime) -> SplitHours {
    let hours = (check_out - check_in).num_hours().max(0);

    SplitHours {
        regular: hours.min(8),
        overtime: (hours - 8).max(0),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PayrollLine {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "Sarah Johnson")]
    pub user_name: String,
    #[schema(example = "EMP-001")]
    pub employee_code: String,
    #[schema(example = 160)]
    pub regular_hours: i64,
    #[schema(example = 12)]
    pub overtime_hours: i64,
    #[schema(example = 172)]
    pub total_hours: i64,
    #[schema(example = 18.50)]
    pub hourly_rate: f64,
    #[schema(example = 2960.0)]
    pub regular_pay: f64,
    #[schema(example = 333.0)]
    pub overtime_pay: f64,
    #[schema(example = 3293.0)]
    pub total_pay: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PayrollTotals {
    pub total_pay: f64,
    pub total_hours: i64,
    pub overtime_hours: i64,
    pub employees: usize,
}

/// Per-employee payroll over a set of completed attendance records.
///
/// Every active profile gets a line, including profiles with no records
/// in the period. Records missing either timestamp are skipped.
pub fn compute_payroll(
    records: &[AttendanceRecord],
    profiles: &[UserProfile],
    regular_rate: f64,
    overtime_rate: f64,
) -> Vec<PayrollLine> {
    profiles
        .iter()
        .map(|profile| {
            let mut regular_hours = 0i64;
            let mut overtime_hours = 0i64;

            for record in records.iter().filter(|r| r.user_id == profile.id) {
                if let (Some(check_in), Some(check_out)) =
                    (record.check_in_time, record.check_out_time)
                {
                    let split = split_hours(check_in, check_out);
                    regular_hours += split.regular;
                    overtime_hours += split.overtime;
                }
            }

            let regular_pay = regular_hours as f64 * regular_rate;
            let overtime_pay = overtime_hours as f64 * overtime_rate;

            PayrollLine {
                user_id: profile.id,
                user_name: profile.full_name.clone(),
                employee_code: profile.employee_code.clone(),
                regular_hours,
                overtime_hours,
                total_hours: regular_hours + overtime_hours,
                hourly_rate: regular_rate,
                regular_pay,
                overtime_pay,
                total_pay: regular_pay + overtime_pay,
            }
        })
        .collect()
}

pub fn payroll_totals(lines: &[PayrollLine]) -> PayrollTotals {
    PayrollTotals {
        total_pay: lines.iter().map(|l| l.total_pay).sum(),
        total_hours: lines.iter().map(|l| l.total_hours).sum(),
        overtime_hours: lines.iter().map(|l| l.overtime_hours).sum(),
        employees: lines.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn profile(id: u64, name: &str, code: &str) -> UserProfile {
        UserProfile {
            id,
            employee_code: code.to_string(),
            full_name: name.to_string(),
            email: format!("{}@test.local", code),
            phone: None,
            department: None,
            position: None,
            role: "employee".to_string(),
            is_active: true,
            created_at: None,
        }
    }

    fn record(user_id: u64, day: u32, in_h: u32, out_h: u32) -> AttendanceRecord {
        AttendanceRecord {
            id: 0,
            user_id,
            date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            check_in_time: Some(dt(day, in_h, 0)),
            check_out_time: Some(dt(day, out_h, 0)),
            status: Some("present".to_string()),
            location_lat: None,
            location_lng: None,
            qr_code: None,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn split_preserves_total_and_caps_regular_at_eight() {
        for (start, end) in [(9, 12), (9, 17), (8, 18), (6, 20)] {
            let split = split_hours(dt(2, start, 0), dt(2, end, 0));
            let total = (end - start) as i64;

            assert_eq!(split.regular + split.overtime, total);
            assert!(split.regular <= 8);
            assert!(split.overtime >= 0);
        }
    }

    #[test]
    fn split_truncates_partial_hours() {
        // 8h50m counts as 8 whole hours, all regular.
        let split = split_hours(dt(2, 9, 0), dt(2, 17, 50));
        assert_eq!(split, SplitHours { regular: 8, overtime: 0 });
    }

    #[test]
    fn split_clamps_inverted_interval_to_zero() {
        let split = split_hours(dt(2, 17, 0), dt(2, 9, 0));
        assert_eq!(split, SplitHours { regular: 0, overtime: 0 });
    }

    #[test]
    fn ten_hour_day_pays_default_rates() {
        // 8 x 18.50 + 2 x 27.75 = 203.50
        let profiles = vec![profile(1, "Sarah Johnson", "EMP-001")];
        let records = vec![record(1, 2, 8, 18)];

        let lines = compute_payroll(&records, &profiles, 18.50, 27.75);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].regular_hours, 8);
        assert_eq!(lines[0].overtime_hours, 2);
        assert!((lines[0].total_pay - 203.50).abs() < 1e-9);
    }

    #[test]
    fn accumulates_across_records_and_skips_other_users() {
        let profiles = vec![
            profile(1, "Sarah Johnson", "EMP-001"),
            profile(2, "Mike Chen", "EMP-002"),
        ];
        let records = vec![
            record(1, 2, 9, 17), // 8h regular
            record(1, 3, 9, 19), // 8h regular + 2h overtime
            record(2, 2, 9, 13), // 4h regular
        ];

        let lines = compute_payroll(&records, &profiles, 10.0, 20.0);

        assert_eq!(lines[0].regular_hours, 16);
        assert_eq!(lines[0].overtime_hours, 2);
        assert!((lines[0].total_pay - (16.0 * 10.0 + 2.0 * 20.0)).abs() < 1e-9);
        assert_eq!(lines[1].total_hours, 4);
    }

    #[test]
    fn profile_without_records_gets_a_zero_line() {
        let profiles = vec![profile(1, "Sarah Johnson", "EMP-001")];

        let lines = compute_payroll(&[], &profiles, 18.50, 27.75);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].total_hours, 0);
        assert_eq!(lines[0].total_pay, 0.0);
    }

    #[test]
    fn incomplete_records_are_ignored() {
        let profiles = vec![profile(1, "Sarah Johnson", "EMP-001")];
        let mut open = record(1, 2, 9, 17);
        open.check_out_time = None;

        let lines = compute_payroll(&[open], &profiles, 18.50, 27.75);
        assert_eq!(lines[0].total_hours, 0);
    }

    #[test]
    fn totals_sum_over_lines() {
        let profiles = vec![
            profile(1, "Sarah Johnson", "EMP-001"),
            profile(2, "Mike Chen", "EMP-002"),
        ];
        let records = vec![record(1, 2, 8, 18), record(2, 2, 9, 17)];

        let lines = compute_payroll(&records, &profiles, 18.50, 27.75);
        let totals = payroll_totals(&lines);

        assert_eq!(totals.employees, 2);
        assert_eq!(totals.total_hours, 18);
        assert_eq!(totals.overtime_hours, 2);
        assert!((totals.total_pay - (203.50 + 8.0 * 18.50)).abs() < 1e-9);
    }
}
