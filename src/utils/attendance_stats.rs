use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

/// Late rule applied at check-in: past work start plus the configured
/// threshold counts as late. Without a configured work start everyone
/// is simply present.
pub fn status_for_check_in(
    check_in: NaiveTime,
    work_start: Option<NaiveTime>,
    late_threshold_minutes: u32,
) -> AttendanceStatus {
    match work_start {
        Some(start) => {
            let cutoff = start + Duration::minutes(late_threshold_minutes as i64);
            if check_in > cutoff {
                AttendanceStatus::Late
            } else {
                AttendanceStatus::Present
            }
        }
        None => AttendanceStatus::Present,
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WeeklyBucket {
    /// Week-start label, e.g. "Jun 01" (weeks start on Sunday).
    #[schema(example = "Jun 01")]
    pub week: String,
    pub present: u32,
    pub late: u32,
    pub absent: u32,
}

/// Buckets records by week start. Statuses other than
/// present/late/absent are counted nowhere, matching the report chart.
pub fn weekly_breakdown(records: &[AttendanceRecord]) -> Vec<WeeklyBucket> {
    let mut buckets: BTreeMap<chrono::NaiveDate, (u32, u32, u32)> = BTreeMap::new();

    for record in records {
        let week_start =
            record.date - Duration::days(record.date.weekday().num_days_from_sunday() as i64);
        let entry = buckets.entry(week_start).or_default();

        match record.status.as_deref() {
            Some("present") => entry.0 += 1,
            Some("late") => entry.1 += 1,
            Some("absent") => entry.2 += 1,
            _ => {}
        }
    }

    buckets
        .into_iter()
        .map(|(week_start, (present, late, absent))| WeeklyBucket {
            week: week_start.format("%b %d").to_string(),
            present,
            late,
            absent,
        })
        .collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCount {
    #[schema(example = "present")]
    pub status: String,
    pub count: u32,
}

pub fn status_breakdown(records: &[AttendanceRecord]) -> Vec<StatusCount> {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();

    for record in records {
        if let Some(status) = &record.status {
            *counts.entry(status.clone()).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportTotals {
    pub total: usize,
    pub present: u32,
    pub late: u32,
    pub absent: u32,
    /// Percent of records marked present, one decimal.
    #[schema(example = 87.5)]
    pub present_rate: f64,
}

pub fn report_totals(records: &[AttendanceRecord]) -> ReportTotals {
    let count = |s: &str| records.iter().filter(|r| r.status.as_deref() == Some(s)).count() as u32;

    let total = records.len();
    let present = count("present");

    let present_rate = if total > 0 {
        (present as f64 / total as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    ReportTotals {
        total,
        present,
        late: count("late"),
        absent: count("absent"),
        present_rate,
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    /// Checked in, not yet checked out.
    pub currently_checked_in: u32,
    pub late_today: u32,
    /// Active profiles minus profiles with any record today.
    pub absent_today: u32,
    /// Fractional hours; open records are bounded by "now".
    pub total_hours: f64,
    pub overtime_hours: f64,
    pub regular_pay_estimate: f64,
    pub overtime_pay_estimate: f64,
    pub total_pay_estimate: f64,
}

/// Same-day aggregates. Recomputed from scratch on every fetch; an open
/// record contributes hours up to `now`.
pub fn summarize_today(
    records: &[AttendanceRecord],
    active_profiles: u32,
    now: NaiveDateTime,
    regular_rate: f64,
    overtime_rate: f64,
) -> DashboardSummary {
    let mut checked_in = 0u32;
    let mut late = 0u32;
    let mut regular_hours = 0.0f64;
    let mut overtime_hours = 0.0f64;

    for record in records {
        let check_in = match record.check_in_time {
            Some(t) => t,
            None => continue,
        };

        if record.check_out_time.is_none() {
            checked_in += 1;
        }
        if record.status.as_deref() == Some("late") {
            late += 1;
        }

        let end = record.check_out_time.unwrap_or(now);
        let hours = ((end - check_in).num_minutes().max(0) as f64) / 60.0;

        regular_hours += hours.min(8.0);
        overtime_hours += (hours - 8.0).max(0.0);
    }

    let absent = active_profiles.saturating_sub(records.len() as u32);

    let regular_pay_estimate = regular_hours * regular_rate;
    let overtime_pay_estimate = overtime_hours * overtime_rate;

    DashboardSummary {
        currently_checked_in: checked_in,
        late_today: late,
        absent_today: absent,
        total_hours: regular_hours + overtime_hours,
        overtime_hours,
        regular_pay_estimate,
        overtime_pay_estimate,
        total_pay_estimate: regular_pay_estimate + overtime_pay_estimate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn rec(
        user_id: u64,
        day: u32,
        status: &str,
        check_in: Option<(u32, u32)>,
        check_out: Option<(u32, u32)>,
    ) -> AttendanceRecord {
        let date = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        AttendanceRecord {
            id: 0,
            user_id,
            date,
            check_in_time: check_in.map(|(h, m)| date.and_hms_opt(h, m, 0).unwrap()),
            check_out_time: check_out.map(|(h, m)| date.and_hms_opt(h, m, 0).unwrap()),
            status: Some(status.to_string()),
            location_lat: None,
            location_lng: None,
            qr_code: None,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn check_in_before_cutoff_is_present() {
        assert_eq!(
            status_for_check_in(t(9, 10), Some(t(9, 0)), 15),
            AttendanceStatus::Present
        );
        // exactly at the cutoff still counts as on time
        assert_eq!(
            status_for_check_in(t(9, 15), Some(t(9, 0)), 15),
            AttendanceStatus::Present
        );
    }

    #[test]
    fn check_in_past_cutoff_is_late() {
        assert_eq!(
            status_for_check_in(t(9, 16), Some(t(9, 0)), 15),
            AttendanceStatus::Late
        );
    }

    #[test]
    fn no_work_start_means_present() {
        assert_eq!(
            status_for_check_in(t(14, 0), None, 15),
            AttendanceStatus::Present
        );
    }

    #[test]
    fn weekly_breakdown_buckets_by_sunday_week_start() {
        // 2025-06-01 is a Sunday; 2025-06-08 starts the next week.
        let records = vec![
            rec(1, 2, "present", None, None),
            rec(2, 3, "late", None, None),
            rec(1, 9, "present", None, None),
        ];

        let weeks = weekly_breakdown(&records);

        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].week, "Jun 01");
        assert_eq!(weeks[0].present, 1);
        assert_eq!(weeks[0].late, 1);
        assert_eq!(weeks[1].week, "Jun 08");
        assert_eq!(weeks[1].present, 1);
    }

    #[test]
    fn status_breakdown_counts_each_status() {
        let records = vec![
            rec(1, 2, "present", None, None),
            rec(2, 2, "present", None, None),
            rec(3, 2, "half_day", None, None),
        ];

        let counts = status_breakdown(&records);

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].status, "half_day");
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts[1].status, "present");
        assert_eq!(counts[1].count, 2);
    }

    #[test]
    fn report_totals_compute_present_rate() {
        let records = vec![
            rec(1, 2, "present", None, None),
            rec(2, 2, "present", None, None),
            rec(3, 2, "present", None, None),
            rec(4, 2, "late", None, None),
        ];

        let totals = report_totals(&records);

        assert_eq!(totals.total, 4);
        assert_eq!(totals.present, 3);
        assert_eq!(totals.late, 1);
        assert_eq!(totals.present_rate, 75.0);
    }

    #[test]
    fn empty_report_has_zero_rate() {
        assert_eq!(report_totals(&[]).present_rate, 0.0);
    }

    #[test]
    fn dashboard_bounds_open_records_by_now() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();

        let records = vec![
            rec(1, 2, "present", Some((9, 0)), None),       // open: 6h so far
            rec(2, 2, "late", Some((8, 0)), Some((18, 0))), // closed: 10h
        ];

        let summary = summarize_today(&records, 5, now, 10.0, 20.0);

        assert_eq!(summary.currently_checked_in, 1);
        assert_eq!(summary.late_today, 1);
        // 5 active, 2 with records today
        assert_eq!(summary.absent_today, 3);
        assert!((summary.total_hours - 16.0).abs() < 1e-9);
        assert!((summary.overtime_hours - 2.0).abs() < 1e-9);
        // 14h regular * 10 + 2h overtime * 20
        assert!((summary.total_pay_estimate - 180.0).abs() < 1e-9);
    }

    #[test]
    fn dashboard_ignores_records_without_check_in() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let records = vec![rec(1, 2, "absent", None, None)];
        let summary = summarize_today(&records, 2, now, 10.0, 20.0);

        assert_eq!(summary.currently_checked_in, 0);
        assert_eq!(summary.total_hours, 0.0);
        // the absent record still counts as "has a record today"
        assert_eq!(summary.absent_today, 1);
    }
}
