use crate::model::punch::{PunchKind, PunchRecord};
use crate::timesheet::policy::WorkSchedule;
use chrono::{Days, Months, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 1.2-minute tolerance around the daily target so clock jitter is not
/// flagged as overtime or delay.
const DEAD_ZONE_SECONDS: i64 = 72;

#[derive(Debug, derive_more::Display)]
pub enum TimesheetError {
    #[display(fmt = "invalid period: start {} is after end {}", start, end)]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },
    #[display(fmt = "invalid month: {}-{:02}", year, month)]
    InvalidMonth { year: i32, month: u32 },
}

impl std::error::Error for TimesheetError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayClass {
    /// Expected working day with no punches at all.
    NoRecord,
    /// Day carrying a `DAY_OFF` or `HOLIDAY` punch; excluded from hour math.
    Special,
    OnTarget,
    Overtime,
    Shortfall,
}

/// One calendar day of one employee's sheet. Derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyBalance {
    #[schema(example = "2025-12-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "Mon")]
    pub day_of_week: String,

    pub expected_minutes: u32,
    pub worked_minutes: i64,

    /// Signed difference to the target; zero unless the day is classified
    /// `OVERTIME` (positive) or `SHORTFALL` (negative).
    pub balance_minutes: i64,

    pub class: DayClass,

    /// Which override kind made the day `SPECIAL`, when it is.
    pub special: Option<PunchKind>,

    #[schema(value_type = Option<String>, format = "time")]
    pub first_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>, format = "time")]
    pub last_out: Option<NaiveTime>,

    pub punch_count: usize,

    /// Odd number of clock events that day; the sheet prints an
    /// "incomplete journey" warning next to such days.
    pub incomplete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PeriodSummary {
    pub total_overtime_minutes: i64,
    pub total_shortfall_minutes: i64,
    /// Expected working days with zero punches and no special status.
    pub absence_days: usize,
    /// Days with at least one punch that are not special.
    pub days_present: usize,
}

/// A full month of daily balances plus their rollup.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthReport {
    pub days: Vec<DailyBalance>,
    pub summary: PeriodSummary,
}

/// Classify one calendar day from that day's punches. Pure and total:
/// malformed data (unmatched or out-of-order punches) degrades to zero
/// contribution, never to an error.
pub fn compute_daily_balance(
    date: NaiveDate,
    punches: &[PunchRecord],
    schedule: &WorkSchedule,
) -> DailyBalance {
    let expected_minutes = schedule.expected_minutes(date);
    let day_of_week = date.format("%a").to_string();

    let mut balance = DailyBalance {
        date,
        day_of_week,
        expected_minutes,
        worked_minutes: 0,
        balance_minutes: 0,
        class: DayClass::NoRecord,
        special: None,
        first_in: None,
        last_out: None,
        punch_count: punches.len(),
        incomplete: false,
    };

    // Any whole-day override wins, regardless of what else was punched.
    if let Some(special) = punches.iter().find(|p| p.kind.is_special()) {
        balance.class = DayClass::Special;
        balance.special = Some(special.kind);
        return balance;
    }

    if punches.is_empty() {
        return balance;
    }

    let mut ins: Vec<&PunchRecord> = punches.iter().filter(|p| p.kind == PunchKind::In).collect();
    let mut outs: Vec<&PunchRecord> = punches.iter().filter(|p| p.kind == PunchKind::Out).collect();
    ins.sort_by_key(|p| p.timestamp);
    outs.sort_by_key(|p| p.timestamp);

    // Positional pairing: k-th IN with k-th OUT. A pair whose OUT precedes
    // its IN contributes zero, as does any unmatched trailing punch.
    let mut worked_secs: i64 = 0;
    for (punch_in, punch_out) in ins.iter().zip(outs.iter()) {
        let delta = (punch_out.timestamp - punch_in.timestamp).num_seconds();
        worked_secs += delta.max(0);
    }

    balance.first_in = ins.first().map(|p| p.timestamp.time());
    balance.last_out = outs.last().map(|p| p.timestamp.time());
    balance.incomplete = (ins.len() + outs.len()) % 2 != 0;
    balance.worked_minutes = (worked_secs + 30) / 60;

    let diff_secs = worked_secs - i64::from(expected_minutes) * 60;
    if diff_secs > DEAD_ZONE_SECONDS {
        balance.class = DayClass::Overtime;
        balance.balance_minutes = round_minutes(diff_secs);
    } else if diff_secs < -DEAD_ZONE_SECONDS && expected_minutes > 0 {
        balance.class = DayClass::Shortfall;
        balance.balance_minutes = round_minutes(diff_secs);
    } else {
        balance.class = DayClass::OnTarget;
    }

    balance
}

fn round_minutes(secs: i64) -> i64 {
    if secs >= 0 {
        (secs + 30) / 60
    } else {
        -((-secs + 30) / 60)
    }
}

/// Roll a sequence of daily balances up into period totals. Commutative
/// reduction; an empty slice yields the all-zero summary.
pub fn compute_period_summary(days: &[DailyBalance]) -> PeriodSummary {
    let mut summary = PeriodSummary::default();
    for day in days {
        match day.class {
            DayClass::Overtime => summary.total_overtime_minutes += day.balance_minutes,
            DayClass::Shortfall => summary.total_shortfall_minutes += -day.balance_minutes,
            DayClass::NoRecord if day.expected_minutes > 0 => summary.absence_days += 1,
            _ => {}
        }
        if day.punch_count > 0 && day.class != DayClass::Special {
            summary.days_present += 1;
        }
    }
    summary
}

/// One balance per calendar day in `[start, end]`, in order. Punches
/// outside the window are ignored; the full day grid is always produced
/// so that absences are detectable.
pub fn period_sheet(
    start: NaiveDate,
    end: NaiveDate,
    punches: &[PunchRecord],
    schedule: &WorkSchedule,
) -> Result<Vec<DailyBalance>, TimesheetError> {
    if start > end {
        return Err(TimesheetError::InvalidPeriod { start, end });
    }

    let days = start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| {
            let day_punches: Vec<PunchRecord> = punches
                .iter()
                .filter(|p| p.timestamp.date() == day)
                .cloned()
                .collect();
            compute_daily_balance(day, &day_punches, schedule)
        })
        .collect();

    Ok(days)
}

/// Full-month sheet plus summary for one employee's punches.
pub fn month_report(
    year: i32,
    month: u32,
    punches: &[PunchRecord],
    schedule: &WorkSchedule,
) -> Result<MonthReport, TimesheetError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(TimesheetError::InvalidMonth { year, month })?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .ok_or(TimesheetError::InvalidMonth { year, month })?;

    let days = period_sheet(first, last, punches, schedule)?;
    let summary = compute_period_summary(&days);
    Ok(MonthReport { days, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::punch::PunchStatus;
    use chrono::NaiveDateTime;
    use rstest::rstest;

    fn punch(kind: PunchKind, stamp: &str) -> PunchRecord {
        PunchRecord {
            id: uuid::Uuid::new_v4().to_string(),
            employee_id: "emp-1".into(),
            timestamp: NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M:%S").unwrap(),
            kind,
            note: None,
            location: None,
            photo: None,
            status: PunchStatus::Accepted,
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
    }

    #[test]
    fn empty_working_day_is_no_record() {
        let day = compute_daily_balance(monday(), &[], &WorkSchedule::default());
        assert_eq!(day.class, DayClass::NoRecord);
        assert_eq!(day.worked_minutes, 0);
        assert_eq!(day.expected_minutes, 480);
    }

    #[test]
    fn empty_sunday_is_no_record_but_never_shortfall_or_absence() {
        let sunday = NaiveDate::from_ymd_opt(2025, 12, 7).unwrap();
        let day = compute_daily_balance(sunday, &[], &WorkSchedule::default());
        assert_eq!(day.class, DayClass::NoRecord);
        assert_eq!(day.expected_minutes, 0);

        let summary = compute_period_summary(&[day]);
        assert_eq!(summary.absence_days, 0);
    }

    #[test]
    fn special_punch_overrides_everything_else_that_day() {
        let punches = vec![
            punch(PunchKind::In, "2025-12-01T08:00:00"),
            punch(PunchKind::Holiday, "2025-12-01T12:00:00"),
            punch(PunchKind::Out, "2025-12-01T17:00:00"),
        ];
        let day = compute_daily_balance(monday(), &punches, &WorkSchedule::default());
        assert_eq!(day.class, DayClass::Special);
        assert_eq!(day.special, Some(PunchKind::Holiday));
        assert_eq!(day.worked_minutes, 0);
        assert_eq!(day.balance_minutes, 0);
    }

    #[test]
    fn positional_pairing_matches_kth_in_with_kth_out() {
        // Two overlapping-looking pairs still sum to a full 8h day.
        let punches = vec![
            punch(PunchKind::In, "2025-12-01T08:00:00"),
            punch(PunchKind::In, "2025-12-01T13:00:00"),
            punch(PunchKind::Out, "2025-12-01T12:00:00"),
            punch(PunchKind::Out, "2025-12-01T17:00:00"),
        ];
        let day = compute_daily_balance(monday(), &punches, &WorkSchedule::default());
        assert_eq!(day.worked_minutes, 480);
        assert_eq!(day.class, DayClass::OnTarget);
        assert_eq!(day.balance_minutes, 0);
    }

    #[test]
    fn weekday_overtime() {
        let punches = vec![
            punch(PunchKind::In, "2025-12-01T08:00:00"),
            punch(PunchKind::Out, "2025-12-01T19:00:00"),
        ];
        let day = compute_daily_balance(monday(), &punches, &WorkSchedule::default());
        assert_eq!(day.class, DayClass::Overtime);
        assert_eq!(day.worked_minutes, 660);
        assert_eq!(day.balance_minutes, 180);
    }

    #[test]
    fn weekday_shortfall_stores_signed_negative_balance() {
        let punches = vec![
            punch(PunchKind::In, "2025-12-01T08:00:00"),
            punch(PunchKind::Out, "2025-12-01T11:00:00"),
        ];
        let day = compute_daily_balance(monday(), &punches, &WorkSchedule::default());
        assert_eq!(day.class, DayClass::Shortfall);
        assert_eq!(day.worked_minutes, 180);
        assert_eq!(day.balance_minutes, -300);
    }

    #[test]
    fn unmatched_trailing_in_contributes_nothing() {
        let punches = vec![punch(PunchKind::In, "2025-12-01T08:00:00")];
        let day = compute_daily_balance(monday(), &punches, &WorkSchedule::default());
        assert_eq!(day.worked_minutes, 0);
        assert_eq!(day.class, DayClass::Shortfall);
        assert_eq!(day.balance_minutes, -480);
        assert!(day.incomplete);
    }

    #[test]
    fn out_before_its_in_contributes_zero_not_negative_time() {
        let punches = vec![
            punch(PunchKind::In, "2025-12-01T14:00:00"),
            punch(PunchKind::Out, "2025-12-01T08:00:00"),
        ];
        let day = compute_daily_balance(monday(), &punches, &WorkSchedule::default());
        assert_eq!(day.worked_minutes, 0);
    }

    #[rstest]
    #[case(481, DayClass::OnTarget)] // inside the 1.2-minute dead zone
    #[case(479, DayClass::OnTarget)]
    #[case(483, DayClass::Overtime)]
    #[case(477, DayClass::Shortfall)]
    fn dead_zone_absorbs_clock_jitter(#[case] worked_minutes: u32, #[case] expected: DayClass) {
        let out_stamp = format!(
            "2025-12-01T{:02}:{:02}:00",
            8 + worked_minutes / 60,
            worked_minutes % 60
        );
        let punches = vec![
            punch(PunchKind::In, "2025-12-01T08:00:00"),
            punch(PunchKind::Out, &out_stamp),
        ];
        let day = compute_daily_balance(monday(), &punches, &WorkSchedule::default());
        assert_eq!(day.class, expected);
    }

    #[test]
    fn result_is_independent_of_input_order_and_repeatable() {
        let mut punches = vec![
            punch(PunchKind::Out, "2025-12-01T17:00:00"),
            punch(PunchKind::In, "2025-12-01T13:00:00"),
            punch(PunchKind::Out, "2025-12-01T12:00:00"),
            punch(PunchKind::In, "2025-12-01T08:00:00"),
        ];
        let shuffled = compute_daily_balance(monday(), &punches, &WorkSchedule::default());
        punches.reverse();
        let reversed = compute_daily_balance(monday(), &punches, &WorkSchedule::default());
        let again = compute_daily_balance(monday(), &punches, &WorkSchedule::default());

        assert_eq!(shuffled.worked_minutes, reversed.worked_minutes);
        assert_eq!(shuffled.class, reversed.class);
        assert_eq!(reversed.worked_minutes, again.worked_minutes);
        assert_eq!(reversed.class, again.class);
    }

    #[test]
    fn period_summary_totals_overtime_shortfall_and_absences() {
        let schedule = WorkSchedule::default();
        let mut punches = Vec::new();
        // Mon +60m, Tue +90m, Wed -120m; Thu/Fri and the following
        // Mon absent; every other working day on target.
        punches.push(punch(PunchKind::In, "2025-12-01T08:00:00"));
        punches.push(punch(PunchKind::Out, "2025-12-01T17:00:00"));
        punches.push(punch(PunchKind::In, "2025-12-02T08:00:00"));
        punches.push(punch(PunchKind::Out, "2025-12-02T17:30:00"));
        punches.push(punch(PunchKind::In, "2025-12-03T08:00:00"));
        punches.push(punch(PunchKind::Out, "2025-12-03T14:00:00"));
        for day in [9, 10, 11, 12, 15, 16, 17, 18, 19, 22, 23, 24, 25, 26, 29, 30, 31] {
            punches.push(punch(PunchKind::In, &format!("2025-12-{day:02}T08:00:00")));
            punches.push(punch(PunchKind::Out, &format!("2025-12-{day:02}T16:00:00")));
        }
        for day in [6, 13, 20, 27] {
            punches.push(punch(PunchKind::In, &format!("2025-12-{day:02}T08:00:00")));
            punches.push(punch(PunchKind::Out, &format!("2025-12-{day:02}T12:00:00")));
        }

        let report = month_report(2025, 12, &punches, &schedule).unwrap();
        assert_eq!(report.days.len(), 31);
        assert_eq!(report.summary.total_overtime_minutes, 150);
        assert_eq!(report.summary.total_shortfall_minutes, 120);
        assert_eq!(report.summary.absence_days, 3);
        assert_eq!(report.summary.days_present, 24);
    }

    #[test]
    fn empty_input_yields_all_zero_summary() {
        assert_eq!(compute_period_summary(&[]), PeriodSummary::default());
    }

    #[test]
    fn period_sheet_produces_one_entry_per_day_and_ignores_out_of_range_punches() {
        let punches = vec![
            punch(PunchKind::In, "2025-11-30T08:00:00"),
            punch(PunchKind::In, "2025-12-02T08:00:00"),
            punch(PunchKind::Out, "2025-12-02T17:00:00"),
        ];
        let start = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 12, 7).unwrap();
        let days = period_sheet(start, end, &punches, &WorkSchedule::default()).unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].class, DayClass::NoRecord);
        assert_eq!(days[1].punch_count, 2);
    }

    #[test]
    fn inverted_period_fails_fast() {
        let start = NaiveDate::from_ymd_opt(2025, 12, 7).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let err = period_sheet(start, end, &[], &WorkSchedule::default()).unwrap_err();
        assert!(matches!(err, TimesheetError::InvalidPeriod { .. }));
    }

    #[test]
    fn month_13_is_rejected() {
        let err = month_report(2025, 13, &[], &WorkSchedule::default()).unwrap_err();
        assert!(matches!(err, TimesheetError::InvalidMonth { .. }));
    }
}
