//! Attendance aggregation: pure functions turning an employee's punches
//! into per-day balances and period totals. No I/O, no shared state.

pub mod aggregate;
pub mod format;
pub mod policy;

pub use aggregate::{
    DailyBalance, DayClass, MonthReport, PeriodSummary, TimesheetError, compute_daily_balance,
    compute_period_summary, month_report, period_sheet,
};
pub use format::format_minutes;
pub use policy::WorkSchedule;
