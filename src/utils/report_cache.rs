use crate::store::AppStore;
use crate::timesheet::{self, MonthReport, TimesheetError, WorkSchedule};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;

/// Memo of monthly reports keyed on (employee, year, month, store
/// version). The version component means a store mutation simply strands
/// the old entries; TTL and capacity reclaim them.
static REPORT_CACHE: Lazy<Cache<(String, i32, u32, u64), Arc<MonthReport>>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(3600))
        .build()
});

/// Compute (or fetch) one employee's month report. Aggregation errors
/// come from bad caller input and are never cached.
pub async fn month_report_cached(
    store: &AppStore,
    employee_id: &str,
    year: i32,
    month: u32,
    schedule: &WorkSchedule,
) -> Result<Arc<MonthReport>, TimesheetError> {
    let key = (employee_id.to_string(), year, month, store.version());

    if let Some(hit) = REPORT_CACHE.get(&key).await {
        return Ok(hit);
    }

    let punches = store.punches_for(employee_id);
    let report = Arc::new(timesheet::month_report(year, month, &punches, schedule)?);
    REPORT_CACHE.insert(key, report.clone()).await;

    Ok(report)
}
