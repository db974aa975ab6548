use crate::{
    auth::auth::AuthUser,
    model::punch::{PunchKind, PunchRecord},
    store::AppStore,
    timesheet::{MonthReport, WorkSchedule, format_minutes},
    utils::report_cache,
};
use actix_web::{HttpResponse, Responder, error::ErrorBadRequest, web};
use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct MonthQuery {
    /// Defaults to the current year.
    pub year: Option<i32>,
    /// Defaults to the current month.
    pub month: Option<u32>,
}

impl MonthQuery {
    fn resolve(&self) -> (i32, u32) {
        let today = Local::now().date_naive();
        (
            self.year.unwrap_or_else(|| today.year()),
            self.month.unwrap_or_else(|| today.month()),
        )
    }
}

/// One row of the live presence panel.
#[derive(Serialize, ToSchema)]
pub struct PresenceStatus {
    pub employee_id: String,
    pub name: String,
    pub job_title: String,
    pub has_punched: bool,
    #[schema(value_type = Option<String>, format = "time")]
    pub first_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>, format = "time")]
    pub last_out: Option<NaiveTime>,
    /// Set when the day is overridden by a day off or holiday.
    pub special: Option<PunchKind>,
}

/// One employee's month totals on the extract board.
#[derive(Serialize, ToSchema)]
pub struct EmployeeMonthSummary {
    pub employee_id: String,
    pub name: String,
    pub job_title: String,
    pub total_overtime_minutes: i64,
    pub total_shortfall_minutes: i64,
    #[schema(example = "2h 30m")]
    pub total_overtime: String,
    #[schema(example = "0h 45m")]
    pub total_shortfall: String,
    pub absence_days: usize,
    pub days_present: usize,
}

/// One day on an employee's own monthly card.
#[derive(Serialize, ToSchema)]
pub struct CardDay {
    #[schema(example = "2025-12-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub punches: Vec<PunchRecord>,
    /// Odd number of clock events; shown as "incomplete journey".
    pub incomplete: bool,
}

#[derive(Serialize, ToSchema)]
pub struct SheetResponse {
    pub employee_id: String,
    pub name: String,
    pub job_title: String,
    pub company: String,
    pub year: i32,
    pub month: u32,
    #[schema(inline)]
    pub report: MonthReport,
    pub total_overtime: String,
    pub total_shortfall: String,
}

/// Today's presence snapshot for every employee
#[utoipa::path(
    get,
    path = "/api/v1/report/today",
    responses(
        (status = 200, description = "Presence per employee", body = [PresenceStatus])
    ),
    security(("bearer_auth" = [])),
    tag = "Report"
)]
pub async fn today(auth: AuthUser, store: web::Data<AppStore>) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let today = Local::now().date_naive();
    let statuses: Vec<PresenceStatus> = store
        .list_employees()
        .into_iter()
        .map(|employee| {
            let mut punches = store.punches_for_day(&employee.id, today);
            punches.sort_by_key(|p| p.timestamp);

            let first_in = punches
                .iter()
                .find(|p| p.kind == PunchKind::In)
                .map(|p| p.timestamp.time());
            let last_out = punches
                .iter()
                .rev()
                .find(|p| p.kind == PunchKind::Out)
                .map(|p| p.timestamp.time());
            let special = punches.iter().find(|p| p.kind.is_special()).map(|p| p.kind);

            PresenceStatus {
                employee_id: employee.id,
                name: employee.name,
                job_title: employee.job_title,
                has_punched: !punches.is_empty(),
                first_in,
                last_out,
                special,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(statuses))
}

/// The authenticated employee's own monthly card: punches grouped by
/// day, newest day first
#[utoipa::path(
    get,
    path = "/api/v1/report/card",
    params(
        ("year" = Option<i32>, Query, description = "Year, defaults to current"),
        ("month" = Option<u32>, Query, description = "Month 1-12, defaults to current")
    ),
    responses(
        (status = 200, description = "Own punches grouped by day", body = [CardDay])
    ),
    security(("bearer_auth" = [])),
    tag = "Report"
)]
pub async fn card(
    auth: AuthUser,
    store: web::Data<AppStore>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let (year, month) = query.resolve();

    let mut by_day: BTreeMap<NaiveDate, Vec<PunchRecord>> = BTreeMap::new();
    for punch in store.punches_for(&auth.employee_id) {
        let date = punch.timestamp.date();
        if date.year() == year && date.month() == month {
            by_day.entry(date).or_default().push(punch);
        }
    }

    let days: Vec<CardDay> = by_day
        .into_iter()
        .rev()
        .map(|(date, mut punches)| {
            punches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            let clock_events = punches.iter().filter(|p| !p.kind.is_special()).count();
            CardDay {
                date,
                punches,
                incomplete: clock_events % 2 != 0,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(days))
}

/// Month totals for every employee (the extract board)
#[utoipa::path(
    get,
    path = "/api/v1/report/summary",
    params(
        ("year" = Option<i32>, Query, description = "Year, defaults to current"),
        ("month" = Option<u32>, Query, description = "Month 1-12, defaults to current")
    ),
    responses(
        (status = 200, description = "Totals per employee", body = [EmployeeMonthSummary]),
        (status = 400, description = "Invalid month")
    ),
    security(("bearer_auth" = [])),
    tag = "Report"
)]
pub async fn summary(
    auth: AuthUser,
    store: web::Data<AppStore>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let (year, month) = query.resolve();
    let schedule = WorkSchedule::default();

    let mut rows = Vec::new();
    for employee in store.list_employees() {
        let report = report_cache::month_report_cached(&store, &employee.id, year, month, &schedule)
            .await
            .map_err(|e| ErrorBadRequest(e.to_string()))?;

        rows.push(EmployeeMonthSummary {
            employee_id: employee.id,
            name: employee.name,
            job_title: employee.job_title,
            total_overtime_minutes: report.summary.total_overtime_minutes,
            total_shortfall_minutes: report.summary.total_shortfall_minutes,
            total_overtime: format_minutes(report.summary.total_overtime_minutes),
            total_shortfall: format_minutes(report.summary.total_shortfall_minutes),
            absence_days: report.summary.absence_days,
            days_present: report.summary.days_present,
        });
    }
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(HttpResponse::Ok().json(rows))
}

/// Day-by-day monthly sheet for one employee (the printable mirror)
#[utoipa::path(
    get,
    path = "/api/v1/report/sheet/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee ID"),
        ("year" = Option<i32>, Query, description = "Year, defaults to current"),
        ("month" = Option<u32>, Query, description = "Month 1-12, defaults to current")
    ),
    responses(
        (status = 200, description = "Monthly sheet", body = SheetResponse),
        (status = 400, description = "Invalid month"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Report"
)]
pub async fn sheet(
    auth: AuthUser,
    store: web::Data<AppStore>,
    path: web::Path<String>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_admin(&employee_id)?;

    let employee = match store.get_employee(&employee_id) {
        Some(e) => e,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Employee not found"
            })));
        }
    };

    let (year, month) = query.resolve();
    let report = report_cache::month_report_cached(
        &store,
        &employee.id,
        year,
        month,
        &WorkSchedule::default(),
    )
    .await
    .map_err(|e| ErrorBadRequest(e.to_string()))?;

    Ok(HttpResponse::Ok().json(SheetResponse {
        employee_id: employee.id,
        name: employee.name,
        job_title: employee.job_title,
        company: employee.company,
        year,
        month,
        total_overtime: format_minutes(report.summary.total_overtime_minutes),
        total_shortfall: format_minutes(report.summary.total_shortfall_minutes),
        report: (*report).clone(),
    }))
}
