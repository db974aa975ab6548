use crate::api::backup::BackupFile;
use crate::api::employee::{
    CreateEmployee, EmployeeListResponse, EmployeeResponse, UpdateEmployee,
};
use crate::api::punch::{AdjustmentKind, AdjustmentRequest, CreatePunch};
use crate::api::report::{CardDay, EmployeeMonthSummary, PresenceStatus, SheetResponse};
use crate::auth::handlers::LoginResponse;
use crate::model::employee::Employee;
use crate::model::punch::{GeoPoint, PunchKind, PunchRecord, PunchStatus};
use crate::model::role::Role;
use crate::models::LoginReqDto;
use crate::timesheet::{DailyBalance, DayClass, MonthReport, PeriodSummary};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ponto Eletrônico API",
        version = "1.0.0",
        description = r#"
## Ponto Eletrônico — employee time clock

This API powers a browser-based **time clock** for a small company.

### 🔹 Key Features
- **Punch capture**
  - Clock in/out with automatic IN/OUT alternation, optional photo and location
- **Monthly sheets**
  - Day-by-day balance against the expected schedule, overtime and shortfall totals
- **Manual adjustments**
  - Forgotten punches, days off and holidays entered by the manager
- **Backup**
  - Full JSON export/restore of employees and punches

### 🔐 Security
All endpoints except login are protected with **JWT Bearer authentication**.
Management operations require the **Admin** role.

---
Built with **Rust**, **Actix Web** and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::punch::create_punch,
        crate::api::punch::list_my_punches,
        crate::api::punch::adjust,

        crate::api::report::today,
        crate::api::report::card,
        crate::api::report::summary,
        crate::api::report::sheet,

        crate::api::backup::export,
        crate::api::backup::restore
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            CreateEmployee,
            UpdateEmployee,
            EmployeeResponse,
            EmployeeListResponse,
            Employee,
            Role,
            CreatePunch,
            AdjustmentKind,
            AdjustmentRequest,
            PunchRecord,
            PunchKind,
            PunchStatus,
            GeoPoint,
            PresenceStatus,
            CardDay,
            EmployeeMonthSummary,
            SheetResponse,
            MonthReport,
            DailyBalance,
            DayClass,
            PeriodSummary,
            BackupFile
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and token management APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Punch", description = "Punch capture and adjustment APIs"),
        (name = "Report", description = "Timesheet report APIs"),
        (name = "Backup", description = "Backup and restore APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
