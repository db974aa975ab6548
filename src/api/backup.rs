use crate::{
    auth::auth::AuthUser,
    model::{employee::Employee, punch::PunchRecord},
    store::AppStore,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

pub const BACKUP_FORMAT_VERSION: &str = "1.0";

/// Full JSON snapshot of the in-memory state. This is the only
/// persistence mechanism the application has.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct BackupFile {
    #[schema(example = "1.0")]
    pub version: String,
    #[schema(example = "2025-12-01T12:00:00Z")]
    pub timestamp: String,
    pub employees: Vec<Employee>,
    pub punches: Vec<PunchRecord>,
}

/// Export a snapshot of all employees and punches
#[utoipa::path(
    get,
    path = "/api/v1/backup",
    responses(
        (status = 200, description = "Snapshot", body = BackupFile)
    ),
    security(("bearer_auth" = [])),
    tag = "Backup"
)]
pub async fn export(auth: AuthUser, store: web::Data<AppStore>) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let (employees, punches) = store.snapshot();
    info!(
        employees = employees.len(),
        punches = punches.len(),
        "Backup exported"
    );

    Ok(HttpResponse::Ok().json(BackupFile {
        version: BACKUP_FORMAT_VERSION.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        employees,
        punches,
    }))
}

/// Restore a snapshot, replacing all current state
#[utoipa::path(
    post,
    path = "/api/v1/backup",
    request_body = BackupFile,
    responses(
        (status = 200, description = "State replaced"),
        (status = 400, description = "Snapshot missing employees or punches")
    ),
    security(("bearer_auth" = [])),
    tag = "Backup"
)]
pub async fn restore(
    auth: AuthUser,
    store: web::Data<AppStore>,
    payload: web::Json<BackupFile>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let backup = payload.into_inner();
    info!(
        version = %backup.version,
        employees = backup.employees.len(),
        punches = backup.punches.len(),
        "Restoring backup"
    );

    store.replace(backup.employees, backup.punches);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Backup restored"
    })))
}
