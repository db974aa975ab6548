use crate::{
    auth::auth::AuthUser,
    model::punch::{GeoPoint, PunchKind, PunchRecord, PunchStatus},
    store::{AppStore, StoreError},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct CreatePunch {
    /// Omitted: alternates automatically (even number of punches so far
    /// today means clock-in, odd means clock-out).
    pub kind: Option<PunchKind>,
    #[schema(example = "traffic on the access road", nullable = true)]
    pub note: Option<String>,
    pub location: Option<GeoPoint>,
    /// Base64 camera snapshot, stored opaquely.
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentKind {
    /// Forgotten badge: inserts an IN/OUT pair at the given times.
    Forgotten,
    DayOff,
    Holiday,
}

#[derive(Deserialize, ToSchema)]
pub struct AdjustmentRequest {
    pub employee_id: String,
    pub kind: AdjustmentKind,
    #[schema(example = "2025-12-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    /// Required for FORGOTTEN.
    #[schema(example = "08:00:00", value_type = Option<String>, format = "time")]
    pub start_time: Option<NaiveTime>,
    /// Required for FORGOTTEN.
    #[schema(example = "18:00:00", value_type = Option<String>, format = "time")]
    pub end_time: Option<NaiveTime>,
    #[schema(example = "badge reader offline")]
    pub reason: String,
}

/// Record a punch for the authenticated employee
#[utoipa::path(
    post,
    path = "/api/v1/punch",
    request_body = CreatePunch,
    responses(
        (status = 201, description = "Punch recorded", body = PunchRecord),
        (status = 400, description = "Special kinds only via adjustment")
    ),
    security(("bearer_auth" = [])),
    tag = "Punch"
)]
pub async fn create_punch(
    auth: AuthUser,
    store: web::Data<AppStore>,
    payload: web::Json<CreatePunch>,
) -> actix_web::Result<impl Responder> {
    if payload.kind.is_some_and(|k| k.is_special()) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Day-off and holiday entries go through the adjustment endpoint"
        })));
    }

    let now = Local::now().naive_local();
    let kind = payload.kind.unwrap_or_else(|| {
        let clocked_today = store
            .punches_for_day(&auth.employee_id, now.date())
            .iter()
            .filter(|p| !p.kind.is_special())
            .count();
        if clocked_today % 2 == 0 {
            PunchKind::In
        } else {
            PunchKind::Out
        }
    });

    let punch = PunchRecord {
        id: Uuid::new_v4().to_string(),
        employee_id: auth.employee_id.clone(),
        timestamp: now,
        kind,
        note: payload.note.clone().filter(|n| !n.trim().is_empty()),
        location: payload.location.clone(),
        photo: payload.photo.clone(),
        status: PunchStatus::Accepted,
    };

    match store.insert_punch(punch.clone()) {
        Ok(()) => {
            info!(employee_id = %auth.employee_id, kind = %kind, "Punch recorded");
            Ok(HttpResponse::Created().json(punch))
        }
        Err(e) => {
            error!(error = %e, employee_id = %auth.employee_id, "Punch failed");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// List the authenticated employee's punches, newest first
#[utoipa::path(
    get,
    path = "/api/v1/punch",
    responses(
        (status = 200, description = "Own punches", body = [PunchRecord])
    ),
    security(("bearer_auth" = [])),
    tag = "Punch"
)]
pub async fn list_my_punches(
    auth: AuthUser,
    store: web::Data<AppStore>,
) -> actix_web::Result<impl Responder> {
    let mut punches = store.punches_for(&auth.employee_id);
    punches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(HttpResponse::Ok().json(punches))
}

/// Manual adjustment: forgotten pair, day off or holiday
#[utoipa::path(
    post,
    path = "/api/v1/punch/adjust",
    request_body = AdjustmentRequest,
    responses(
        (status = 201, description = "Adjustment recorded"),
        (status = 400, description = "Missing times or reason"),
        (status = 404, description = "Employee not found"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Punch"
)]
pub async fn adjust(
    auth: AuthUser,
    store: web::Data<AppStore>,
    payload: web::Json<AdjustmentRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if payload.reason.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "A reason is required for manual entries"
        })));
    }

    if store.get_employee(&payload.employee_id).is_none() {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    let punches = match payload.kind {
        AdjustmentKind::Forgotten => {
            let (start, end) = match (payload.start_time, payload.end_time) {
                (Some(s), Some(e)) => (s, e),
                _ => {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "message": "start_time and end_time are required for a forgotten pair"
                    })));
                }
            };
            vec![
                manual_punch(&payload, PunchKind::In, payload.date.and_time(start)),
                manual_punch(&payload, PunchKind::Out, payload.date.and_time(end)),
            ]
        }
        // Whole-day entries are anchored at noon; only the date matters.
        AdjustmentKind::DayOff => {
            vec![manual_punch(&payload, PunchKind::DayOff, noon(payload.date))]
        }
        AdjustmentKind::Holiday => {
            vec![manual_punch(&payload, PunchKind::Holiday, noon(payload.date))]
        }
    };

    for punch in punches {
        if let Err(e) = store.insert_punch(punch) {
            // Employee existence was checked above; only a concurrent
            // delete can race us here.
            error!(error = %e, employee_id = %payload.employee_id, "Adjustment failed");
            return Ok(match e {
                StoreError::EmployeeNotFound => HttpResponse::NotFound().json(json!({
                    "message": "Employee not found"
                })),
                _ => HttpResponse::InternalServerError().json(json!({
                    "message": "Internal Server Error"
                })),
            });
        }
    }

    info!(employee_id = %payload.employee_id, date = %payload.date, "Manual adjustment recorded");

    Ok(HttpResponse::Created().json(json!({
        "message": "Adjustment recorded"
    })))
}

fn noon(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(12, 0, 0).expect("valid time"))
}

fn manual_punch(
    request: &AdjustmentRequest,
    kind: PunchKind,
    timestamp: NaiveDateTime,
) -> PunchRecord {
    PunchRecord {
        id: Uuid::new_v4().to_string(),
        employee_id: request.employee_id.clone(),
        timestamp,
        kind,
        note: Some(request.reason.clone()),
        location: Some(GeoPoint {
            lat: 0.0,
            lng: 0.0,
            address: Some("Manual entry".to_string()),
            distance: None,
        }),
        photo: None,
        status: PunchStatus::Accepted,
    }
}
