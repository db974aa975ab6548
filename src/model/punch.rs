use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

/// What a single punch means. `In`/`Out` are clock events; `DayOff` and
/// `Holiday` override the whole day and suppress hour math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PunchKind {
    In,
    Out,
    DayOff,
    Holiday,
}

impl PunchKind {
    /// Day-level override kinds; a day holding one of these is excluded
    /// from hour computation entirely.
    pub fn is_special(&self) -> bool {
        matches!(self, PunchKind::DayOff | PunchKind::Holiday)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PunchStatus {
    Accepted,
    Pending,
    Rejected,
}

/// Geolocation captured alongside a punch. Stored as given; the server
/// never resolves or verifies coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    #[schema(example = -12.9718)]
    pub lat: f64,
    #[schema(example = -38.5011)]
    pub lng: f64,
    #[schema(example = "Bahia, Brasil", nullable = true)]
    pub address: Option<String>,
    /// Distance in meters from the registered workplace, if the client computed one.
    pub distance: Option<f64>,
}

/// One clock event for one employee at one instant. Immutable once
/// created; corrections are made by appending adjustment punches.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PunchRecord {
    #[schema(example = "a3f1c9d2-5b6e-4f01-9c3a-2d8e7b4f6a10")]
    pub id: String,

    #[schema(example = "7c2e0b1f-91a4-4d58-8f3b-0c6d5e9a2b71")]
    pub employee_id: String,

    #[schema(example = "2025-12-01T08:00:00", value_type = String, format = "date-time")]
    pub timestamp: NaiveDateTime,

    pub kind: PunchKind,

    /// Free-text justification, required for manual adjustments.
    #[schema(example = "forgot badge at the office", nullable = true)]
    pub note: Option<String>,

    pub location: Option<GeoPoint>,

    /// Base64 snapshot from the capture camera, kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    pub status: PunchStatus,
}
