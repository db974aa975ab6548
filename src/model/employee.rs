use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employee profile, doubling as the login account (the company is small
/// enough that there is no separate user table).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": "7c2e0b1f-91a4-4d58-8f3b-0c6d5e9a2b71",
        "name": "LUCAS ASSIS DOS SANTOS CRUZ",
        "username": "lucas",
        "company": "ULTRANET",
        "job_title": "TECNICO",
        "shift": "08:00 - 18:00",
        "role": "EMPLOYEE"
    })
)]
pub struct Employee {
    pub id: String,

    /// Stored uppercase.
    #[schema(example = "LUCAS ASSIS DOS SANTOS CRUZ")]
    pub name: String,

    /// Stored lowercase, unique across the store.
    #[schema(example = "lucas")]
    pub username: String,

    #[schema(example = "ULTRANET")]
    pub company: String,

    #[schema(example = "TECNICO")]
    pub job_title: String,

    #[schema(example = "08:00 - 18:00")]
    pub shift: String,

    pub role: Role,

    /// Argon2 hash. Serialized only in backup snapshots; API responses
    /// use a dedicated DTO without it.
    #[schema(write_only)]
    pub password_hash: String,
}
