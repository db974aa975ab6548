use crate::{
    auth::{auth::AuthUser, password::hash_password},
    model::{employee::Employee, role::Role},
    store::{AppStore, StoreError},
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Maria Oliveira")]
    pub name: String,
    #[schema(example = "maria")]
    pub username: String,
    #[schema(example = "secret")]
    pub password: String,
    #[schema(example = "SUPORTE")]
    pub job_title: String,
    #[schema(example = "08:00 - 18:00", nullable = true)]
    pub shift: Option<String>,
    #[schema(nullable = true)]
    pub company: Option<String>,
    /// Defaults to EMPLOYEE.
    pub role: Option<Role>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub name: Option<String>,
    pub username: Option<String>,
    pub job_title: Option<String>,
    pub shift: Option<String>,
    pub company: Option<String>,
    pub role: Option<Role>,
    /// Omit (or send empty) to keep the current password.
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Case-insensitive name substring.
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeResponse {
    pub id: String,
    pub name: String,
    pub username: String,
    pub company: String,
    pub job_title: String,
    pub shift: String,
    pub role: Role,
}

impl From<Employee> for EmployeeResponse {
    fn from(e: Employee) -> Self {
        Self {
            id: e.id,
            name: e.name,
            username: e.username,
            company: e.company,
            job_title: e.job_title,
            shift: e.shift,
            role: e.role,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<EmployeeResponse>,
    pub page: u32,
    pub per_page: u32,
    pub total: usize,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Empty name, username or password"),
        (status = 409, description = "Username already taken"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    store: web::Data<AppStore>,
    config: web::Data<crate::config::Config>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let name = payload.name.trim();
    let username = payload.username.trim();
    if name.is_empty() || username.is_empty() || payload.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Name, username and password must not be empty"
        })));
    }

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let employee = Employee {
        id: Uuid::new_v4().to_string(),
        // Names go in uppercase, usernames lowercase, as on the badge sheet
        name: name.to_uppercase(),
        username: username.to_lowercase(),
        company: payload
            .company
            .clone()
            .unwrap_or_else(|| config.company_name.clone()),
        job_title: payload.job_title.to_uppercase(),
        shift: payload
            .shift
            .clone()
            .unwrap_or_else(|| "08:00 - 18:00".to_string()),
        role: payload.role.unwrap_or(Role::Employee),
        password_hash,
    };

    match store.insert_employee(employee.clone()) {
        Ok(()) => Ok(HttpResponse::Created().json(EmployeeResponse::from(employee))),
        Err(StoreError::UsernameTaken) => Ok(HttpResponse::Conflict().json(json!({
            "message": "Username already taken"
        }))),
        Err(e) => {
            error!(error = %e, "Failed to create employee");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// List employees with search and pagination
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page"),
        ("search" = Option<String>, Query, description = "Search by name")
    ),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    store: web::Data<AppStore>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut employees = store.list_employees();
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        employees.retain(|e| e.name.to_lowercase().contains(&needle));
    }
    employees.sort_by(|a, b| a.name.cmp(&b.name));

    let total = employees.len();
    let data: Vec<EmployeeResponse> = employees
        .into_iter()
        .skip(((page - 1) * per_page) as usize)
        .take(per_page as usize)
        .map(EmployeeResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Get Employee by ID (admins, or the employee themselves)
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = EmployeeResponse),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    auth: AuthUser,
    store: web::Data<AppStore>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_admin(&employee_id)?;

    match store.get_employee(&employee_id) {
        Some(e) => Ok(HttpResponse::Ok().json(EmployeeResponse::from(e))),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = String, Path, description = "Employee ID")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Username already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    store: web::Data<AppStore>,
    path: web::Path<String>,
    body: web::Json<UpdateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let employee_id = path.into_inner();

    let password_hash = match body.password.as_deref() {
        Some(p) if !p.is_empty() => Some(hash_password(p).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?),
        _ => None,
    };

    let result = store.update_employee(&employee_id, |e| {
        if let Some(name) = &body.name {
            e.name = name.trim().to_uppercase();
        }
        if let Some(username) = &body.username {
            e.username = username.trim().to_lowercase();
        }
        if let Some(job_title) = &body.job_title {
            e.job_title = job_title.to_uppercase();
        }
        if let Some(shift) = &body.shift {
            e.shift = shift.clone();
        }
        if let Some(company) = &body.company {
            e.company = company.clone();
        }
        if let Some(role) = body.role {
            e.role = role;
        }
        if let Some(hash) = password_hash {
            e.password_hash = hash;
        }
    });

    match result {
        Ok(updated) => Ok(HttpResponse::Ok().json(EmployeeResponse::from(updated))),
        Err(StoreError::EmployeeNotFound) => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
        Err(StoreError::UsernameTaken) => Ok(HttpResponse::Conflict().json(json!({
            "message": "Username already taken"
        }))),
    }
}

/// Delete Employee (cascades to their punches)
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = String, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(
    auth: AuthUser,
    store: web::Data<AppStore>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let employee_id = path.into_inner();

    match store.delete_employee(&employee_id) {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "message": "Successfully deleted"
        }))),
        Err(_) => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}
