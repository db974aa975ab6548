use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod docs;
mod model;
mod models;
mod routes;
mod store;
mod timesheet;
mod utils;

use config::Config;
use store::AppStore;

use crate::auth::password::hash_password;
use crate::docs::ApiDoc;
use crate::model::employee::Employee;
use crate::model::role::Role;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

#[get("/")]
async fn index() -> impl Responder {
    "Ponto Eletrônico"
}

/// Ensures the manager account exists so a fresh deployment is never locked
/// out. A no-op when the username is already taken.
pub fn seed_admin(store: &AppStore, config: &Config) -> anyhow::Result<()> {
    if store.find_by_username(&config.admin_username).is_some() {
        return Ok(());
    }

    let password_hash = hash_password(&config.admin_password)?;
    store.insert_employee(Employee {
        id: Uuid::new_v4().to_string(),
        name: config.admin_name.to_uppercase(),
        username: config.admin_username.to_lowercase(),
        company: config.company_name.clone(),
        job_title: "ADMINISTRADOR".to_string(),
        shift: "INTEGRAL".to_string(),
        role: Role::Admin,
        password_hash,
    })?;
    info!(username = %config.admin_username, "Seeded admin account");
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let store = Data::new(AppStore::new());
    if let Err(e) = seed_admin(&store, &config) {
        eprintln!("Failed to seed admin account: {e:?}");
    }

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
