use crate::{
    api::{backup, employee, punch, report},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let punch_limiter = Arc::new(build_limiter(config.rate_punch_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter)
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/punch")
                    // /punch
                    .service(
                        web::resource("")
                            .wrap(punch_limiter)
                            .route(web::post().to(punch::create_punch))
                            .route(web::get().to(punch::list_my_punches)),
                    )
                    // /punch/adjust
                    .service(web::resource("/adjust").route(web::post().to(punch::adjust))),
            )
            .service(
                web::scope("/report")
                    .service(web::resource("/today").route(web::get().to(report::today)))
                    .service(web::resource("/card").route(web::get().to(report::card)))
                    .service(web::resource("/summary").route(web::get().to(report::summary)))
                    .service(
                        web::resource("/sheet/{id}").route(web::get().to(report::sheet)),
                    ),
            )
            .service(
                web::resource("/backup")
                    .route(web::get().to(backup::export))
                    .route(web::post().to(backup::restore)),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// API REQUEST
//  └─ Authorization: Bearer access_token
//
// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::backup::BackupFile;
    use crate::seed_admin;
    use crate::store::AppStore;
    use actix_web::http::StatusCode;
    use actix_web::web::Data;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    // Builds the same App main() serves, against a fresh store with the
    // seeded admin. Requests carry a peer address so the limiters have an
    // IP to key on.
    macro_rules! spawn_app {
        () => {{
            let config = Config::for_tests();
            let store = Data::new(AppStore::new());
            seed_admin(&store, &config).expect("seed admin");
            let app = test::init_service(
                App::new()
                    .app_data(store.clone())
                    .app_data(Data::new(config.clone()))
                    .configure(|cfg| configure(cfg, config.clone())),
            )
            .await;
            (app, store)
        }};
    }

    fn post(path: &str, token: Option<&str>, body: Value) -> test::TestRequest {
        let mut req = test::TestRequest::post()
            .uri(path)
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .set_json(body);
        if let Some(t) = token {
            req = req.insert_header(("Authorization", format!("Bearer {t}")));
        }
        req
    }

    fn get(path: &str, token: Option<&str>) -> test::TestRequest {
        let mut req = test::TestRequest::get()
            .uri(path)
            .peer_addr("127.0.0.1:40000".parse().unwrap());
        if let Some(t) = token {
            req = req.insert_header(("Authorization", format!("Bearer {t}")));
        }
        req
    }

    macro_rules! login {
        ($app:expr, $username:expr, $password:expr) => {{
            let req = post(
                "/auth/login",
                None,
                json!({"username": $username, "password": $password}),
            )
            .to_request();
            let resp = test::call_service(&$app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = test::read_body_json(resp).await;
            body["access_token"].as_str().unwrap().to_string()
        }};
    }

    #[actix_web::test]
    async fn login_punch_and_sheet_flow() {
        let (app, _store) = spawn_app!();
        let admin_token = login!(app, "admin", "admin-pass");

        // Admin creates an employee
        let req = post(
            "/api/v1/employees",
            Some(&admin_token),
            json!({
                "name": "Lucas Assis",
                "username": "Lucas",
                "password": "123",
                "job_title": "tecnico"
            }),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["name"], "LUCAS ASSIS");
        assert_eq!(created["username"], "lucas");
        let employee_id = created["id"].as_str().unwrap().to_string();

        // Employee clocks in and out; kind alternates automatically
        let lucas_token = login!(app, "lucas", "123");
        let req = post("/api/v1/punch", Some(&lucas_token), json!({})).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let first: Value = test::read_body_json(resp).await;
        assert_eq!(first["kind"], "IN");

        let req = post("/api/v1/punch", Some(&lucas_token), json!({})).to_request();
        let resp = test::call_service(&app, req).await;
        let second: Value = test::read_body_json(resp).await;
        assert_eq!(second["kind"], "OUT");

        // Own card groups the two punches into one complete day
        let req = get("/api/v1/report/card", Some(&lucas_token)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let card: Value = test::read_body_json(resp).await;
        let days = card.as_array().unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0]["punches"].as_array().unwrap().len(), 2);
        assert_eq!(days[0]["incomplete"], false);

        // Own sheet for the current month shows the punched day
        let req = get(
            &format!("/api/v1/report/sheet/{employee_id}"),
            Some(&lucas_token),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let sheet: Value = test::read_body_json(resp).await;
        assert!(sheet["report"]["days"].as_array().unwrap().len() >= 28);
        assert_eq!(sheet["report"]["summary"]["days_present"], 1);

        // The extract board is admin only
        let req = get("/api/v1/report/summary", Some(&lucas_token)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let req = get("/api/v1/report/summary", Some(&admin_token)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn adjustment_marks_the_day_special() {
        let (app, _store) = spawn_app!();
        let admin_token = login!(app, "admin", "admin-pass");

        let req = post(
            "/api/v1/employees",
            Some(&admin_token),
            json!({
                "name": "Maria",
                "username": "maria",
                "password": "123",
                "job_title": "suporte"
            }),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        let created: Value = test::read_body_json(resp).await;
        let employee_id = created["id"].as_str().unwrap().to_string();

        let req = post(
            "/api/v1/punch/adjust",
            Some(&admin_token),
            json!({
                "employee_id": employee_id,
                "kind": "HOLIDAY",
                "date": "2025-12-25",
                "reason": "Christmas"
            }),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = get(
            &format!("/api/v1/report/sheet/{employee_id}?year=2025&month=12"),
            Some(&admin_token),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        let sheet: Value = test::read_body_json(resp).await;
        let christmas = &sheet["report"]["days"].as_array().unwrap()[24];
        assert_eq!(christmas["class"], "SPECIAL");
        assert_eq!(christmas["special"], "HOLIDAY");
    }

    #[actix_web::test]
    async fn backup_round_trip_preserves_state() {
        let (app, store) = spawn_app!();
        let admin_token = login!(app, "admin", "admin-pass");

        let req = post(
            "/api/v1/employees",
            Some(&admin_token),
            json!({
                "name": "Rafael",
                "username": "rafael",
                "password": "123",
                "job_title": "gerente"
            }),
        )
        .to_request();
        test::call_service(&app, req).await;

        let req = get("/api/v1/backup", Some(&admin_token)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let backup: BackupFile = test::read_body_json(resp).await;
        assert_eq!(backup.employees.len(), 2); // admin + rafael

        // Wipe, then restore
        store.replace(Vec::new(), Vec::new());
        let req = post(
            "/api/v1/backup",
            Some(&admin_token),
            serde_json::to_value(&backup).unwrap(),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(store.list_employees().len(), 2);

        // A snapshot missing a collection is rejected before it clobbers state
        let req = post(
            "/api/v1/backup",
            Some(&admin_token),
            json!({"version": "1.0", "timestamp": "2025-12-01T12:00:00Z"}),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.list_employees().len(), 2);
    }

    #[actix_web::test]
    async fn api_rejects_requests_without_a_token() {
        let (app, _store) = spawn_app!();
        let req = get("/api/v1/punch", None).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
