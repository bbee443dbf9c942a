mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test};
use common::*;
use pos_backend::AppServices;
use pos_backend::entities::Role;
use pos_backend::handlers;
use pos_backend::middlewares::AuthMiddleware;
use pos_backend::services::NotificationService;
use pos_backend::utils::{JwtService, StockUnderflowPolicy};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

const SECRET: &str = "test-secret";

async fn seeded() -> (DatabaseConnection, JwtService) {
    let db = setup_db().await;
    seed_user(&db, "admin", "admin123", Role::Admin).await;
    seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    seed_item(&db, "Kopi Susu", 10, 8_000, 15_000).await;
    (db, JwtService::new(SECRET, 3600))
}

macro_rules! app {
    ($db:expr, $jwt:expr) => {{
        let (notifier, _rx) = NotificationService::new(8);
        let services = AppServices::new(
            $db.clone(),
            $jwt.clone(),
            notifier,
            StockUnderflowPolicy::Clamp,
        );
        test::init_service(
            App::new()
                .wrap(AuthMiddleware::new($jwt.clone()))
                .configure(|cfg| services.register(cfg))
                .configure(handlers::api_config),
        )
        .await
    }};
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn test_login_issues_token_and_rejects_bad_password() {
    let (db, jwt) = seeded().await;
    let app = app!(db, jwt);

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({"username": "kasir", "password": "kasir123"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["role"], "cashier");
    assert_eq!(body["data"]["expires_in"], 3600);
    let token = body["data"]["token"].as_str().unwrap();
    let claims = jwt.verify_token(token).unwrap();
    assert_eq!(claims.username, "kasir");
    assert!(body["data"]["user"].get("password_hash").is_none());

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({"username": "kasir", "password": "wrong"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "AUTH_ERROR");
}

#[actix_web::test]
async fn test_protected_routes_require_valid_token() {
    let (db, jwt) = seeded().await;
    let app = app!(db, jwt);

    let req = test::TestRequest::get().uri("/api/v1/items").to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    assert_eq!(
        err.as_response_error().status_code(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/items")
        .insert_header(bearer("not-a-jwt"))
        .to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    assert_eq!(
        err.as_response_error().status_code(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn test_admin_only_scopes_reject_cashier() {
    let (db, jwt) = seeded().await;
    let app = app!(db, jwt);
    let cashier = jwt.generate_token(2, "kasir", Role::Cashier).unwrap();
    let admin = jwt.generate_token(1, "admin", Role::Admin).unwrap();

    for uri in ["/api/v1/attendance/today", "/api/v1/users"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(&cashier))
            .to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(&admin))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }
}

#[actix_web::test]
async fn test_item_views_depend_on_caller() {
    let (db, jwt) = seeded().await;
    let app = app!(db, jwt);
    let cashier = jwt.generate_token(2, "kasir", Role::Cashier).unwrap();
    let admin = jwt.generate_token(1, "admin", Role::Admin).unwrap();

    let req = test::TestRequest::get().uri("/api/v1/public/items").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total"], 1);
    assert!(body["data"]["data"][0].get("buy_price").is_none());

    let req = test::TestRequest::get()
        .uri("/api/v1/items/1")
        .insert_header(bearer(&cashier))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["data"].get("buy_price").is_none());

    let req = test::TestRequest::get()
        .uri("/api/v1/items?name=kopi")
        .insert_header(bearer(&admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["data"][0]["buy_price"], 8_000);

    let req = test::TestRequest::get()
        .uri("/api/v1/items/export")
        .insert_header(bearer(&cashier))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("Content-Disposition").unwrap(),
        "attachment; filename=\"items.csv\""
    );
    let csv = test::read_body(resp).await;
    let csv = std::str::from_utf8(&csv).unwrap();
    assert!(csv.starts_with("id,name,description,stock,price,"));
}

#[actix_web::test]
async fn test_create_transaction_over_http() {
    let (db, jwt) = seeded().await;
    let app = app!(db, jwt);
    let cashier = jwt.generate_token(2, "kasir", Role::Cashier).unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/transactions")
        .insert_header(bearer(&cashier))
        .set_json(json!({
            "status": "completed",
            "items": [{"item_id": 1, "quantity": 2}],
            "payment_amount": 50000,
            "payment_type": "cash"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let data = &body["data"];
    assert_eq!(data["transaction"]["total"], 30_000);
    assert_eq!(data["transaction"]["change"], 20_000);
    assert_eq!(data["transaction"]["user_id"], 2);
    assert!(data.get("warnings").is_none());

    let req = test::TestRequest::post()
        .uri("/api/v1/transactions")
        .insert_header(bearer(&cashier))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"status\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let req = test::TestRequest::get()
        .uri("/api/v1/transactions?date=12-03-2025")
        .insert_header(bearer(&cashier))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/v1/dashboard")
        .insert_header(bearer(&cashier))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["completed_transactions"], 1);
    assert_eq!(body["data"]["total_revenue"], 30_000);

}
