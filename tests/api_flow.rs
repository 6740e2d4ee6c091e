use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, Error, ResponseError, test, web};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};
use std::sync::Arc;

use ambulette_backend::config::{AdminAccount, DatabaseConfig};
use ambulette_backend::database::{create_pool, run_migrations};
use ambulette_backend::external::LogCodeSender;
use ambulette_backend::handlers;
use ambulette_backend::middlewares::AuthMiddleware;
use ambulette_backend::services::*;
use ambulette_backend::utils::{JwtService, ManualClock, hash_password};

struct TestApp<S> {
    app: S,
    clock: ManualClock,
}

async fn build_app() -> TestApp<
    impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = Error>,
> {
    let pool = create_pool(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    })
    .await
    .unwrap();
    run_migrations(&pool).await.unwrap();

    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap());
    let jwt = JwtService::new("integration-secret", 1800);
    let verification = VerificationService::new(
        pool.clone(),
        Arc::new(LogCodeSender),
        Arc::new(clock.clone()),
        true,
    );
    let admins = vec![AdminAccount {
        username: "dispatch".to_string(),
        password_hash: hash_password("Dispatch123").unwrap(),
    }];

    let app = test::init_service(
        App::new()
            .wrap(AuthMiddleware::new(jwt.clone()))
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .app_data(web::Data::new(verification.clone()))
            .app_data(web::Data::new(BookingService::new(
                pool.clone(),
                verification.clone(),
            )))
            .app_data(web::Data::new(FleetService::new(
                pool.clone(),
                verification.clone(),
            )))
            .app_data(web::Data::new(StaffService::new(
                pool.clone(),
                Arc::new(clock.clone()),
            )))
            .app_data(web::Data::new(ExpenseService::new(pool.clone())))
            .app_data(web::Data::new(AdminService::new(admins, jwt)))
            .configure(handlers::health_config)
            .service(web::scope("/api/v1").configure(handlers::api_config)),
    )
    .await;

    TestApp { app, clock }
}

/// 发送请求，鉴权中间件的拒绝也转换成 (状态码, 响应体)
async fn send<S, B>(app: &S, req: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    match app.call(req.to_request()).await {
        Ok(resp) => {
            let status = resp.status();
            let body = test::read_body(resp).await;
            let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            (status, value)
        }
        Err(err) => {
            let resp = err.as_response_error().error_response();
            let status = resp.status();
            let body = actix_web::body::to_bytes(resp.into_body())
                .await
                .unwrap_or_default();
            let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            (status, value)
        }
    }
}

fn booking_body(phone: &str) -> Value {
    json!({
        "name": "Jane Doe",
        "phone": phone,
        "email": "jane@example.com",
        "pickup_location": { "address": "1 Main St", "latitude": 40.71, "longitude": -74.0 },
        "drop_location": { "address": "200 Hospital Rd", "latitude": 40.75, "longitude": -73.98 },
        "from_date": "2026-10-19T10:00:00Z",
        "to_date": "2026-10-19T12:00:00Z"
    })
}

async fn admin_token<S, B>(app: &S) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/v1/admin/login")
            .set_json(json!({ "username": "dispatch", "password": "Dispatch123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["access_token"].as_str().unwrap().to_string()
}

#[actix_web::test]
async fn test_healthz_is_public() {
    let TestApp { app, .. } = build_app().await;
    let (status, body) = send(&app, test::TestRequest::get().uri("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_booking_requires_fresh_verification() {
    let TestApp { app, .. } = build_app().await;
    let phone = "+15551234567";

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/bookings")
            .set_json(booking_body(phone)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PHONE_NOT_VERIFIED");

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/otp/send")
            .set_json(json!({ "phone": phone })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["expires_in"], 300);
    let code = body["data"]["code"].as_str().unwrap().to_string();

    let wrong = if code == "000000" { "111111" } else { "000000" };
    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/otp/verify")
            .set_json(json!({ "phone": phone, "code": wrong })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "OTP_MISMATCH");

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/otp/verify")
            .set_json(json!({ "phone": phone, "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["verified"], true);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/bookings")
            .set_json(booking_body(phone)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["drop_location"]["address"], "200 Hospital Rd");
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/v1/bookings/{booking_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phone"], phone);

    // 验证记录已被消费
    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/bookings")
            .set_json(booking_body(phone)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PHONE_NOT_VERIFIED");
}

#[actix_web::test]
async fn test_expired_code_is_rejected() {
    let TestApp { app, clock } = build_app().await;
    let phone = "+15550000000";

    let (_, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/otp/send")
            .set_json(json!({ "phone": phone })),
    )
    .await;
    let code = body["data"]["code"].as_str().unwrap().to_string();

    clock.advance(Duration::seconds(301));
    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/otp/verify")
            .set_json(json!({ "phone": phone, "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "OTP_EXPIRED");

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/otp/verify")
            .set_json(json!({ "phone": phone, "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "OTP_NOT_FOUND");
}

#[actix_web::test]
async fn test_invalid_phone_and_body_are_validation_errors() {
    let TestApp { app, .. } = build_app().await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/otp/send")
            .set_json(json!({ "phone": "12" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/otp/send")
            .set_json(json!({ "mobile": "+15551234567" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_admin_routes_require_token() {
    let TestApp { app, .. } = build_app().await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/v1/admin/ambulances")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/ambulances")
            .insert_header(("Authorization", "Bearer not-a-token")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/login")
            .set_json(json!({ "username": "dispatch", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_ERROR");
}

#[actix_web::test]
async fn test_admin_fleet_flow() {
    let TestApp { app, .. } = build_app().await;
    let token = admin_token(&app).await;
    let bearer = ("Authorization", format!("Bearer {token}"));

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/ambulances")
            .insert_header(bearer.clone())
            .set_json(json!({ "license_plate": "AMB-7", "model": "Ford Transit", "capacity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "available");
    let ambulance_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/ambulances")
            .insert_header(bearer.clone())
            .set_json(json!({ "license_plate": "amb-7", "model": "Ford Transit", "capacity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/ambulances?status=available")
            .insert_header(bearer.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // 司机手机号未验证
    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/drivers")
            .insert_header(bearer.clone())
            .set_json(json!({ "name": "Sam", "phone": "+15557654321", "license_number": "D1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PHONE_NOT_VERIFIED");

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/admin/ambulances/{ambulance_id}"))
            .insert_header(bearer.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/admin/ambulances/{ambulance_id}"))
            .insert_header(bearer),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
