use actix_web::{
    http::{
        header::{AUTHORIZATION, SET_COOKIE},
        StatusCode,
    },
    test::TestRequest,
    web,
    web::ServiceConfig,
};
use bonus_engine::{db_types::UserId, AuthApi, AuthApiError};
use serde_json::json;

use super::{
    helpers::{send, test_tokens},
    mocks::MockAuthManager,
};
use crate::routes::{LoginRoute, RegisterRoute};

fn configure(manager: MockAuthManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(RegisterRoute::<MockAuthManager>::new())
            .service(LoginRoute::<MockAuthManager>::new())
            .app_data(web::Data::new(AuthApi::new(manager)));
    }
}

fn credentials() -> serde_json::Value {
    json!({"login": "alice", "password": "hunter2"})
}

#[actix_web::test]
async fn register_logs_the_user_in() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockAuthManager::new();
    manager
        .expect_create_user()
        .withf(|login, hash| login == "alice" && hash.len() == 128)
        .times(1)
        .returning(|_, _| Ok(UserId::from(7)));
    let req = TestRequest::post().uri("/api/user/register").set_json(credentials());
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let cookie = reply.headers.get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("token="), "{cookie}");
    assert!(cookie.contains("Path=/"), "{cookie}");
    let header = reply.headers.get(AUTHORIZATION).unwrap().to_str().unwrap();
    let token = header.strip_prefix("Bearer ").unwrap();
    assert_eq!(test_tokens().verify_token(token).unwrap(), UserId::from(7));
    assert!(cookie.starts_with(&format!("token={token}")));
}

#[actix_web::test]
async fn register_duplicate_login() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockAuthManager::new();
    manager.expect_create_user().returning(|login, _| Err(AuthApiError::DuplicateLogin(login.to_string())));
    let req = TestRequest::post().uri("/api/user/register").set_json(credentials());
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body, r#"{"error":"The login 'alice' is already taken"}"#);
    assert!(reply.headers.get(SET_COOKIE).is_none());
}

#[actix_web::test]
async fn register_needs_a_json_body() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockAuthManager::new();
    manager.expect_create_user().never();
    let req = TestRequest::post()
        .uri("/api/user/register")
        .insert_header(("Content-Type", "text/plain"))
        .set_payload(r#"{"login": "alice", "password": "hunter2"}"#);
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let mut manager = MockAuthManager::new();
    manager.expect_create_user().never();
    let req = TestRequest::post()
        .uri("/api/user/register")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"login": "alice""#);
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let mut manager = MockAuthManager::new();
    manager.expect_create_user().never();
    let req = TestRequest::post().uri("/api/user/register").set_json(json!({"login": "", "password": "hunter2"}));
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn login() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockAuthManager::new();
    manager.expect_fetch_user_id().times(1).returning(|_, _| Ok(Some(UserId::from(3))));
    let req = TestRequest::post().uri("/api/user/login").set_json(credentials());
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let header = reply.headers.get(AUTHORIZATION).unwrap().to_str().unwrap();
    let token = header.strip_prefix("Bearer ").unwrap();
    assert_eq!(test_tokens().verify_token(token).unwrap(), UserId::from(3));
}

#[actix_web::test]
async fn login_with_wrong_password() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockAuthManager::new();
    manager.expect_fetch_user_id().returning(|_, _| Ok(None));
    let req = TestRequest::post().uri("/api/user/login").set_json(credentials());
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert!(reply.headers.get(AUTHORIZATION).is_none());
}

#[actix_web::test]
async fn database_errors_are_internal_errors() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockAuthManager::new();
    manager.expect_fetch_user_id().returning(|_, _| Err(AuthApiError::DatabaseError("database is locked".into())));
    let req = TestRequest::post().uri("/api/user/login").set_json(credentials());
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!reply.body.contains("locked"));
}
