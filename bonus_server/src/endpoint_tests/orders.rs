use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use bonus_common::Points;
use bonus_engine::{
    db_types::{OrderNumber, OrderStatusType, OrderSummary, UserId},
    InsertOrderResult,
    OrderApiError,
    OrderIntakeApi,
};
use chrono::{TimeZone, Utc};

use super::{
    helpers::{bearer, send, token_for},
    mocks::MockOrderManager,
};
use crate::routes::{ListOrdersRoute, SubmitOrderRoute};

fn configure(manager: MockOrderManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(SubmitOrderRoute::<MockOrderManager>::new())
            .service(ListOrdersRoute::<MockOrderManager>::new())
            .app_data(web::Data::new(OrderIntakeApi::new(manager)));
    }
}

fn submit(number: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/user/orders")
        .insert_header(("Content-Type", "text/plain"))
        .set_payload(number.to_string())
}

#[actix_web::test]
async fn orders_need_a_token() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_orders_for_user().never();
    let reply = send(TestRequest::get().uri("/api/user/orders"), configure(manager)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body, r#"{"error":"Authentication Error. No access token was provided."}"#);
}

#[actix_web::test]
async fn orders_reject_forged_tokens() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_orders_for_user().never();
    let mut token = token_for(1);
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let req = TestRequest::get().uri("/api/user/orders").insert_header(("Authorization", format!("Bearer {token}")));
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn submit_new_order() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager
        .expect_insert_order()
        .withf(|user, number| *user == UserId::from(1) && number.as_str() == "79927398713")
        .times(1)
        .returning(|_, _| Ok(InsertOrderResult::Inserted(1)));
    let reply = send(submit("79927398713\n").insert_header(bearer(1)), configure(manager)).await;
    assert_eq!(reply.status, StatusCode::ACCEPTED);
}

#[actix_web::test]
async fn resubmit_own_order() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_insert_order().returning(|_, _| Ok(InsertOrderResult::AlreadyExists { owner: UserId::from(1) }));
    let reply = send(submit("79927398713").insert_header(bearer(1)), configure(manager)).await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[actix_web::test]
async fn submit_somebody_elses_order() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_insert_order().returning(|_, _| Ok(InsertOrderResult::AlreadyExists { owner: UserId::from(2) }));
    let reply = send(submit("79927398713").insert_header(bearer(1)), configure(manager)).await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn token_cookie_is_accepted() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager
        .expect_insert_order()
        .withf(|user, _| *user == UserId::from(5))
        .returning(|_, _| Ok(InsertOrderResult::Inserted(1)));
    let cookie = actix_web::cookie::Cookie::new("token", token_for(5));
    let reply = send(submit("79927398713").cookie(cookie), configure(manager)).await;
    assert_eq!(reply.status, StatusCode::ACCEPTED);
}

#[actix_web::test]
async fn submit_invalid_numbers() {
    let _ = env_logger::try_init().ok();
    for number in ["79927398710", "7992739871x", "-1"] {
        let mut manager = MockOrderManager::new();
        manager.expect_insert_order().never();
        let reply = send(submit(number).insert_header(bearer(1)), configure(manager)).await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY, "{number}");
    }
}

#[actix_web::test]
async fn submit_needs_plain_text() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_insert_order().never();
    let req = TestRequest::post()
        .uri("/api/user/orders")
        .insert_header(bearer(1))
        .set_json(serde_json::json!({"number": "79927398713"}));
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let mut manager = MockOrderManager::new();
    manager.expect_insert_order().never();
    let reply = send(submit("  ").insert_header(bearer(1)), configure(manager)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn content_type_is_case_insensitive() {
    let _ = env_logger::try_init().ok();
    for content_type in ["Text/Plain", "TEXT/PLAIN; charset=utf-8"] {
        let mut manager = MockOrderManager::new();
        manager.expect_insert_order().times(1).returning(|_, _| Ok(InsertOrderResult::Inserted(1)));
        let req = submit("79927398713").insert_header(("Content-Type", content_type)).insert_header(bearer(1));
        let reply = send(req, configure(manager)).await;
        assert_eq!(reply.status, StatusCode::ACCEPTED, "{content_type}");
    }
}

#[actix_web::test]
async fn list_orders() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager
        .expect_fetch_orders_for_user()
        .withf(|user| *user == UserId::from(1))
        .returning(|_| Ok(orders_response()));
    let req = TestRequest::get().uri("/api/user/orders").insert_header(bearer(1));
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, ORDERS_JSON);
}

#[actix_web::test]
async fn list_orders_when_there_are_none() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_orders_for_user().returning(|_| Ok(vec![]));
    let req = TestRequest::get().uri("/api/user/orders").insert_header(bearer(1));
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
    assert!(reply.body.is_empty());
}

#[actix_web::test]
async fn list_orders_database_failure() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_orders_for_user().returning(|_| Err(OrderApiError::DatabaseError("gone".into())));
    let req = TestRequest::get().uri("/api/user/orders").insert_header(bearer(1));
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
}

// Mock response to `fetch_orders_for_user`
fn orders_response() -> Vec<OrderSummary> {
    let order = |id: i64, number: &str, status, accrual: i64, day: u32| OrderSummary {
        order_id: id,
        number: OrderNumber::parse(number).unwrap(),
        user_id: UserId::from(1),
        status,
        accrual: Points::from(accrual),
        uploaded_at: Utc.with_ymd_and_hms(2024, 3, day, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 3, day, 14, 0, 0).unwrap(),
    };
    vec![
        order(1, "79927398713", OrderStatusType::Processed, 50050, 1),
        order(2, "12345678903", OrderStatusType::Processing, 0, 2),
        order(3, "4561261212345467", OrderStatusType::Invalid, 0, 3),
    ]
}

const ORDERS_JSON: &str = r#"[{"number":"79927398713","status":"PROCESSED","accrual":500.5,"uploaded_at":"2024-03-01T13:30:00Z"},{"number":"12345678903","status":"PROCESSING","uploaded_at":"2024-03-02T13:30:00Z"},{"number":"4561261212345467","status":"INVALID","uploaded_at":"2024-03-03T13:30:00Z"}]"#;
