use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use bonus_common::Points;
use bonus_engine::{
    db_types::{Balance, LedgerEntry, OrderNumber, UserId, Withdrawal},
    LedgerApi,
    LedgerApiError,
};
use chrono::{TimeZone, Utc};
use serde_json::json;

use super::{
    helpers::{bearer, send},
    mocks::MockLedgerManager,
};
use crate::routes::{BalanceRoute, WithdrawRoute, WithdrawalsRoute};

fn configure(manager: MockLedgerManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(BalanceRoute::<MockLedgerManager>::new())
            .service(WithdrawRoute::<MockLedgerManager>::new())
            .service(WithdrawalsRoute::<MockLedgerManager>::new())
            .app_data(web::Data::new(LedgerApi::new(manager)));
    }
}

fn withdraw(order: &str, sum: f64) -> TestRequest {
    TestRequest::post()
        .uri("/api/user/balance/withdraw")
        .insert_header(bearer(1))
        .set_json(json!({"order": order, "sum": sum}))
}

#[actix_web::test]
async fn fetch_balance() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockLedgerManager::new();
    manager
        .expect_fetch_balance()
        .withf(|user| *user == UserId::from(1))
        .returning(|_| Ok(Balance { current: Points::from(50050), withdrawn: Points::from_points(42) }));
    let req = TestRequest::get().uri("/api/user/balance").insert_header(bearer(1));
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, r#"{"current":500.5,"withdrawn":42.0}"#);
}

#[actix_web::test]
async fn balance_needs_a_token() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockLedgerManager::new();
    manager.expect_fetch_balance().never();
    let reply = send(TestRequest::get().uri("/api/user/balance"), configure(manager)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn successful_withdrawal() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockLedgerManager::new();
    manager
        .expect_debit()
        .withf(|user, order, amount| {
            *user == UserId::from(1) && order.as_str() == "2377225624" && *amount == Points::from(75150)
        })
        .times(1)
        .returning(|user, order, amount| {
            Ok(LedgerEntry { id: 9, user_id: user, order_number: order.clone(), amount: -amount, created_at: Utc::now() })
        });
    let reply = send(withdraw("2377225624", 751.5), configure(manager)).await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[actix_web::test]
async fn withdrawal_with_insufficient_funds() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockLedgerManager::new();
    manager.expect_debit().returning(|_, _, amount| {
        Err(LedgerApiError::InsufficientFunds { requested: amount, available: Points::from_points(500) })
    });
    let reply = send(withdraw("2377225624", 600.0), configure(manager)).await;
    assert_eq!(reply.status, StatusCode::PAYMENT_REQUIRED);
}

#[actix_web::test]
async fn invalid_withdrawals() {
    let _ = env_logger::try_init().ok();
    for (order, sum) in [("2377225625", 10.0), ("not a number", 10.0), ("2377225624", 0.0), ("2377225624", -10.0)] {
        let mut manager = MockLedgerManager::new();
        manager.expect_debit().never();
        let reply = send(withdraw(order, sum), configure(manager)).await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY, "{order} {sum}");
    }
}

#[actix_web::test]
async fn withdrawal_needs_a_json_body() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockLedgerManager::new();
    manager.expect_debit().never();
    let req = TestRequest::post()
        .uri("/api/user/balance/withdraw")
        .insert_header(bearer(1))
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"order": "2377225624", "sum": "lots"}"#);
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn list_withdrawals() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockLedgerManager::new();
    manager.expect_fetch_withdrawals().returning(|_| {
        Ok(vec![Withdrawal {
            order: OrderNumber::parse("2377225624").unwrap(),
            sum: Points::from_points(500),
            processed_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        }])
    });
    let req = TestRequest::get().uri("/api/user/withdrawals").insert_header(bearer(1));
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, r#"[{"order":"2377225624","sum":500.0,"processed_at":"2024-03-01T10:00:00Z"}]"#);
}

#[actix_web::test]
async fn list_withdrawals_when_there_are_none() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockLedgerManager::new();
    manager.expect_fetch_withdrawals().returning(|_| Ok(vec![]));
    let req = TestRequest::get().uri("/api/user/withdrawals").insert_header(bearer(1));
    let reply = send(req, configure(manager)).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
}
