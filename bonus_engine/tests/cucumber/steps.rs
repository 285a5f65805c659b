use bonus_common::{AccrualStatus, Points};
use bonus_engine::{
    db_types::{OrderNumber, OrderStatusType},
    order_objects::SubmitOrderResult,
    LedgerApiError,
};
use cucumber::{then, when};

use crate::cucumber::BonusWorld;

fn points(s: &str) -> Points {
    Points::try_from(s.parse::<f64>().expect("Not a number")).expect("Amount out of range")
}

#[when(expr = "{word} submits order {word}")]
async fn submit_order(world: &mut BonusWorld, login: String, number: String) {
    let user = world.user(&login);
    let result = world.intake_api().submit(user, &number).await.expect("Error submitting order");
    world.last_submission = Some(result);
}

#[then(expr = "the submission is {word}")]
async fn check_submission(world: &mut BonusWorld, expected: String) {
    let expected = match expected.as_str() {
        "accepted" => SubmitOrderResult::Accepted,
        "already-added" => SubmitOrderResult::AlreadyAddedBySelf,
        "a-conflict" => SubmitOrderResult::ConflictOtherUser,
        s => panic!("Unknown submission result {s}"),
    };
    assert_eq!(world.last_submission, Some(expected));
}

#[when(expr = "the accrual service reports order {word} as {word}")]
async fn report_status(world: &mut BonusWorld, number: String, status: String) {
    let number = OrderNumber::parse(&number).expect("Invalid order number");
    let status = status.parse::<AccrualStatus>().expect("Invalid accrual status");
    let outcome = world.reconciliation_api().apply_accrual(&number, status, None).await.expect("Error reconciling");
    world.last_transition = Some(outcome);
}

#[when(expr = "the accrual service reports order {word} as PROCESSED with accrual {word}")]
async fn report_processed(world: &mut BonusWorld, number: String, accrual: String) {
    let number = OrderNumber::parse(&number).expect("Invalid order number");
    let outcome = world
        .reconciliation_api()
        .apply_accrual(&number, AccrualStatus::Processed, Some(points(&accrual)))
        .await
        .expect("Error reconciling");
    world.last_transition = Some(outcome);
}

#[then(expr = "order {word} has status {word}")]
async fn check_status(world: &mut BonusWorld, number: String, status: String) {
    let number = OrderNumber::parse(&number).expect("Invalid order number");
    let expected = status.parse::<OrderStatusType>().expect("Invalid status");
    let order = world.intake_api().order_by_number(&number).await.expect("Error fetching order");
    assert_eq!(order.map(|o| o.status), Some(expected));
}

#[then(expr = "order {word} has {int} status events")]
async fn check_history(world: &mut BonusWorld, number: String, count: usize) {
    let number = OrderNumber::parse(&number).expect("Invalid order number");
    let history = world.reconciliation_api().status_history(&number).await.expect("Error fetching history");
    assert_eq!(history.len(), count);
}

#[then(expr = "{word} has a balance of {word} with {word} withdrawn")]
async fn check_balance(world: &mut BonusWorld, login: String, current: String, withdrawn: String) {
    let user = world.user(&login);
    let balance = world.ledger_api().balance(user).await.expect("Error fetching balance");
    assert_eq!(balance.current, points(&current));
    assert_eq!(balance.withdrawn, points(&withdrawn));
}

#[then(expr = "{word} has {int} ledger entries")]
async fn check_ledger(world: &mut BonusWorld, login: String, count: usize) {
    let user = world.user(&login);
    let entries = world.ledger_api().ledger_entries(user).await.expect("Error fetching ledger");
    assert_eq!(entries.len(), count);
}

#[when(expr = "{word} withdraws {word} points against order {word}")]
async fn withdraw(world: &mut BonusWorld, login: String, sum: String, order: String) {
    let user = world.user(&login);
    world.last_withdrawal_error = world.ledger_api().withdraw(user, &order, points(&sum)).await.err();
}

#[then("the withdrawal succeeds")]
async fn withdrawal_succeeds(world: &mut BonusWorld) {
    assert_eq!(world.last_withdrawal_error, None);
}

#[then("the withdrawal is refused for insufficient funds")]
async fn withdrawal_refused(world: &mut BonusWorld) {
    assert!(matches!(world.last_withdrawal_error, Some(LedgerApiError::InsufficientFunds { .. })));
}

#[then(expr = "there are {int} pending orders")]
async fn check_pending(world: &mut BonusWorld, count: usize) {
    let pending = world.reconciliation_api().pending_orders().await.expect("Error fetching pending orders");
    assert_eq!(pending.len(), count);
}
