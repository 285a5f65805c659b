use bonus_common::Points;
use bonus_engine::db_types::OrderNumber;
use cucumber::{given, gherkin::Step};

use crate::cucumber::{world::BonusSystem, BonusWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut BonusWorld) {
    let system = BonusSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a registered user {word}")]
async fn registered_user(world: &mut BonusWorld, login: String) {
    let id = world.auth_api().register(&login, "hunter2").await.expect("Error registering user");
    world.users.insert(login, id);
}

#[given(expr = "{word} has submitted order {word}")]
async fn submitted_order(world: &mut BonusWorld, login: String, number: String) {
    let user = world.user(&login);
    world.intake_api().submit(user, &number).await.expect("Error submitting order");
}

/// Seeds balances with a table of `| order | amount |` rows, credited directly to the ledger.
#[given(expr = "{word} has the following credits")]
async fn seed_credits(world: &mut BonusWorld, login: String, step: &Step) {
    let user = world.user(&login);
    let table = step.table.as_ref().expect("This step requires a table");
    for row in table.rows.iter().skip(1) {
        let order = OrderNumber::parse(&row[0]).expect("Invalid order number in table");
        let amount = row[1].parse::<f64>().expect("Invalid amount in table");
        let amount = Points::try_from(amount).expect("Amount out of range");
        world.ledger_api().credit(user, &order, amount).await.expect("Error crediting user");
    }
}
