use std::collections::HashMap;

use bonus_engine::{
    db_types::UserId,
    order_objects::{SubmitOrderResult, TransitionOutcome},
    AuthApi, LedgerApi, LedgerApiError, OrderIntakeApi, ReconciliationApi, SqliteDatabase,
};
use cucumber::World;
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

#[derive(Default, Debug, World)]
pub struct BonusWorld {
    pub system: Option<BonusSystem>,
    pub users: HashMap<String, UserId>,
    pub last_submission: Option<SubmitOrderResult>,
    pub last_transition: Option<TransitionOutcome>,
    pub last_withdrawal_error: Option<LedgerApiError>,
}

#[derive(Debug)]
pub struct BonusSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
}

impl BonusWorld {
    pub fn db(&self) -> &SqliteDatabase {
        &self.system.as_ref().expect("System not initialised").db
    }

    pub fn user(&self, login: &str) -> UserId {
        *self.users.get(login).unwrap_or_else(|| panic!("User {login} has not been registered"))
    }

    pub fn auth_api(&self) -> AuthApi<SqliteDatabase> {
        AuthApi::new(self.db().clone())
    }

    pub fn intake_api(&self) -> OrderIntakeApi<SqliteDatabase> {
        OrderIntakeApi::new(self.db().clone())
    }

    pub fn ledger_api(&self) -> LedgerApi<SqliteDatabase> {
        LedgerApi::new(self.db().clone())
    }

    pub fn reconciliation_api(&self) -> ReconciliationApi<SqliteDatabase> {
        ReconciliationApi::new(self.db().clone())
    }
}

impl BonusSystem {
    pub async fn new() -> Self {
        let db_path = format!("sqlite://{}/bonus_cucumber_{}.db", std::env::temp_dir().display(), rand::random::<u64>());
        Sqlite::create_database(&db_path).await.expect("Error creating database");
        let db = SqliteDatabase::new_with_url(&db_path, 1).await.expect("Error creating connection to database");
        db.migrate().await.expect("Error running migrations");
        debug!("Created database: {db_path}");
        Self { db_path, db }
    }
}
