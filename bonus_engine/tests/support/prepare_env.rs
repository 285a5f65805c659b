use bonus_engine::{db_types::UserId, AuthApi, SqliteDatabase};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

/// A fresh, migrated database in the system temp directory. Returns the handle and its url.
pub async fn prepare_test_env() -> (SqliteDatabase, String) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = format!("sqlite://{}/bonus_it_{}.db", std::env::temp_dir().display(), rand::random::<u64>());
    Sqlite::create_database(&url).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    debug!("🚀️ Test database ready at {url}");
    (db, url)
}

pub async fn teardown(db: SqliteDatabase, url: &str) {
    db.close().await;
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("🚀️ Could not remove test database {url}: {e}");
    }
}

pub async fn new_user(db: &SqliteDatabase, login: &str) -> UserId {
    AuthApi::new(db.clone()).register(login, "password").await.expect("Error registering user")
}
