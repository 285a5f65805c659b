use log::debug;
use sqlx::SqliteConnection;

use super::errors::is_unique_violation;
use crate::{db::sqlite::SqliteDatabaseError, db_types::UserId};

pub async fn insert_user(
    login: &str,
    password_hash: &str,
    conn: &mut SqliteConnection,
) -> Result<UserId, SqliteDatabaseError> {
    let result = sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (login, password_hash) VALUES ($1, $2) RETURNING id",
    )
    .bind(login)
    .bind(password_hash)
    .fetch_one(conn)
    .await;
    match result {
        Ok(id) => {
            debug!("🧑️ New user '{login}' has id {id}");
            Ok(id)
        },
        Err(e) if is_unique_violation(&e) => Err(SqliteDatabaseError::DuplicateLogin(login.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_user_id(
    login: &str,
    password_hash: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<UserId>, SqliteDatabaseError> {
    let id = sqlx::query_scalar::<_, UserId>("SELECT id FROM users WHERE login = $1 AND password_hash = $2")
        .bind(login)
        .bind(password_hash)
        .fetch_optional(conn)
        .await?;
    Ok(id)
}
