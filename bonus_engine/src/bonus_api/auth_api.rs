use std::fmt::Debug;

use log::{debug, info};

use crate::{db_types::UserId, helpers::hash_password, AuthApiError, AuthManagement};

/// `AuthApi` registers users and checks their credentials.
///
/// Passwords are digested before they reach the backend. Token issuance is left to the HTTP layer.
pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B: Clone> Clone for AuthApi<B> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Creates a new user. Fails with [`AuthApiError::DuplicateLogin`] if the login exists.
    pub async fn register(&self, login: &str, password: &str) -> Result<UserId, AuthApiError> {
        if login.is_empty() || password.is_empty() {
            return Err(AuthApiError::EmptyCredentials);
        }
        let hash = hash_password(login, password);
        let id = self.db.create_user(login, &hash).await?;
        info!("🧑️ Registered user '{login}' with id {id}");
        Ok(id)
    }

    /// Returns the user id for a matching login and password, or [`AuthApiError::InvalidCredentials`].
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<UserId, AuthApiError> {
        if login.is_empty() || password.is_empty() {
            return Err(AuthApiError::EmptyCredentials);
        }
        let hash = hash_password(login, password);
        match self.db.fetch_user_id(login, &hash).await? {
            Some(id) => Ok(id),
            None => {
                debug!("🧑️ Failed login attempt for '{login}'");
                Err(AuthApiError::InvalidCredentials)
            },
        }
    }
}
