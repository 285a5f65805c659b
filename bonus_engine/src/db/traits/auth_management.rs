use crate::{db_types::UserId, AuthApiError};

/// The `AuthManagement` trait defines the storage side of user registration and login.
///
/// Backends only ever see password digests. Hashing happens in [`crate::AuthApi`].
#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    /// Stores a new user. If the login is already taken, [`AuthApiError::DuplicateLogin`] is returned and nothing is
    /// written.
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<UserId, AuthApiError>;

    /// Returns the id of the user whose login *and* password digest both match, or `None`.
    async fn fetch_user_id(&self, login: &str, password_hash: &str) -> Result<Option<UserId>, AuthApiError>;
}
