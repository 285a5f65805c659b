//! Access tokens.
//!
//! A token is the hex encoding of the user id (8 bytes, little-endian) followed by an HMAC-SHA256 tag over those 8
//! bytes, keyed with the server's signing key. Tokens carry no expiry; they stay valid for as long as the signing key
//! does.
use std::future::{ready, Ready};

use actix_web::{
    dev::Payload,
    http::header::AUTHORIZATION,
    FromRequest,
    HttpMessage,
    HttpRequest,
};
use bonus_engine::db_types::UserId;
use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

pub const TOKEN_COOKIE: &str = "token";
const USER_ID_LENGTH: usize = 8;
const TAG_LENGTH: usize = 32;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct TokenManager {
    mac: HmacSha256,
}

impl TokenManager {
    pub fn new(config: &AuthConfig) -> Result<Self, ServerError> {
        let mac = HmacSha256::new_from_slice(config.token_key.reveal())
            .map_err(|e| ServerError::ConfigurationError(format!("Invalid token signing key. {e}")))?;
        Ok(Self { mac })
    }

    pub fn issue_token(&self, user: UserId) -> String {
        let id_bytes = user.value().to_le_bytes();
        let mut mac = self.mac.clone();
        mac.update(&id_bytes);
        let tag = mac.finalize().into_bytes();
        let mut token = Vec::with_capacity(USER_ID_LENGTH + TAG_LENGTH);
        token.extend_from_slice(&id_bytes);
        token.extend_from_slice(&tag);
        hex::encode(token)
    }

    pub fn verify_token(&self, token: &str) -> Result<UserId, AuthError> {
        let bytes = hex::decode(token.trim()).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if bytes.len() != USER_ID_LENGTH + TAG_LENGTH {
            let expected = USER_ID_LENGTH + TAG_LENGTH;
            return Err(AuthError::InvalidToken(format!("Expected {expected} bytes, got {}", bytes.len())));
        }
        let (id_bytes, tag) = bytes.split_at(USER_ID_LENGTH);
        let mut mac = self.mac.clone();
        mac.update(id_bytes);
        mac.verify_slice(tag).map_err(|_| AuthError::InvalidToken("Signature mismatch".into()))?;
        let mut id = [0u8; USER_ID_LENGTH];
        id.copy_from_slice(id_bytes);
        Ok(UserId::from(i64::from_le_bytes(id)))
    }
}

/// Finds the access token in a request: the `Authorization: Bearer` header wins over the `token` cookie.
pub fn token_from_request(req: &HttpRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    from_header.or_else(|| req.cookie(TOKEN_COOKIE).map(|c| c.value().to_string()))
}

/// The user a request was authenticated as. The token middleware puts it in the request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    pub fn id(&self) -> UserId {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().copied();
        if user.is_none() {
            warn!("🔐️ Route expected an authenticated user, but none was attached to the request");
        }
        ready(user.ok_or(ServerError::AuthenticationError(AuthError::MissingToken)))
    }
}
