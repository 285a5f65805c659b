use blake2::{Blake2b512, Digest};

/// Produces the stored credential digest for a login/password pair.
///
/// The digest is BLAKE2b-512 over the login, a zero byte separator and the password, rendered as lowercase hex. Mixing
/// the login in means two users with the same password do not share a stored hash. The plaintext password is never
/// persisted.
pub fn hash_password(login: &str, password: &str) -> String {
    let mut hasher = Blake2b512::new();
    hasher.update(login.as_bytes());
    hasher.update([0u8]);
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}
