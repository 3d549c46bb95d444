use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;
use thiserror::Error;
use zeroize::Zeroizing;

/// Fixed argon2id work factor. Not configurable at runtime.
pub const HASH_MEMORY_KIB: u32 = 19_456;
pub const HASH_ITERATIONS: u32 = 2;
pub const HASH_PARALLELISM: u32 = 1;

/// Errors produced by the credential helpers. Never carries the secret itself.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("secret must not be empty")]
    EmptySecret,
    #[error("invalid hashing parameters")]
    InvalidParams,
    #[error("hashing failure")]
    HashFailure,
}

fn hasher() -> Result<Argon2<'static>, CryptoError> {
    let params = Params::new(HASH_MEMORY_KIB, HASH_ITERATIONS, HASH_PARALLELISM, None)
        .map_err(|_| CryptoError::InvalidParams)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a plaintext secret into a self-describing PHC string.
pub fn hash_secret(plain: &str) -> Result<String, CryptoError> {
    let plain = Zeroizing::new(plain.to_owned());
    if plain.trim().is_empty() {
        return Err(CryptoError::EmptySecret);
    }

    let salt = SaltString::generate(&mut OsRng);
    hasher()?
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| CryptoError::HashFailure)
}

/// Check a plaintext secret against a stored hash. A hash that cannot be
/// parsed never verifies.
pub fn verify_secret(plain: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    let Ok(argon) = hasher() else {
        return false;
    };
    argon.verify_password(plain.as_bytes(), &parsed).is_ok()
}
