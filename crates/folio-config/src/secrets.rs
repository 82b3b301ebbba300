//! Argon2 hashing for the admin password.

use argon2::Argon2;
use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    rand_core::OsRng,
};

use crate::error::{ConfigError, ConfigResult};

/// Hash `input` into a PHC string suitable for `FOLIO_ADMIN_PASSWORD_HASH`.
///
/// # Errors
///
/// Returns [`ConfigError::SecretHashFailed`] if hashing fails.
pub fn hash_secret(input: &str) -> ConfigResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon = Argon2::default();
    let hash = argon
        .hash_password(input.as_bytes(), &salt)
        .map_err(|detail| ConfigError::SecretHashFailed { detail })?;
    Ok(hash.to_string())
}

/// Check `candidate` against a stored PHC hash.
///
/// # Errors
///
/// Returns [`ConfigError::StoredHashInvalid`] when the stored hash does not
/// parse and [`ConfigError::SecretVerifyFailed`] for verifier failures other
/// than a mismatch.
pub fn verify_secret(expected_hash: &str, candidate: &str) -> ConfigResult<bool> {
    let parsed = PasswordHash::new(expected_hash)
        .map_err(|detail| ConfigError::StoredHashInvalid { detail })?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(detail) => Err(ConfigError::SecretVerifyFailed { detail }),
    }
}

pub(crate) fn check_hash(expected_hash: &str) -> ConfigResult<()> {
    PasswordHash::new(expected_hash)
        .map(|_| ())
        .map_err(|detail| ConfigError::StoredHashInvalid { detail })
}
