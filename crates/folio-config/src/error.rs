//! Error types for configuration loading and secret handling.

use argon2::password_hash::Error as PasswordHashError;
use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Environment variable that failed validation.
        field: &'static str,
        /// Offending value when it is safe to echo.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// Only one half of the admin credentials was provided.
    #[error("incomplete admin credentials")]
    IncompleteCredentials {
        /// Variable that is missing.
        missing: &'static str,
    },
    /// Failed to hash secret material.
    #[error("failed to hash secret material")]
    SecretHashFailed {
        /// Hashing error detail.
        detail: PasswordHashError,
    },
    /// Stored secret hash payload was invalid.
    #[error("invalid stored hash")]
    StoredHashInvalid {
        /// Hash parsing error detail.
        detail: PasswordHashError,
    },
    /// Secret verification failed.
    #[error("failed to verify secret")]
    SecretVerifyFailed {
        /// Verification error detail.
        detail: PasswordHashError,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
