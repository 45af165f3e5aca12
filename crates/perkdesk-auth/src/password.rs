//! Password policy and Argon2id verification.

use argon2::{Argon2, PasswordVerifier};
use perkdesk_core::error::PerkdeskError;

use crate::error::AuthError;

/// Reject passwords shorter than `min_length` characters.
pub fn check_policy(password: &str, min_length: usize) -> Result<(), PerkdeskError> {
    if password.chars().count() < min_length {
        return Err(PerkdeskError::validation(
            "password",
            format!("must be at least {min_length} characters"),
        ));
    }
    Ok(())
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// `pepper`, when set, is prepended to the password and must match the
/// pepper used at hashing time. A malformed stored hash is an error,
/// not a mismatch.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let input = match pepper {
        Some(p) => format!("{p}{password}"),
        None => password.to_owned(),
    };

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(input.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}
