/**
 * Password Hashing and Reset Tokens
 *
 * This module handles password hashing/verification and the generation of
 * single-use password-reset tokens.
 *
 * # Security
 *
 * - Passwords are hashed with bcrypt at DEFAULT_COST; the hash is one-way
 *   and salted per password
 * - Reset tokens are 32 random bytes; only the SHA-256 hash of the token is
 *   ever persisted, the plaintext is delivered out-of-band by email
 * - Reset tokens expire 10 minutes after creation
 */

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::ApiError;

/// Reset tokens are valid for 10 minutes after creation
const RESET_TOKEN_TTL_MINUTES: i64 = 10;

/// Hash a plaintext password with bcrypt
///
/// # Arguments
/// * `plain` - Plaintext password
///
/// # Returns
/// The bcrypt hash, or an internal error if hashing fails
pub fn hash_password(plain: &str) -> Result<String, ApiError> {
    hash(plain, DEFAULT_COST).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        ApiError::internal("Failed to hash password")
    })
}

/// Verify a plaintext password against a stored bcrypt hash
///
/// bcrypt performs the comparison internally, so timing does not leak
/// which prefix of the password matched.
pub fn verify_password(plain: &str, hashed: &str) -> Result<bool, ApiError> {
    verify(plain, hashed).map_err(|e| {
        tracing::error!("Password verification error: {:?}", e);
        ApiError::internal("Password verification failed")
    })
}

/// A freshly generated password-reset token
///
/// `plain` is sent to the user by email and never stored; `hash` is what
/// gets persisted and later matched against `hash_reset_token` of the
/// incoming token.
#[derive(Debug)]
pub struct ResetToken {
    /// Hex-encoded plaintext token, delivered out-of-band only
    pub plain: String,
    /// SHA-256 hex digest of the plaintext, the only form that is stored
    pub hash: String,
    /// Expiry timestamp persisted alongside the hash
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    /// Generate a new high-entropy reset token
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);

        let plain = hex::encode(bytes);
        let hash = hash_reset_token(&plain);

        Self {
            plain,
            hash,
            expires_at: Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        }
    }
}

/// Derive the stored hash for a plaintext reset token
///
/// Used both when persisting a new token and when looking up the user for
/// an incoming reset request.
pub fn hash_reset_token(plain: &str) -> String {
    hex::encode(Sha256::digest(plain.as_bytes()))
}
