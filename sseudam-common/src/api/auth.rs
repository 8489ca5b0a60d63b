//! Bearer token signing and verification
//!
//! # Token Format
//!
//! `<user_id>.<expires_ms>.<signature>` where:
//! - `expires_ms` is the expiry as Unix epoch milliseconds
//! - `signature` is SHA-256 (64 lowercase hex chars) of `<secret>:<user_id>:<expires_ms>`
//! - The signing secret is stored in the `settings` table under
//!   [`SIGNING_SECRET_KEY`] and generated on first start
//!
//! # Pure Functions
//!
//! Apart from secret loading, everything here is pure. HTTP framework glue
//! (header extraction, status codes) lives in the service crates.

use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::time::now_ms;

/// Settings key holding the token signing secret
pub const SIGNING_SECRET_KEY: &str = "token_signing_secret";

/// Prefix of the `Authorization` header value
pub const BEARER_PREFIX: &str = "Bearer ";

// ========================================
// Error Types
// ========================================

/// Token verification error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token does not have the `<user>.<expires>.<signature>` shape
    Malformed(String),

    /// Token expiry is in the past
    Expired { expires_ms: i64, now_ms: i64 },

    /// Signature does not match the calculated value
    InvalidSignature,

    /// Database error loading the signing secret
    DatabaseError(String),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed(reason) => write!(f, "Malformed token: {}", reason),
            TokenError::Expired { expires_ms, now_ms } => write!(
                f,
                "Token expired {}ms ago",
                now_ms.saturating_sub(*expires_ms)
            ),
            TokenError::InvalidSignature => write!(f, "Invalid token signature"),
            TokenError::DatabaseError(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for TokenError {}

// ========================================
// Signing Secret Management
// ========================================

/// Load the signing secret from database settings
///
/// Generates and stores a new secret if none exists yet.
pub async fn load_signing_secret(db: &SqlitePool) -> Result<String, TokenError> {
    let result: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(SIGNING_SECRET_KEY)
        .fetch_optional(db)
        .await
        .map_err(|e| TokenError::DatabaseError(e.to_string()))?;

    match result {
        Some((value,)) if !value.trim().is_empty() => Ok(value),
        _ => initialize_signing_secret(db).await,
    }
}

/// Generate a random 256-bit secret and store it
pub async fn initialize_signing_secret(db: &SqlitePool) -> Result<String, TokenError> {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let secret: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(SIGNING_SECRET_KEY)
        .bind(&secret)
        .execute(db)
        .await
        .map_err(|e| TokenError::DatabaseError(e.to_string()))?;

    Ok(secret)
}

// ========================================
// Signing
// ========================================

/// Calculate the token signature
///
/// # Examples
///
/// ```
/// use sseudam_common::api::auth::calculate_signature;
///
/// let sig = calculate_signature("user-1", 1730000000000, "secret");
/// assert_eq!(sig.len(), 64);
/// ```
pub fn calculate_signature(user_id: &str, expires_ms: i64, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}:{}", secret, user_id, expires_ms).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issue a token for `user_id` that expires at `expires_ms`
pub fn issue_token_until(user_id: &str, expires_ms: i64, secret: &str) -> String {
    format!(
        "{}.{}.{}",
        user_id,
        expires_ms,
        calculate_signature(user_id, expires_ms, secret)
    )
}

/// Issue a token for `user_id` valid for `ttl_ms` from now
///
/// # Examples
///
/// ```
/// use sseudam_common::api::auth::{issue_token, verify_token};
///
/// let token = issue_token("user-1", 60_000, "secret");
/// assert_eq!(verify_token(&token, "secret").unwrap(), "user-1");
/// ```
pub fn issue_token(user_id: &str, ttl_ms: i64, secret: &str) -> String {
    issue_token_until(user_id, now_ms().saturating_add(ttl_ms), secret)
}

// ========================================
// Verification
// ========================================

/// Verify a token against the current clock, returning the user id
pub fn verify_token(token: &str, secret: &str) -> Result<String, TokenError> {
    verify_token_at(token, secret, now_ms())
}

/// Verify a token against an explicit clock value
pub fn verify_token_at(token: &str, secret: &str, now_ms: i64) -> Result<String, TokenError> {
    // User ids may contain dots, so split from the right
    let mut parts = token.rsplitn(3, '.');
    let signature = parts
        .next()
        .ok_or_else(|| TokenError::Malformed("empty token".to_string()))?;
    let expires = parts
        .next()
        .ok_or_else(|| TokenError::Malformed("missing expiry".to_string()))?;
    let user_id = parts
        .next()
        .ok_or_else(|| TokenError::Malformed("missing user id".to_string()))?;

    if user_id.is_empty() {
        return Err(TokenError::Malformed("empty user id".to_string()));
    }

    let expires_ms: i64 = expires
        .parse()
        .map_err(|_| TokenError::Malformed(format!("expiry is not a number: {}", expires)))?;

    let calculated = calculate_signature(user_id, expires_ms, secret);
    if !constant_time_eq(signature.as_bytes(), calculated.as_bytes()) {
        return Err(TokenError::InvalidSignature);
    }

    if expires_ms < now_ms {
        return Err(TokenError::Expired { expires_ms, now_ms });
    }

    Ok(user_id.to_string())
}

/// Extract the token from an `Authorization: Bearer <token>` header value
///
/// Returns `None` if the prefix is missing or the token is blank.
pub fn parse_bearer(header_value: &str) -> Option<&str> {
    let token = header_value.strip_prefix(BEARER_PREFIX)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef";

    #[test]
    fn test_signature_is_hex_sha256() {
        let sig = calculate_signature("user-1", 1_730_000_000_000, SECRET);
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));

        // Deterministic
        assert_eq!(sig, calculate_signature("user-1", 1_730_000_000_000, SECRET));

        // Any input change alters the signature
        assert_ne!(sig, calculate_signature("user-2", 1_730_000_000_000, SECRET));
        assert_ne!(sig, calculate_signature("user-1", 1_730_000_000_001, SECRET));
        assert_ne!(sig, calculate_signature("user-1", 1_730_000_000_000, "other"));
    }

    #[test]
    fn test_valid_token_accepted() {
        let token = issue_token_until("uid-abc", 2_000, SECRET);
        assert_eq!(verify_token_at(&token, SECRET, 1_000).unwrap(), "uid-abc");
    }

    #[test]
    fn test_user_id_with_dots() {
        let token = issue_token_until("first.last", 2_000, SECRET);
        assert_eq!(verify_token_at(&token, SECRET, 1_000).unwrap(), "first.last");
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token_until("uid-abc", 1_000, SECRET);
        let err = verify_token_at(&token, SECRET, 1_001).unwrap_err();
        assert_eq!(
            err,
            TokenError::Expired {
                expires_ms: 1_000,
                now_ms: 1_001
            }
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token_until("uid-abc", 2_000, SECRET);
        assert_eq!(
            verify_token_at(&token, "another-secret", 1_000),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_tampered_user_rejected() {
        let token = issue_token_until("uid-abc", 2_000, SECRET);
        let forged = token.replacen("uid-abc", "uid-xyz", 1);
        assert_eq!(
            verify_token_at(&forged, SECRET, 1_000),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        for token in ["", "abc", "abc.def", ".123.sig", "uid.notanumber.sig"] {
            assert!(
                matches!(verify_token_at(token, SECRET, 0), Err(TokenError::Malformed(_))),
                "token {:?} should be malformed",
                token
            );
        }
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc.1.sig"), Some("abc.1.sig"));
        assert_eq!(parse_bearer("Bearer   padded  "), Some("padded"));
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("Basic abc"), None);
        assert_eq!(parse_bearer("abc.1.sig"), None);
    }

    #[tokio::test]
    async fn test_signing_secret_generated_once() {
        let pool = crate::db::init::init_memory_database().await.unwrap();

        let first = load_signing_secret(&pool).await.unwrap();
        assert_eq!(first.len(), 64);

        let second = load_signing_secret(&pool).await.unwrap();
        assert_eq!(first, second, "secret must be stable once stored");
    }
}
