//! Signed bearer token verification
//!
//! Token format: `<user_id>.<expires_ms>.<signature>`; see
//! [`sseudam_common::api::auth`].

use async_trait::async_trait;
use sseudam_common::api::{verify_token, TokenError};
use tracing::debug;

use super::TokenVerifier;
use crate::error::AuthFailure;

pub struct SignedTokenVerifier {
    secret: String,
}

impl SignedTokenVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl TokenVerifier for SignedTokenVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthFailure> {
        verify_token(token, &self.secret).map_err(|e: TokenError| {
            debug!("Token rejected: {}", e);
            AuthFailure::InvalidToken(e.to_string())
        })
    }
}
