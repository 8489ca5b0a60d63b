//! API module for shared HTTP API functionality
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Database operations (via sqlx)
//!
//! Each service wraps these with framework-specific code (Axum extractors, etc.).

pub mod auth;

pub use auth::{
    calculate_signature, initialize_signing_secret, issue_token, issue_token_until,
    load_signing_secret, parse_bearer, verify_token, verify_token_at, TokenError,
};
