//! # SSEUDAM Common Library
//!
//! Shared code for the SSEUDAM recycling services including:
//! - Ranking ledger and analysis record persistence (SQLite)
//! - Grade (tier) table
//! - Topic event bus and SSE streaming for live updates
//! - Bearer token signing and verification
//! - Configuration loading

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod grade;
pub mod sse;
pub mod time;

pub use error::{Error, Result};
pub use events::{TopicBus, TopicMessage};
pub use grade::{GradeTable, GradeTier};
