//! Test Helper Utilities
//!
//! Shared utilities for testing sseudam-ar

#![allow(dead_code)]

pub mod app;
pub mod fakes;

pub use app::{bearer_for, post_analysis, seed_account, wait_until, TestApp, SECRET};
pub use fakes::{FailingLedger, FailingLive, RecordingDisplay, SlowLedger};
