//! Shared utilities for the Playtrack backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Epoch-millisecond time arithmetic
//! - Duration and number formatting
//! - The bounded background task pool

pub mod format;
pub mod tasks;
pub mod time;
