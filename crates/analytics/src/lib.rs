//! Analytics layer for the Playtrack backend.
//!
//! This crate contains:
//! - Configuration loading (files + environment) and logging setup
//! - Insight builders composing queries and metric mutators into reports

pub mod config;
pub mod logging;
pub mod reports;
