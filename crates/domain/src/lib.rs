//! Domain layer for the Playtrack backend.
//!
//! This crate contains:
//! - Domain models (Server, Player, Session, TpsSample, ...)
//! - Pure metric computations (mutators, activity index, trends)
//!
//! Nothing in this crate performs I/O; all inputs are already-fetched data.

pub mod models;
pub mod services;
