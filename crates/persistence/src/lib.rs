//! Persistence layer for the Playtrack backend.
//!
//! This crate contains:
//! - Database connection management (MySQL and SQLite through sqlx `Any`)
//! - Schema descriptors, dialect-aware DDL and the versioned patch migrator
//! - The serialized transaction executor and concrete write transactions
//! - Entity definitions (database row mappings)
//! - Read-only query objects

pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod migrations;
pub mod queries;
pub mod schema;
pub mod sql;
pub mod transactions;
