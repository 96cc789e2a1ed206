//! Persistence layer for the Inventory Log Steward backend.
//!
//! This crate contains:
//! - Multi-region database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations, including the transactional
//!   archive/delete execution paths

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
