//! Shared utilities and common types for the Inventory Log Steward backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Log-timestamp string handling (the platform's char(14) format)
//! - Common validation logic
//! - Offset pagination types

pub mod pagination;
pub mod timestamp;
pub mod validation;
