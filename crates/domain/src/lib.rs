//! Domain layer for the Inventory Log Steward backend.
//!
//! This crate contains:
//! - Domain models (operation descriptors, previews, audit entries)
//! - Business logic services (filter normalization, safety gating,
//!   confirmation resolution)
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;
