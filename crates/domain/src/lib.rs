//! Domain layer for the ReWear donation platform.
//!
//! This crate contains:
//! - Domain models (donations, organizations, invites, deliveries, board)
//! - Status projection of raw status strings
//! - Lifecycle rules: approval, staging, matching, donor status

pub mod models;
pub mod services;
