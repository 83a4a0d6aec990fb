//! Persistence layer for the ReWear backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - Query metrics

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
