//! Shared utilities and common types for the ReWear backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Session tokens (RS256 JWT)
//! - Password hashing with Argon2id
//! - Hashing and donation reference codes
//! - Page-number pagination
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
