//! HTTP route handlers.

pub mod admin_donations;
pub mod admin_users;
pub mod auth;
pub mod deliveries;
pub mod donations;
pub mod faq;
pub mod health;
pub mod matching_invites;
pub mod organizations;
pub mod posts;
