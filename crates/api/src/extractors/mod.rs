//! Custom Axum extractors.

pub mod session;

pub use session::{AdminUser, DonorUser, OrganizationUser};
