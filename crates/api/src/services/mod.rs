//! Application services.

pub mod admin_bootstrap;
pub mod auth;
pub mod cookies;
pub mod uploads;

pub use admin_bootstrap::bootstrap_admin;
pub use auth::{create_session_keys, AuthError, AuthService};
pub use cookies::SessionCookies;
pub use uploads::{UploadError, UploadStore};
