//! Admin bootstrap service for initial setup.
//!
//! Creates the first admin account on startup if configured via environment
//! variables. Existing accounts are never modified.

use persistence::repositories::UserRepository;
use shared::password::{hash_password, PasswordError};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;

/// Error types for admin bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),
}

/// What a bootstrap run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    NotConfigured,
    MissingPassword,
    AlreadyExists,
    Created,
}

/// Decides whether the configuration asks for a bootstrap at all.
fn precheck(config: &AdminBootstrapConfig) -> Option<BootstrapOutcome> {
    if config.bootstrap_username.trim().is_empty() {
        return Some(BootstrapOutcome::NotConfigured);
    }
    if config.bootstrap_password.is_empty() {
        return Some(BootstrapOutcome::MissingPassword);
    }
    None
}

/// Bootstrap the admin account if configured and not already present.
///
/// Called after migrations on startup. Idempotent.
pub async fn bootstrap_admin(
    pool: &PgPool,
    config: &AdminBootstrapConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    if let Some(outcome) = precheck(config) {
        if outcome == BootstrapOutcome::MissingPassword {
            warn!(
                "RW__ADMIN__BOOTSTRAP_USERNAME is set but RW__ADMIN__BOOTSTRAP_PASSWORD is empty - skipping bootstrap"
            );
        }
        return Ok(outcome);
    }

    let username = config.bootstrap_username.trim();
    let password_hash = hash_password(&config.bootstrap_password)?;
    let created = UserRepository::new(pool.clone())
        .ensure_admin(username, &password_hash)
        .await?;

    if !created {
        info!(username = %username, "Admin account already exists - skipping bootstrap");
        return Ok(BootstrapOutcome::AlreadyExists);
    }

    info!(username = %username, "Bootstrap admin account created");
    warn!(
        "SECURITY: Remove RW__ADMIN__BOOTSTRAP_USERNAME and RW__ADMIN__BOOTSTRAP_PASSWORD \
         from configuration after initial setup"
    );
    Ok(BootstrapOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(username: &str, password: &str) -> AdminBootstrapConfig {
        AdminBootstrapConfig {
            bootstrap_username: username.into(),
            bootstrap_password: password.into(),
        }
    }

    #[test]
    fn test_not_configured_by_default() {
        assert_eq!(
            precheck(&AdminBootstrapConfig::default()),
            Some(BootstrapOutcome::NotConfigured)
        );
        assert_eq!(
            precheck(&config("   ", "secret")),
            Some(BootstrapOutcome::NotConfigured)
        );
    }

    #[test]
    fn test_missing_password_skips() {
        assert_eq!(
            precheck(&config("admin", "")),
            Some(BootstrapOutcome::MissingPassword)
        );
    }

    #[test]
    fn test_configured_runs() {
        assert_eq!(precheck(&config("admin", "rewear-admin-1")), None);
    }

    #[tokio::test]
    async fn test_unconfigured_bootstrap_never_touches_database() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://nobody@localhost:1/none")
            .unwrap();
        let outcome = bootstrap_admin(&pool, &AdminBootstrapConfig::default())
            .await
            .unwrap();
        assert_eq!(outcome, BootstrapOutcome::NotConfigured);
    }
}
