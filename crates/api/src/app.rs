use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use shared::jwt::JwtConfig;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{
    metrics_handler, metrics_middleware, require_admin, require_session,
    security_headers_middleware, trace_id,
};
use crate::routes::{
    admin_donations, admin_users, auth, deliveries, donations, faq, health, matching_invites,
    organizations, posts,
};
use crate::services::{create_session_keys, AuthService, SessionCookies, UploadStore};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// `None` when the configured key pair could not be loaded.
    pub sessions: Option<Arc<JwtConfig>>,
    pub cookies: SessionCookies,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Self {
        let sessions = match create_session_keys(&config.session) {
            Ok(keys) => Some(Arc::new(keys)),
            Err(e) => {
                tracing::error!("Failed to load session keys, logins disabled: {}", e);
                None
            }
        };

        Self {
            pool,
            cookies: SessionCookies::new(&config.session),
            uploads: UploadStore::new(&config.uploads),
            sessions,
            config: Arc::new(config),
        }
    }

    pub fn auth_service(&self) -> Result<AuthService, ApiError> {
        let sessions = self.sessions.clone().ok_or_else(|| {
            ApiError::ServiceUnavailable("Authentication service unavailable".to_string())
        })?;
        Ok(AuthService::new(self.pool.clone(), sessions))
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    use axum::http::{header, Method};

    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    let headers = [header::CONTENT_TYPE, header::AUTHORIZATION];

    if origins.is_empty() {
        // Development: mirror the caller so cookies still work.
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true)
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let state = AppState::new(config, pool);
    let config = state.config.clone();

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/organs/approved", get(organizations::list_approved))
        .route(
            "/api/organizations/join-requests",
            post(organizations::submit_join_request),
        )
        .route("/api/faq", get(faq::list_faqs))
        // Posts check the session per method inside the handlers.
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/api/posts/:id",
            get(posts::get_post).delete(posts::delete_post),
        );

    // Routes for any signed-in member; role checks happen in the extractors.
    let member_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/donations", post(donations::create_donation))
        .route("/api/donations/status", get(donations::donation_status))
        .route("/api/donations/:id/cancel", put(donations::cancel_donation))
        .route("/api/deliveries", get(deliveries::list_deliveries))
        .route("/api/deliveries/:id", get(deliveries::get_delivery))
        .route(
            "/api/matching-invites",
            get(matching_invites::list_my_invites),
        )
        .route(
            "/api/matching-invites/:id/respond",
            post(matching_invites::respond_invite),
        )
        .route("/api/faq/question", post(faq::ask_question))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let admin_routes = Router::new()
        .route(
            "/api/admin/donations/pending",
            get(admin_donations::list_pending),
        )
        .route(
            "/api/admin/donations/:id/approve",
            post(admin_donations::approve_donation),
        )
        .route(
            "/api/admin/donations/:id/reject",
            post(admin_donations::reject_donation),
        )
        .route(
            "/api/admin/donations/auto-match",
            get(admin_donations::list_auto_match),
        )
        .route(
            "/api/admin/donations/organs",
            get(admin_donations::list_organs),
        )
        .route(
            "/api/admin/donations/:id/assign",
            post(admin_donations::assign_organization),
        )
        .route(
            "/api/admin/matching-invites",
            get(matching_invites::list_all_invites),
        )
        .route(
            "/api/admin/organizations/join-requests",
            get(organizations::list_join_requests),
        )
        .route(
            "/api/admin/organizations/join-requests/:id/approve",
            post(organizations::approve_join_request),
        )
        .route(
            "/api/admin/organizations/join-requests/:id/reject",
            post(organizations::reject_join_request),
        )
        .route("/api/admin/deliveries/:id", put(deliveries::update_delivery))
        .route("/api/admin/faq/:id/answer", post(faq::answer_question))
        .route("/api/admin/users", get(admin_users::list_users))
        .route("/api/admin/users/:id", delete(admin_users::delete_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let uploads = ServeDir::new(state.uploads.dir());
    let uploads_prefix = state.uploads.public_prefix().to_string();

    Router::new()
        .merge(public_routes)
        .merge(member_routes)
        .merge(admin_routes)
        .nest_service(&uploads_prefix, uploads)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state)
}
