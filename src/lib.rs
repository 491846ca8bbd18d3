// lib.rs - Gym ratings API
//
// Router assembly and the shared application state. `main` builds the
// Postgres-backed state; integration tests build the same router over
// `MemoryStorage`.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::Storage;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

/// Shared by every handler through `State<AppState>`
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, config: AppConfig) -> Self {
        let tokens = TokenService::new(&config.security);
        Self {
            storage,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        }
    }
}

/// Builds the complete HTTP surface for the given state.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = routes(state.clone()).layer(
        ServiceBuilder::new().layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
    );

    if let Some(cors) = cors_layer(&config) {
        router = router.layer(cors);
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

/// Protected methods get the JWT middleware through `route_layer` on their
/// method router. Methods chained after it on the same path stay public, and
/// unmatched paths still 404 instead of 401.
fn routes(state: AppState) -> Router<AppState> {
    let auth = axum::middleware::from_fn_with_state(state, jwt_auth_middleware);

    Router::new()
        // Public
        .route("/healthcheck", get(public::healthcheck_get))
        .route("/login", get(public::login).post(public::login))
        .route("/gyms", get(public::gyms_get).post(public::gyms_post))
        .route(
            "/gyms/:id",
            get(public::gym_get)
                .put(public::gym_put)
                .delete(public::gym_delete),
        )
        // Mixed: POST requires a token, GET does not
        .route(
            "/gyms/:id/ratings",
            post(protected::gym_ratings_post)
                .route_layer(auth.clone())
                .get(public::gym_ratings_get),
        )
        .route(
            "/accounts",
            get(protected::accounts_get)
                .route_layer(auth)
                .post(public::accounts_post),
        )
}

/// Development with no origins configured is permissive. Other environments
/// only allow the origins listed in `SECURITY_CORS_ORIGINS`, and get no CORS
/// layer at all when that list is empty.
fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }

    let origins = &config.security.cors_origins;
    if origins.is_empty() {
        if config.is_development() {
            return Some(CorsLayer::permissive());
        }
        tracing::warn!("CORS enabled but SECURITY_CORS_ORIGINS is empty; cross-origin requests are not allowed");
        return None;
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
