//! HTTP routes for the API service.
//!
//! Defines the Axum router, the application state and the route module
//! mounting points.

use crate::auth::JwtValidator;
use crate::config::Config;
use crate::errors::handle_panic;
use crate::handlers;
use crate::middleware::{
    http_metrics_middleware, require_auth, with_security_headers, AuthState,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Maximum accepted request body size (100 KiB).
pub const JSON_BODY_LIMIT_BYTES: usize = 100 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,
}

/// Routes contributed by a feature module.
///
/// `public` is mounted as-is. `protected` is mounted behind the auth gate,
/// so its handlers can take `Extension<Claims>`.
#[derive(Default)]
pub struct RouteModule {
    pub public: Router<Arc<AppState>>,
    pub protected: Router<Arc<AppState>>,
}

impl RouteModule {
    fn into_router(self, auth_state: Arc<AuthState>) -> Router<Arc<AppState>> {
        // `layer` rather than `route_layer`: the latter panics on a router
        // without routes, and either half may be empty.
        self.public.merge(
            self.protected
                .layer(middleware::from_fn_with_state(auth_state, require_auth)),
        )
    }
}

/// Feature modules mounted under `/api`.
#[derive(Default)]
pub struct RouteModules {
    /// Mounted at `/api/auth`.
    pub auth: RouteModule,

    /// Mounted at `/api/files`.
    pub files: RouteModule,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/api` - liveness string - public
/// - `/api/health` - database reachability - public
/// - `/api/protected` - example gated route
/// - `/api/auth`, `/api/files` - route modules
/// - `/metrics` - Prometheus exposition - public
///
/// Global layers, innermost first: body limit, panic catcher, request
/// timeout, trace, CORS, security headers, HTTP metrics.
pub fn build_routes(
    state: Arc<AppState>,
    modules: RouteModules,
    metrics_handle: PrometheusHandle,
) -> Router {
    let jwt_validator = Arc::new(JwtValidator::new(
        state.config.jwt_secret.clone(),
        state.config.jwt_clock_skew_seconds,
    ));
    let auth_state = Arc::new(AuthState { jwt_validator });

    let request_timeout = Duration::from_secs(state.config.request_timeout_seconds);
    let cors = cors_layer(&state.config.cors_allowed_origins);

    let public_routes = Router::new()
        .route("/api", get(handlers::api_root))
        .route("/api/health", get(handlers::health_check));

    let protected_routes = Router::new()
        .route("/api/protected", get(handlers::get_protected))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            require_auth,
        ));

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let app = public_routes
        .merge(protected_routes)
        .nest("/api/auth", modules.auth.into_router(auth_state.clone()))
        .nest("/api/files", modules.files.into_router(auth_state))
        .with_state(state)
        .merge(metrics_routes)
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Metrics layer outermost, so 404/405, gate rejections and timeouts are counted
    with_security_headers(app).layer(middleware::from_fn(http_metrics_middleware))
}

/// CORS policy: any origin unless an allow-list is configured.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        // Origins were validated as header values when the config was loaded
        AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request())
}
