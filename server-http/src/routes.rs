use crate::handlers;
use crate::middleware::{credentials_guard, require_admin, require_auth};
use crate::state::AppState;
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;

/// Build and configure the application router
pub fn build_router(state: AppState) -> Router {
    let login = Router::new()
        .route("/auth/login", post(handlers::login))
        .route_layer(from_fn_with_state(state.clone(), credentials_guard));

    let authenticated = Router::new()
        .route("/auth/profile", post(handlers::profile))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    // Layers run bottom-up: token check first, then the role check
    let admin = Router::new()
        .route(
            "/accounts",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        .route(
            "/accounts/{id}",
            get(handlers::get_account)
                .patch(handlers::update_account)
                .delete(handlers::delete_account),
        )
        .route("/accounts/{id}/restore", post(handlers::restore_account))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Auth routes
        .route("/auth/register", post(handlers::register))
        .merge(login)
        .merge(authenticated)
        // Account administration
        .merge(admin)
        // Middleware
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
