pub mod auth;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;
pub mod utils;
pub mod workspace;

pub use auth::AuthService;
pub use state::AppState;
pub use utils::{ApiError, ApiResult, Config};

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;

/// Assemble the full router over `state`.
///
/// Guard chain for workspace-scoped routes, in execution order: workspace
/// resolver, authentication guard, identity loader, workspace authorization
/// guard. Each stage short-circuits with its own error response, so handlers
/// never re-check authentication or membership.
pub fn app(state: AppState) -> Router {
    // Public routes. Logout lives here rather than behind the authentication
    // guard: it destroys whatever cookie is presented and must succeed even
    // when the session is already gone.
    let public_routes = Router::new()
        .route("/health", get(middleware::health_check))
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/logout", post(handlers::auth::logout));

    // Routes that need an authenticated identity but no target workspace.
    let identity_routes = Router::new()
        .route("/api/v1/auth/me", get(handlers::auth::me))
        .route(
            "/api/v1/workspaces",
            get(handlers::workspaces::list_workspaces)
                .post(handlers::workspaces::create_workspace),
        )
        .layer(
            ServiceBuilder::new()
                .layer(from_fn_with_state(state.clone(), auth::require_session))
                .layer(from_fn_with_state(state.clone(), auth::load_identity)),
        );

    // Workspace-scoped resources behind the full guard chain.
    let workspace_routes = Router::new()
        .route(
            "/api/v1/offers",
            get(handlers::offers::list_offers).post(handlers::offers::create_offer),
        )
        .route(
            "/api/v1/offers/:id",
            get(handlers::offers::get_offer)
                .patch(handlers::offers::update_offer)
                .delete(handlers::offers::delete_offer),
        )
        .route("/api/v1/channels", get(handlers::workspaces::list_channels))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(workspace::resolve_workspace))
                .layer(from_fn_with_state(state.clone(), auth::require_session))
                .layer(from_fn_with_state(state.clone(), auth::load_identity))
                .layer(from_fn(workspace::require_workspace)),
        );

    Router::new()
        .merge(public_routes)
        .merge(identity_routes)
        .merge(workspace_routes)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::trace_layer())
                .layer(middleware::request_id_layer())
                .layer(middleware::cors_layer(&state.config)),
        )
        .with_state(state)
}
