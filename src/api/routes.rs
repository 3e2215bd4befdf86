//! Route definitions for the API.

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use utoipa_swagger_ui::SwaggerUi;

use super::handlers;
use super::middleware::auth::auth_middleware;
use super::SharedState;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    let openapi = super::openapi::build_openapi();

    // Entity routes behind authentication.
    let protected_crud = Router::new()
        .nest("/role", handlers::roles::router())
        .nest("/company", handlers::companies::router())
        .nest("/site", handlers::sites::router())
        .nest("/projtype", handlers::project_types::router())
        .nest("/projinfo", handlers::projects::router())
        .nest("/access", handlers::access::router())
        .nest("/user", handlers::users::protected_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Signup, email verification, and events are reachable without a token.
    let public_crud = Router::new()
        .nest("/user", handlers::users::public_router())
        .nest("/event", handlers::events::router());

    let console = handlers::admin::router().layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(handlers::health::health_check))
        .nest("/api/auth", handlers::auth::router())
        .nest("/api/crud", protected_crud.merge(public_crud))
        .nest("/api/superadmin", console)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .with_state(state)
}
