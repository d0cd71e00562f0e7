use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected
        .merge(protected_routes(state.clone()))
        .fallback(not_found)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/users", post(auth::create_account))
        .route("/sessions/password", post(auth::authenticate_with_password))
        .route("/password/recover", post(auth::request_password_recover))
        .route("/password/reset", post(auth::reset_password))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{auth, project};

    Router::new()
        .route("/profile", get(auth::get_profile))
        .route("/projects", post(project::create_project))
        .route(
            "/projects/:projectId",
            get(project::get_project)
                .put(project::update_project)
                .delete(project::delete_project),
        )
        // route_layer: unmatched paths still reach the 404 fallback
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Floki",
        "description": "Organize your projects",
        "version": version,
        "endpoints": {
            "accounts": "POST /users, POST /sessions/password (public)",
            "password": "POST /password/recover, POST /password/reset (public)",
            "profile": "GET /profile (bearer)",
            "projects": "POST /projects, GET|PUT|DELETE /projects/:projectId (bearer)",
            "health": "GET /health (public)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
