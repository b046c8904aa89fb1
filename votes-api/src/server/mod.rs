// Server module - HTTP server setup and routing
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tracing::info;
use votes_ledger::VoteLedger;

use self::state::AppState;
use crate::errors::ServiceError;

/// Create the CORS layer for the configured browser origins
pub fn create_cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Create the Axum application router with all routes and middleware
pub fn create_app(ledger: Arc<VoteLedger>, cors_origins: Vec<HeaderValue>) -> Router {
    let state = AppState { ledger };

    Router::new()
        .route(
            "/votes",
            post(handlers::cast_vote_handler).get(handlers::list_votes_handler),
        )
        .route(
            "/votes/:vote_id",
            delete(handlers::retract_vote_handler),
        )
        .route("/projects/:project_id/tally", get(handlers::tally_handler))
        .route(
            "/projects/:project_id/tally/reconcile",
            post(handlers::reconcile_tally_handler),
        )
        .route(
            "/members/:member_id/quota",
            get(handlers::member_quota_handler),
        )
        .route("/health", get(handlers::health_check))
        .layer(create_cors_layer(cors_origins))
        .with_state(state)
}

/// Run the server on the specified address until `shutdown` resolves
pub async fn run_server<S>(app: Router, addr: SocketAddr, shutdown: S) -> Result<(), ServiceError>
where
    S: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", listener.local_addr()?);
    info!("- Votes endpoint: http://{}/votes", addr);
    info!("- Health endpoint: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
