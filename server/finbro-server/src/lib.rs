//! Finbro HTTP server
//!
//! Exposes the authentication flows under `/api/v1`: password registration
//! and login, Google sign-in, session refresh and the signed-in user's
//! profile.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod validation;

pub use config::{Environment, ServerConfig};
pub use error::{api_success, ApiError, ApiResponse};
pub use middleware::AuthenticatedUser;
pub use server::FinbroServer;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the application router around shared server state
pub fn create_app(server: FinbroServer) -> Router {
    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(server)
}
