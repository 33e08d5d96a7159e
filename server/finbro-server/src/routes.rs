use crate::handlers::{auth, health, users};
use crate::server::FinbroServer;
use axum::{
    routing::{get, post},
    Router,
};

/// Route paths, kept in one place so tests and handlers agree
pub mod paths {
    pub const API_V1: &str = "/api/v1";

    pub mod health {
        pub const ROOT: &str = "/";
        pub const CHECK: &str = "/health";
    }

    pub mod auth {
        pub const BASE: &str = "/auth";
        pub const REGISTER: &str = "/register";
        pub const LOGIN: &str = "/login";
        pub const REFRESH: &str = "/refresh";
        pub const GOOGLE: &str = "/google";
        pub const GOOGLE_CALLBACK: &str = "/google/callback";
    }

    pub mod users {
        pub const BASE: &str = "/users";
        pub const PROFILE: &str = "/profile";
    }
}

fn auth_routes() -> Router<FinbroServer> {
    Router::new()
        .route(paths::auth::REGISTER, post(auth::register))
        .route(paths::auth::LOGIN, post(auth::login))
        .route(paths::auth::REFRESH, post(auth::refresh))
        .route(paths::auth::GOOGLE, get(auth::google_login))
        .route(paths::auth::GOOGLE_CALLBACK, get(auth::google_callback))
}

fn user_routes() -> Router<FinbroServer> {
    Router::new().route(
        paths::users::PROFILE,
        get(users::get_profile).put(users::update_profile),
    )
}

pub fn create_routes() -> Router<FinbroServer> {
    let api = Router::new()
        .nest(paths::auth::BASE, auth_routes())
        .nest(paths::users::BASE, user_routes());

    Router::new()
        .route(paths::health::ROOT, get(health::welcome))
        .route(paths::health::CHECK, get(health::health_check))
        .nest(paths::API_V1, api)
}
