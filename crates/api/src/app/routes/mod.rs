use axum::{
    routing::{get, patch, post},
    Router,
};

pub mod auth;
pub mod blog;
pub mod case_studies;
pub mod contacts;
pub mod settings;
pub mod system;

/// Router for every `/api` endpoint. Authentication is per handler, via the
/// `PrincipalContext` extractor.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/auth", auth::router())
        .route("/contact", post(contacts::submit))
        .route("/contacts", get(contacts::list))
        .route("/contacts/:id", patch(contacts::update_status))
        .nest("/blog", blog::router())
        .nest("/case-studies", case_studies::router())
        .nest("/settings", settings::router())
}
