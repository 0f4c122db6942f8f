//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services/`: the operations behind each route group
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs and the JSON/query extractors
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{
        header::{self, HeaderValue},
        Method,
    },
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use bridgecms_auth::{Argon2Hasher, Hs256Jwt, PasswordHasher};
use bridgecms_infra::{InMemoryStore, LogNotifier, Notifier, PostgresStore, SmtpNotifier};

use crate::config::Config;
use crate::middleware::{self, AuthState, RateLimiter};
use crate::seed;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::{AppServices, ServiceDeps, Stores};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Connects the configured store, picks the notifier and seeds demo data
/// when enabled.
pub async fn build_app(config: &Config) -> anyhow::Result<Router> {
    let stores = if config.use_persistent_stores {
        let store = PostgresStore::connect(&config.database_url)
            .await
            .context("failed to connect to postgres")?;
        store.migrate().await.context("failed to run migrations")?;
        tracing::info!("using postgres stores");
        Stores::from_backend(Arc::new(store))
    } else {
        tracing::info!("using in-memory stores");
        Stores::from_backend(Arc::new(InMemoryStore::new()))
    };

    let notifier: Arc<dyn Notifier> = match config.smtp_settings() {
        Some(settings) => Arc::new(SmtpNotifier::new(settings).context("invalid smtp settings")?),
        None => {
            tracing::warn!("SMTP credentials not set; emails will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());

    if config.seed.enabled {
        seed::seed_demo_data(&stores, hasher.clone(), &config.seed)
            .await
            .context("failed to seed demo data")?;
    }

    let services = Arc::new(AppServices::new(ServiceDeps {
        stores,
        jwt: Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes())),
        hasher,
        notifier,
        admin_email: config.admin_email.clone(),
        environment: config.app_env.clone(),
    }));

    router(config, services)
}

/// Mount the API and the cross-cutting layers around prebuilt services.
pub fn router(config: &Config, services: Arc<AppServices>) -> anyhow::Result<Router> {
    let auth_state = AuthState {
        jwt: services.jwt_validator(),
    };
    let limiter = Arc::new(RateLimiter::new(config.rate_limit));

    let origin = HeaderValue::from_str(&config.frontend_url)
        .with_context(|| format!("FRONTEND_URL is not a valid origin: {}", config.frontend_url))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let mut app = Router::new()
        .nest("/api", routes::router())
        .fallback(routes::system::not_found)
        .layer(CatchPanicLayer::custom(errors::panic_response));

    if config.is_development() {
        app = app.layer(axum::middleware::from_fn(middleware::expose_error_detail));
    }

    Ok(app
        .layer(axum::middleware::from_fn_with_state(limiter, middleware::rate_limit))
        .layer(Extension(auth_state))
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                )),
        ))
}
