use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::dto::{ApiJson, LoginRequest, RegisterRequest, RegisterResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = services
        .auth
        .register(body.name.as_deref(), body.email.as_deref(), body.password.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully",
            user_id,
        }),
    ))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = services
        .auth
        .login(body.email.as_deref(), body.password.as_deref())
        .await?;

    Ok(Json(serde_json::json!({
        "token": result.token,
        "user": result.user,
    })))
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(services.auth.me(&principal).await?))
}
