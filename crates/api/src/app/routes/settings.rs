use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use serde_json::Value;

use crate::app::dto::{ApiJson, MessageResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/", get(get_settings).put(put_settings))
}

pub async fn get_settings(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(services.settings.get_all(&principal).await?))
}

pub async fn put_settings(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    ApiJson(body): ApiJson<BTreeMap<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    services.settings.set_many(&principal, body).await?;
    Ok(Json(MessageResponse {
        message: "Settings updated successfully",
    }))
}
