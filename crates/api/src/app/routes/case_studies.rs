use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use bridgecms_content::CaseStudyInput;

use crate::app::dto::{ApiJson, ApiQuery, CaseStudyListQuery, MessageResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_case_studies).post(create_case_study))
        .route(
            "/:key",
            get(get_case_study).put(update_case_study).delete(delete_case_study),
        )
}

pub async fn list_case_studies(
    Extension(services): Extension<Arc<AppServices>>,
    ApiQuery(query): ApiQuery<CaseStudyListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(services.case_studies.list(query.filter()?).await?))
}

pub async fn get_case_study(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(services.case_studies.get_by_slug(&slug).await?))
}

pub async fn create_case_study(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    ApiJson(body): ApiJson<CaseStudyInput>,
) -> Result<impl IntoResponse, ApiError> {
    let study = services.case_studies.create(&principal, body).await?;
    Ok((StatusCode::CREATED, Json(study)))
}

pub async fn update_case_study(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CaseStudyInput>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(services.case_studies.update(&principal, &id, body).await?))
}

pub async fn delete_case_study(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    services.case_studies.delete(&principal, &id).await?;
    Ok(Json(MessageResponse {
        message: "Case study deleted successfully",
    }))
}
