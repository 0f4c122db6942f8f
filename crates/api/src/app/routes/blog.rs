use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use bridgecms_content::BlogPostInput;

use crate::app::dto::{ApiJson, ApiQuery, BlogListQuery, BlogListResponse, MessageResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// `GET /:key` reads by slug; `PUT`/`DELETE /:key` address the post id.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/:key", get(get_post).put(update_post).delete(delete_post))
}

pub async fn list_posts(
    Extension(services): Extension<Arc<AppServices>>,
    ApiQuery(query): ApiQuery<BlogListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = services.blog.list(query.filter()?, query.page, query.limit).await?;
    Ok(Json(BlogListResponse::from(page)))
}

pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(services.blog.get_by_slug(&slug).await?))
}

pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    ApiJson(body): ApiJson<BlogPostInput>,
) -> Result<impl IntoResponse, ApiError> {
    let post = services.blog.create(&principal, body).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<BlogPostInput>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(services.blog.update(&principal, &id, body).await?))
}

pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    services.blog.delete(&principal, &id).await?;
    Ok(Json(MessageResponse {
        message: "Blog post deleted successfully",
    }))
}
