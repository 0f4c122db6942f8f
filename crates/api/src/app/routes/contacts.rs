use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use bridgecms_content::ContactInput;

use crate::app::dto::{
    ApiJson, ApiQuery, ContactListQuery, ContactListResponse, ContactSubmittedResponse, UpdateContactStatusRequest,
};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn submit(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<ContactInput>,
) -> Result<impl IntoResponse, ApiError> {
    let contact_id = services.contacts.submit(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ContactSubmittedResponse {
            message: "Contact form submitted successfully",
            contact_id,
        }),
    ))
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    ApiQuery(query): ApiQuery<ContactListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = services
        .contacts
        .list(&principal, query.status(), query.page, query.limit)
        .await?;
    Ok(Json(ContactListResponse::from(page)))
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    principal: PrincipalContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateContactStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = services
        .contacts
        .update_status(&principal, &id, body.status.as_deref())
        .await?;
    Ok(Json(contact))
}
