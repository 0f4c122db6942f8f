use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use bridgecms_content::{BlogFilter, BlogPostSummary, CaseStudyFilter, Contact};
use bridgecms_core::{Page, UserId};

use crate::app::errors::ApiError;

// -------------------------
// Extractors
// -------------------------

/// `Json` whose rejection renders as a 400 `bad_request` error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// `Query` whose rejection renders as a 400 `bad_request` error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateContactStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactListQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ContactListQuery {
    pub fn status(&self) -> Option<&str> {
        non_empty(&self.status)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BlogListQuery {
    pub category: Option<String>,
    pub featured: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl BlogListQuery {
    pub fn filter(&self) -> Result<BlogFilter, ApiError> {
        Ok(BlogFilter {
            category: non_empty(&self.category).map(str::to_string),
            featured: featured(&self.featured)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CaseStudyListQuery {
    pub industry: Option<String>,
    pub featured: Option<String>,
}

impl CaseStudyListQuery {
    pub fn filter(&self) -> Result<CaseStudyFilter, ApiError> {
        Ok(CaseStudyFilter {
            industry: non_empty(&self.industry).map(str::to_string),
            featured: featured(&self.featured)?,
        })
    }
}

// `?status=` means no filter.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn featured(value: &Option<String>) -> Result<Option<bool>, ApiError> {
    non_empty(value)
        .map(|v| {
            v.parse::<bool>()
                .map_err(|_| ApiError::BadRequest(format!("featured must be true or false, got `{v}`")))
        })
        .transpose()
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmittedResponse {
    pub message: &'static str,
    pub contact_id: bridgecms_core::ContactId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListResponse {
    pub posts: Vec<BlogPostSummary>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total: u64,
}

impl From<Page<BlogPostSummary>> for BlogListResponse {
    fn from(page: Page<BlogPostSummary>) -> Self {
        Self {
            posts: page.items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            total: page.total,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactListResponse {
    pub contacts: Vec<Contact>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total: u64,
}

impl From<Page<Contact>> for ContactListResponse {
    fn from(page: Page<Contact>) -> Self {
        Self {
            contacts: page.items,
            total_pages: page.total_pages,
            current_page: page.current_page,
            total: page.total,
        }
    }
}
