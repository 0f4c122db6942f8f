use serde::Serialize;
use thiserror::Error;

use crate::{JwtClaims, Role};

/// Every role-gated operation the API exposes.
///
/// Public operations (reading published content, submitting the contact form,
/// registering, logging in) are not listed: they need no token at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ReadProfile,
    ListContacts,
    UpdateContactStatus,
    CreateBlogPost,
    UpdateBlogPost,
    DeleteBlogPost,
    CreateCaseStudy,
    UpdateCaseStudy,
    DeleteCaseStudy,
    ReadSettings,
    WriteSettings,
}

const EVERYONE: &[Role] = &[Role::Admin, Role::Editor, Role::Viewer];
const STAFF: &[Role] = &[Role::Admin, Role::Editor];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// The static route policy: which roles may perform an action.
pub fn allowed_roles(action: Action) -> &'static [Role] {
    match action {
        Action::ReadProfile | Action::ReadSettings => EVERYONE,
        Action::ListContacts
        | Action::UpdateContactStatus
        | Action::CreateBlogPost
        | Action::UpdateBlogPost
        | Action::CreateCaseStudy
        | Action::UpdateCaseStudy => STAFF,
        Action::DeleteBlogPost | Action::DeleteCaseStudy | Action::WriteSettings => ADMIN_ONLY,
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' may not perform this operation")]
    Forbidden { role: Role },
}

/// Check a role against an explicit allow-list.
///
/// - No IO
/// - No panics
pub fn authorize_roles(role: Role, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden { role })
    }
}

/// Check authenticated claims against the policy for `action`.
pub fn authorize(claims: &JwtClaims, action: Action) -> Result<(), AuthzError> {
    authorize_roles(claims.role, allowed_roles(action))
}
