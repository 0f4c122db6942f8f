//! Application services: the operations behind each route group.
//!
//! Services validate input, enforce the role policy and talk to the store and
//! notifier ports. They know nothing about HTTP; `errors.rs` maps
//! [`ServiceError`] onto responses.

use std::sync::Arc;

use thiserror::Error;

use bridgecms_auth::{
    Action, AuthError, AuthzError, JwtValidator, PasswordError, PasswordHasher, TokenError, authorize,
};
use bridgecms_core::{DomainError, ValidationErrors};
use bridgecms_infra::{
    BlogStore, CaseStudyStore, ContactStore, Notifier, SettingsStore, StoreError, UserStore,
};

use crate::context::PrincipalContext;

pub mod auth;
pub mod blog;
pub mod case_studies;
pub mod contacts;
pub mod settings;

pub use auth::{AuthService, LoginResult};
pub use blog::BlogService;
pub use case_studies::CaseStudyService;
pub use contacts::ContactService;
pub use settings::SettingsService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Domain(DomainError::Validation(value))
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Duplicate(field) => {
                Self::Domain(DomainError::conflict(format!("{field} already exists")))
            }
            StoreError::Backend(msg) => Self::Internal(msg),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(value: PasswordError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(value: TokenError) -> Self {
        Self::Internal(value.to_string())
    }
}

/// Policy check shared by every gated operation.
pub(crate) fn require(principal: &PrincipalContext, action: Action) -> ServiceResult<()> {
    authorize(principal.claims(), action)?;
    Ok(())
}

/// Store handles, one per collection.
///
/// Usually all point at the same backend; see [`Stores::from_backend`].
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub contacts: Arc<dyn ContactStore>,
    pub blog: Arc<dyn BlogStore>,
    pub case_studies: Arc<dyn CaseStudyStore>,
    pub settings: Arc<dyn SettingsStore>,
}

impl Stores {
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: UserStore + ContactStore + BlogStore + CaseStudyStore + SettingsStore + 'static,
    {
        Self {
            users: backend.clone(),
            contacts: backend.clone(),
            blog: backend.clone(),
            case_studies: backend.clone(),
            settings: backend,
        }
    }
}

/// Everything a request handler may need, built once at startup.
pub struct AppServices {
    pub environment: String,
    pub auth: AuthService,
    pub contacts: ContactService,
    pub blog: BlogService,
    pub case_studies: CaseStudyService,
    pub settings: SettingsService,
}

/// Collaborators needed to build [`AppServices`].
pub struct ServiceDeps {
    pub stores: Stores,
    pub jwt: Arc<bridgecms_auth::Hs256Jwt>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub notifier: Arc<dyn Notifier>,
    pub admin_email: String,
    pub environment: String,
}

impl AppServices {
    pub fn new(deps: ServiceDeps) -> Self {
        let ServiceDeps {
            stores,
            jwt,
            hasher,
            notifier,
            admin_email,
            environment,
        } = deps;

        Self {
            environment,
            auth: AuthService::new(stores.users.clone(), hasher, jwt),
            contacts: ContactService::new(stores.contacts.clone(), notifier, admin_email),
            blog: BlogService::new(stores.blog.clone()),
            case_studies: CaseStudyService::new(stores.case_studies.clone()),
            settings: SettingsService::new(stores.settings),
        }
    }

    /// The validator used to authenticate bearer tokens.
    pub fn jwt_validator(&self) -> Arc<dyn JwtValidator> {
        self.auth.validator()
    }
}
