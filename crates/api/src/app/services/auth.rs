use std::sync::Arc;

use chrono::Utc;

use bridgecms_auth::{
    Action, AuthError, Credentials, Hs256Jwt, JwtValidator, PasswordHasher, PublicUser, Registration, User,
};
use bridgecms_core::{DomainError, UserId};
use bridgecms_infra::{StoreError, UserStore};

use super::{ServiceError, ServiceResult, require};
use crate::context::PrincipalContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    pub token: String,
    pub user: PublicUser,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    jwt: Arc<Hs256Jwt>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>, jwt: Arc<Hs256Jwt>) -> Self {
        Self { users, hasher, jwt }
    }

    pub fn validator(&self) -> Arc<dyn JwtValidator> {
        self.jwt.clone()
    }

    /// Create a viewer account.
    pub async fn register(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> ServiceResult<UserId> {
        let registration = Registration::validate(name, email, password)?;

        if self.users.find_user_by_email(&registration.email).await?.is_some() {
            return Err(email_taken());
        }

        let hash = self.hash(registration.password.clone()).await?;
        let user = User::register(registration, hash, Utc::now());
        let user_id = user.id;

        self.users.insert_user(user).await.map_err(|e| match e {
            StoreError::Duplicate(_) => email_taken(),
            other => other.into(),
        })?;

        tracing::info!(%user_id, "user registered");
        Ok(user_id)
    }

    /// Check credentials and issue a bearer token.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: Option<&str>, password: Option<&str>) -> ServiceResult<LoginResult> {
        let credentials = Credentials::validate(email, password)?;

        let Some(user) = self.users.find_user_by_email(&credentials.email).await? else {
            tracing::debug!("login failed: unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !self.verify(credentials.password, user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.id, "login failed: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.jwt.issue(user.id, &user.email, user.role, Utc::now())?;
        tracing::info!(user_id = %user.id, role = %user.role, "user logged in");
        Ok(LoginResult {
            token,
            user: user.to_public(),
        })
    }

    /// The caller's own profile.
    pub async fn me(&self, principal: &PrincipalContext) -> ServiceResult<PublicUser> {
        require(principal, Action::ReadProfile)?;
        let user = self
            .users
            .find_user(principal.user_id())
            .await?
            .ok_or(DomainError::not_found("user"))?;
        Ok(user.to_public())
    }

    // Argon2 is deliberately slow; keep it off the async workers.
    async fn hash(&self, password: String) -> ServiceResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ServiceError::internal(format!("hashing task failed: {e}")))?
            .map_err(Into::into)
    }

    async fn verify(&self, password: String, hash: String) -> ServiceResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| ServiceError::internal(format!("verification task failed: {e}")))?
            .map_err(Into::into)
    }
}

fn email_taken() -> ServiceError {
    DomainError::conflict("a user with this email already exists").into()
}

#[cfg(test)]
mod tests {
    use bridgecms_auth::Role;

    use super::*;
    use crate::app::services::testing::{principal, services};

    #[tokio::test]
    async fn register_then_login() {
        let svc = services();
        let id = svc
            .auth
            .register(Some("Ada"), Some("Ada@Example.com"), Some("secret1"))
            .await
            .unwrap();

        let login = svc.auth.login(Some("ada@example.com"), Some("secret1")).await.unwrap();
        assert_eq!(login.user.id, id);
        assert_eq!(login.user.role, Role::Viewer);

        let claims = svc.jwt_validator().validate(&login.token, Utc::now()).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Viewer);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let svc = services();
        svc.auth.register(Some("Ada"), Some("ada@example.com"), Some("secret1")).await.unwrap();
        let err = svc
            .auth
            .register(Some("Other"), Some("ADA@example.com"), Some("secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn bad_password_and_unknown_email_look_the_same() {
        let svc = services();
        svc.auth.register(Some("Ada"), Some("ada@example.com"), Some("secret1")).await.unwrap();

        let wrong = svc.auth.login(Some("ada@example.com"), Some("nope!!")).await.unwrap_err();
        let unknown = svc.auth.login(Some("bob@example.com"), Some("secret1")).await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, ServiceError::Auth(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn me_for_deleted_user_is_not_found() {
        let svc = services();
        let err = svc.auth.me(&principal(Role::Viewer)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound("user"))));
    }
}
