//! `bridgecms-auth`: authentication and authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how
//! to hash passwords, sign and check tokens, and decide whether a role may
//! perform an action, but not where users live.

pub mod authorize;
pub mod claims;
pub mod error;
pub mod password;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{Action, AuthzError, allowed_roles, authorize, authorize_roles};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use error::AuthError;
pub use password::{Argon2Hasher, PasswordError, PasswordHasher};
pub use roles::Role;
pub use token::{Hs256Jwt, JwtValidator, TOKEN_TTL_HOURS, TokenError};
pub use user::{Credentials, PublicUser, Registration, User};
