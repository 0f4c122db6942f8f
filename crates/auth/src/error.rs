use thiserror::Error;

use crate::TokenValidationError;

/// Authentication failure.
///
/// Login failures deliberately collapse into one variant so callers cannot
/// tell an unknown email from a wrong password.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("access token required")]
    MissingToken,

    #[error("invalid or expired token: {0}")]
    InvalidToken(#[from] TokenValidationError),
}
