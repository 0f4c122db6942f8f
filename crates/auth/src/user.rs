//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bridgecms_core::{
    UserId, ValidationErrors,
    validation::{is_valid_email, normalize_email},
};

use crate::Role;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Stored user record. Holds the password hash, so never serialize it to a client;
/// use [`PublicUser`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Trimmed and lowercased; unique across users.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A freshly registered user. Self-registration always yields a viewer.
    pub fn register(registration: Registration, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            name: registration.name,
            email: registration.email,
            password_hash,
            role: Role::default(),
            created_at: now,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Client-facing projection of a user (no password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn validate(
        name: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = errors.required("name", name);
        let email = validate_email(&mut errors, email);

        let password = password.unwrap_or_default();
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(
                "password",
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }

        errors.into_result()?;
        Ok(Self {
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            password: password.to_string(),
        })
    }
}

/// Validated login input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(email: Option<&str>, password: Option<&str>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let email = validate_email(&mut errors, email);
        let password = password.unwrap_or_default();
        if password.is_empty() {
            errors.push("password", "is required");
        }

        errors.into_result()?;
        Ok(Self {
            email: email.unwrap_or_default(),
            password: password.to_string(),
        })
    }
}

fn validate_email(errors: &mut ValidationErrors, email: Option<&str>) -> Option<String> {
    let email = normalize_email(email.unwrap_or_default());
    if is_valid_email(&email) {
        Some(email)
    } else {
        errors.push("email", "must be a valid email address");
        None
    }
}
