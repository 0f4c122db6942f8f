//! Field-level validation.
//!
//! Validators collect every failing field instead of stopping at the first,
//! so the API can return a complete list to the caller.

use serde::Serialize;
use validator::ValidateEmail;

/// Maximum slug length accepted by [`is_valid_slug`].
pub const MAX_SLUG_LEN: usize = 200;

/// A single failing input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Ordered collection of field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Shorthand for a single-field failure.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Record an error for a missing or blank value, otherwise return it trimmed.
    pub fn required(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => {
                self.push(field, "is required");
                None
            }
        }
    }

    /// Like [`required`](Self::required), but only checks values that are present.
    ///
    /// Used for partial updates where omitting a field keeps the stored value.
    pub fn non_blank(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        let v = value?.trim();
        if v.is_empty() {
            self.push(field, "must not be empty");
            return None;
        }
        Some(v.to_string())
    }

    /// Check a slug that is present, recording an error if it is malformed.
    pub fn slug(&mut self, field: &str, value: Option<&str>) {
        if let Some(slug) = value {
            if !slug.trim().is_empty() && !is_valid_slug(slug.trim()) {
                self.push(
                    field,
                    "must contain only lowercase letters, digits and single hyphens",
                );
            }
        }
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for e in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{} {}", e.field, e.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Email syntax per the `validator` crate's HTML5 rules, plus a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if !email.validate_email() {
        return false;
    }
    email
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.'))
}

/// Normalise an email for storage and lookup (trimmed, lowercase).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// URL-safe slug: lowercase ASCII alphanumerics separated by single hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return false;
    }
    if slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return false;
    }
    slug.bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
