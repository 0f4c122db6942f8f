//! Contact form submissions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bridgecms_core::{
    ContactId, ValidationErrors,
    validation::{is_valid_email, normalize_email},
};

use crate::html::escape;

/// Sales pipeline stage of a submission. Any stage may move to any other.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Closed,
}

impl ContactStatus {
    pub const ALL: [ContactStatus; 4] = [Self::New, Self::Contacted, Self::Qualified, Self::Closed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Closed => "closed",
        }
    }

    /// Parse a client-supplied status, reporting unknown values against `field`.
    pub fn parse_field(field: &str, value: Option<&str>) -> Result<Self, ValidationErrors> {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Err(ValidationErrors::single(field, "is required"));
        };
        raw.parse().map_err(|_| {
            ValidationErrors::single(field, "must be one of: new, contacted, qualified, closed")
        })
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown contact status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ContactStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Stored submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    pub source: String,
    /// CRM reference, filled in by external sync jobs.
    pub hubspot_id: Option<String>,
    pub salesforce_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Public contact form payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

pub const DEFAULT_SOURCE: &str = "website";

impl Contact {
    /// Validate a form submission into a new record with status `new`.
    pub fn submit(input: ContactInput, now: DateTime<Utc>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.required("name", input.name.as_deref());
        let email = normalize_email(input.email.as_deref().unwrap_or_default());
        if !is_valid_email(&email) {
            errors.push("email", "must be a valid email address");
        }
        let message = errors.required("message", input.message.as_deref());
        errors.into_result()?;

        Ok(Self {
            id: ContactId::new(),
            name: name.unwrap_or_default(),
            email,
            company: optional(input.company),
            phone: optional(input.phone),
            message: message.unwrap_or_default(),
            status: ContactStatus::New,
            source: DEFAULT_SOURCE.to_string(),
            hubspot_id: None,
            salesforce_id: None,
            created_at: now,
        })
    }

    /// Alert sent to the site owner.
    pub fn admin_alert(&self) -> EmailContent {
        let na = "N/A";
        EmailContent {
            subject: format!("New Contact Form Submission from {}", single_line(&self.name)),
            html: format!(
                "<h2>New Contact Form Submission</h2>\n\
                 <p><strong>Name:</strong> {}</p>\n\
                 <p><strong>Email:</strong> {}</p>\n\
                 <p><strong>Company:</strong> {}</p>\n\
                 <p><strong>Phone:</strong> {}</p>\n\
                 <p><strong>Message:</strong></p>\n\
                 <p>{}</p>\n",
                escape(&self.name),
                escape(&self.email),
                escape(self.company.as_deref().unwrap_or(na)),
                escape(self.phone.as_deref().unwrap_or(na)),
                escape(&self.message),
            ),
        }
    }

    /// Acknowledgement sent back to the submitter.
    pub fn acknowledgement(&self) -> EmailContent {
        EmailContent {
            subject: "Thank you for contacting BridgeAI Tech".to_string(),
            html: format!(
                "<h2>Thank you for reaching out!</h2>\n\
                 <p>Hi {},</p>\n\
                 <p>We've received your message and will get back to you within 24 hours.</p>\n\
                 <p>Best regards,<br>BridgeAI Tech Team</p>\n",
                escape(&self.name),
            ),
        }
    }
}

/// Rendered email subject and HTML body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

/// Staff-side list filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
}

impl ContactFilter {
    pub fn matches(&self, contact: &Contact) -> bool {
        self.status.is_none_or(|s| contact.status == s)
    }
}

/// List order: newest first.
pub fn newest_first(a: &Contact, b: &Contact) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn single_line(text: &str) -> String {
    text.chars().map(|c| if c.is_control() { ' ' } else { c }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ContactInput {
        ContactInput {
            name: Some("Ada Lovelace".to_string()),
            email: Some("Ada@Example.com".to_string()),
            company: Some("  ".to_string()),
            phone: None,
            message: Some("We need an AI strategy".to_string()),
        }
    }

    #[test]
    fn submission_defaults() {
        let contact = Contact::submit(form(), Utc::now()).unwrap();
        assert_eq!(contact.status, ContactStatus::New);
        assert_eq!(contact.source, "website");
        assert_eq!(contact.email, "ada@example.com");
        assert_eq!(contact.company, None);
    }

    #[test]
    fn missing_message_is_rejected() {
        let err = Contact::submit(ContactInput { message: None, ..form() }, Utc::now()).unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert_eq!(err.errors()[0].field, "message");
    }

    #[test]
    fn bad_email_and_blank_name_are_both_reported() {
        let err = Contact::submit(
            ContactInput { name: Some(" ".into()), email: Some("nope".into()), ..form() },
            Utc::now(),
        )
        .unwrap_err();
        let fields: Vec<&str> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email"]);
    }

    #[test]
    fn status_parsing() {
        assert_eq!(ContactStatus::parse_field("status", Some("qualified")), Ok(ContactStatus::Qualified));
        assert!(ContactStatus::parse_field("status", Some("archived")).is_err());
        assert!(ContactStatus::parse_field("status", None).is_err());
        assert_eq!("closed".parse::<ContactStatus>(), Ok(ContactStatus::Closed));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ContactStatus::Contacted).unwrap(), "contacted");
    }

    #[test]
    fn emails_escape_user_text() {
        let contact = Contact::submit(
            ContactInput { message: Some("<b>hi</b>".into()), name: Some("Eve\r\nBcc: x".into()), ..form() },
            Utc::now(),
        )
        .unwrap();

        let alert = contact.admin_alert();
        assert!(alert.html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(alert.html.contains("<strong>Company:</strong> N/A"));
        assert!(!alert.subject.contains('\n'));

        let ack = contact.acknowledgement();
        assert_eq!(ack.subject, "Thank you for contacting BridgeAI Tech");
        assert!(ack.html.contains("Hi Eve"));
    }

    #[test]
    fn filter_by_status() {
        let mut contact = Contact::submit(form(), Utc::now()).unwrap();
        let qualified = ContactFilter { status: Some(ContactStatus::Qualified) };
        assert!(!qualified.matches(&contact));
        contact.status = ContactStatus::Qualified;
        assert!(qualified.matches(&contact));
        assert!(ContactFilter::default().matches(&contact));
    }
}
