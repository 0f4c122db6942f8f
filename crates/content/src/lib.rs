//! `bridgecms-content`: the site's managed content.
//!
//! Records, client payloads, validation, public filters and list ordering for
//! blog posts, case studies, contact submissions and settings. Storage lives
//! in `bridgecms-infra`; this crate is pure.

pub mod blog;
pub mod case_study;
pub mod contact;
pub mod settings;

mod html;

pub use blog::{BlogFilter, BlogPost, BlogPostInput, BlogPostSummary};
pub use case_study::{CaseStudy, CaseStudyFilter, CaseStudyInput, Metric, Metrics, Testimonial};
pub use contact::{Contact, ContactFilter, ContactInput, ContactStatus, EmailContent};
pub use settings::{Setting, SettingValue, SettingsUpdate};
