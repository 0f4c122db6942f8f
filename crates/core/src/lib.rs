//! `bridgecms-core`: shared domain building blocks.
//!
//! Pure types only: identifiers, the domain error model, field-level
//! validation and pagination. No storage or HTTP concerns.

pub mod error;
pub mod id;
pub mod pagination;
pub mod validation;

pub use error::{DomainError, DomainResult};
pub use id::{CaseStudyId, ContactId, PostId, UserId};
pub use pagination::{Page, PageRequest, MAX_PAGE_SIZE};
pub use validation::{FieldError, ValidationErrors};
