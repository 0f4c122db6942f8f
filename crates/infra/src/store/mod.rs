//! Persistence ports and their adapters.
//!
//! Each collection has its own trait so services depend only on what they use.
//! [`InMemoryStore`] and [`PostgresStore`] implement all of them.
//!
//! Unique keys (user email, post slug, case study slug, setting key) are
//! enforced by the adapter: a write that would collide fails with
//! [`StoreError::Duplicate`] and leaves the stored data unchanged.

use async_trait::async_trait;
use thiserror::Error;

use bridgecms_auth::User;
use bridgecms_content::{
    BlogFilter, BlogPost, CaseStudy, CaseStudyFilter, Contact, ContactFilter, Setting,
};
use bridgecms_core::{CaseStudyId, ContactId, Page, PageRequest, PostId, UserId};

mod in_memory;
mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique key is already taken; carries the field name.
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: User) -> StoreResult<()>;
    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;
    /// `email` must already be normalized.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert_contact(&self, contact: Contact) -> StoreResult<()>;
    async fn find_contact(&self, id: ContactId) -> StoreResult<Option<Contact>>;
    /// Replace a stored contact. Returns `false` if it does not exist.
    async fn update_contact(&self, contact: Contact) -> StoreResult<bool>;
    /// Newest first.
    async fn list_contacts(&self, filter: ContactFilter, page: PageRequest) -> StoreResult<Page<Contact>>;
}

#[async_trait]
pub trait BlogStore: Send + Sync {
    async fn insert_post(&self, post: BlogPost) -> StoreResult<()>;
    async fn find_post(&self, id: PostId) -> StoreResult<Option<BlogPost>>;
    /// Drafts included; visibility is the caller's concern.
    async fn find_post_by_slug(&self, slug: &str) -> StoreResult<Option<BlogPost>>;
    async fn update_post(&self, post: BlogPost) -> StoreResult<bool>;
    async fn delete_post(&self, id: PostId) -> StoreResult<bool>;
    /// Published posts matching `filter`, most recently published first.
    async fn list_published_posts(&self, filter: BlogFilter, page: PageRequest) -> StoreResult<Page<BlogPost>>;
}

#[async_trait]
pub trait CaseStudyStore: Send + Sync {
    async fn insert_case_study(&self, study: CaseStudy) -> StoreResult<()>;
    async fn find_case_study(&self, id: CaseStudyId) -> StoreResult<Option<CaseStudy>>;
    async fn find_case_study_by_slug(&self, slug: &str) -> StoreResult<Option<CaseStudy>>;
    async fn update_case_study(&self, study: CaseStudy) -> StoreResult<bool>;
    async fn delete_case_study(&self, id: CaseStudyId) -> StoreResult<bool>;
    /// Published case studies matching `filter`, newest first. Not paginated.
    async fn list_published_case_studies(&self, filter: CaseStudyFilter) -> StoreResult<Vec<CaseStudy>>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Ordered by key.
    async fn all_settings(&self) -> StoreResult<Vec<Setting>>;
    async fn upsert_setting(&self, setting: Setting) -> StoreResult<()>;
}
