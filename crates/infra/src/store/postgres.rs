//! Postgres-backed store.
//!
//! Every record is kept whole in a `doc` JSONB column; unique keys and the
//! fields used for filtering and ordering are mirrored into plain columns.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | StoreError |
//! |---|---|---|
//! | `Database` unique violation | 23505 | `Duplicate(field)` |
//! | anything else | - | `Backend(message)` |

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use bridgecms_auth::User;
use bridgecms_content::{
    BlogFilter, BlogPost, CaseStudy, CaseStudyFilter, Contact, ContactFilter, Setting,
};
use bridgecms_core::{CaseStudyId, ContactId, Page, PageRequest, PostId, UserId};

use super::{
    BlogStore, CaseStudyStore, ContactStore, SettingsStore, StoreError, StoreResult, UserStore,
};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool to `database_url`.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", "", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they are missing.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", "", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, unique_field: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.is_unique_violation() && !unique_field.is_empty() {
                StoreError::Duplicate(unique_field)
            } else {
                StoreError::Backend(format!("database error in {operation}: {}", db_err.message()))
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

fn decode<T: DeserializeOwned>(row: &PgRow) -> StoreResult<T> {
    row.try_get::<Json<T>, _>("doc")
        .map(|Json(doc)| doc)
        .map_err(|e| StoreError::Backend(format!("failed to decode stored document: {e}")))
}

fn decode_all<T: DeserializeOwned>(rows: &[PgRow]) -> StoreResult<Vec<T>> {
    rows.iter().map(decode).collect()
}

fn count(total: i64) -> u64 {
    u64::try_from(total).unwrap_or(0)
}

fn limit_offset(page: PageRequest) -> (i64, i64) {
    (
        i64::from(page.limit()),
        i64::try_from(page.offset()).unwrap_or(i64::MAX),
    )
}

#[async_trait]
impl UserStore for PostgresStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert_user(&self, user: User) -> StoreResult<()> {
        sqlx::query("INSERT INTO users (id, email, doc) VALUES ($1, $2, $3)")
            .bind(user.id.as_uuid())
            .bind(&user.email)
            .bind(Json(&user))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_user", "email", e))?;
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT doc FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", "", e))?;
        row.as_ref().map(decode).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT doc FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", "", e))?;
        row.as_ref().map(decode).transpose()
    }
}

#[async_trait]
impl ContactStore for PostgresStore {
    #[instrument(skip(self, contact), fields(contact_id = %contact.id), err)]
    async fn insert_contact(&self, contact: Contact) -> StoreResult<()> {
        sqlx::query("INSERT INTO contacts (id, status, created_at, doc) VALUES ($1, $2, $3, $4)")
            .bind(contact.id.as_uuid())
            .bind(contact.status.as_str())
            .bind(contact.created_at)
            .bind(Json(&contact))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_contact", "", e))?;
        Ok(())
    }

    async fn find_contact(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        let row = sqlx::query("SELECT doc FROM contacts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_contact", "", e))?;
        row.as_ref().map(decode).transpose()
    }

    #[instrument(skip(self, contact), fields(contact_id = %contact.id), err)]
    async fn update_contact(&self, contact: Contact) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE contacts SET status = $2, doc = $3 WHERE id = $1")
            .bind(contact.id.as_uuid())
            .bind(contact.status.as_str())
            .bind(Json(&contact))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_contact", "", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_contacts(&self, filter: ContactFilter, page: PageRequest) -> StoreResult<Page<Contact>> {
        let status = filter.status.map(|s| s.as_str());
        let (limit, offset) = limit_offset(page);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM contacts WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_contacts", "", e))?;

        let rows = sqlx::query(
            r#"
            SELECT doc FROM contacts
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_contacts", "", e))?;

        Ok(Page::new(decode_all(&rows)?, count(total), page))
    }
}

#[async_trait]
impl BlogStore for PostgresStore {
    #[instrument(skip(self, post), fields(post_id = %post.id, slug = %post.slug), err)]
    async fn insert_post(&self, post: BlogPost) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO blog_posts
                (id, slug, category, featured, published, published_at, created_at, doc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(&post.slug)
        .bind(post.category.as_deref())
        .bind(post.featured)
        .bind(post.published)
        .bind(post.published_at)
        .bind(post.created_at)
        .bind(Json(&post))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_post", "slug", e))?;
        Ok(())
    }

    async fn find_post(&self, id: PostId) -> StoreResult<Option<BlogPost>> {
        let row = sqlx::query("SELECT doc FROM blog_posts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_post", "", e))?;
        row.as_ref().map(decode).transpose()
    }

    async fn find_post_by_slug(&self, slug: &str) -> StoreResult<Option<BlogPost>> {
        let row = sqlx::query("SELECT doc FROM blog_posts WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_post_by_slug", "", e))?;
        row.as_ref().map(decode).transpose()
    }

    #[instrument(skip(self, post), fields(post_id = %post.id), err)]
    async fn update_post(&self, post: BlogPost) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE blog_posts
            SET slug = $2, category = $3, featured = $4, published = $5,
                published_at = $6, doc = $7
            WHERE id = $1
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(&post.slug)
        .bind(post.category.as_deref())
        .bind(post.featured)
        .bind(post.published)
        .bind(post.published_at)
        .bind(Json(&post))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_post", "slug", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_post(&self, id: PostId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_post", "", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_published_posts(&self, filter: BlogFilter, page: PageRequest) -> StoreResult<Page<BlogPost>> {
        let (limit, offset) = limit_offset(page);
        const WHERE: &str = "published AND ($1::text IS NULL OR category = $1) AND ($2::bool IS NULL OR featured = $2)";

        let count_sql = format!("SELECT COUNT(*) FROM blog_posts WHERE {WHERE}");
        let list_sql = format!(
            "SELECT doc FROM blog_posts WHERE {WHERE} \
             ORDER BY published_at DESC NULLS LAST, created_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );

        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filter.category.as_deref())
            .bind(filter.featured)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_published_posts", "", e))?;

        let rows = sqlx::query(&list_sql)
            .bind(filter.category.as_deref())
            .bind(filter.featured)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_published_posts", "", e))?;

        Ok(Page::new(decode_all(&rows)?, count(total), page))
    }
}

#[async_trait]
impl CaseStudyStore for PostgresStore {
    #[instrument(skip(self, study), fields(case_study_id = %study.id, slug = %study.slug), err)]
    async fn insert_case_study(&self, study: CaseStudy) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO case_studies (id, slug, industry, featured, published, created_at, doc)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(study.id.as_uuid())
        .bind(&study.slug)
        .bind(&study.industry)
        .bind(study.featured)
        .bind(study.published)
        .bind(study.created_at)
        .bind(Json(&study))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_case_study", "slug", e))?;
        Ok(())
    }

    async fn find_case_study(&self, id: CaseStudyId) -> StoreResult<Option<CaseStudy>> {
        let row = sqlx::query("SELECT doc FROM case_studies WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_case_study", "", e))?;
        row.as_ref().map(decode).transpose()
    }

    async fn find_case_study_by_slug(&self, slug: &str) -> StoreResult<Option<CaseStudy>> {
        let row = sqlx::query("SELECT doc FROM case_studies WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_case_study_by_slug", "", e))?;
        row.as_ref().map(decode).transpose()
    }

    #[instrument(skip(self, study), fields(case_study_id = %study.id), err)]
    async fn update_case_study(&self, study: CaseStudy) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE case_studies
            SET slug = $2, industry = $3, featured = $4, published = $5, doc = $6
            WHERE id = $1
            "#,
        )
        .bind(study.id.as_uuid())
        .bind(&study.slug)
        .bind(&study.industry)
        .bind(study.featured)
        .bind(study.published)
        .bind(Json(&study))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_case_study", "slug", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_case_study(&self, id: CaseStudyId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM case_studies WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_case_study", "", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_published_case_studies(&self, filter: CaseStudyFilter) -> StoreResult<Vec<CaseStudy>> {
        let rows = sqlx::query(
            r#"
            SELECT doc FROM case_studies
            WHERE published
              AND ($1::text IS NULL OR industry = $1)
              AND ($2::bool IS NULL OR featured = $2)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(filter.industry.as_deref())
        .bind(filter.featured)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_published_case_studies", "", e))?;
        decode_all(&rows)
    }
}

#[async_trait]
impl SettingsStore for PostgresStore {
    async fn all_settings(&self) -> StoreResult<Vec<Setting>> {
        let rows = sqlx::query("SELECT doc FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("all_settings", "", e))?;
        decode_all(&rows)
    }

    #[instrument(skip(self, setting), fields(key = %setting.key), err)]
    async fn upsert_setting(&self, setting: Setting) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, updated_at, doc) VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE SET updated_at = EXCLUDED.updated_at, doc = EXCLUDED.doc
            "#,
        )
        .bind(&setting.key)
        .bind(setting.updated_at)
        .bind(Json(&setting))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_setting", "", e))?;
        Ok(())
    }
}
