//! Demo data: an admin account plus published blog posts and case studies.
//!
//! Seeding never overwrites: records whose email or slug already exist are
//! left alone, so running it on every start is safe.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use bridgecms_auth::{PasswordHasher, Registration, Role, User};
use bridgecms_content::{BlogPost, BlogPostInput, CaseStudy, CaseStudyInput};
use bridgecms_infra::{BlogStore, CaseStudyStore, UserStore};

use crate::app::services::{ServiceError, ServiceResult, Stores};
use crate::config::SeedConfig;

const DEMO_CONTENT: &str = include_str!("../seed/demo_content.json");

const ADMIN_NAME: &str = "Admin User";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DemoContent {
    blog_posts: Vec<BlogPostInput>,
    case_studies: Vec<CaseStudyInput>,
}

/// What a seeding run actually inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub posts: usize,
    pub case_studies: usize,
}

pub async fn seed_demo_data(
    stores: &Stores,
    hasher: Arc<dyn PasswordHasher>,
    config: &SeedConfig,
) -> ServiceResult<SeedReport> {
    let content: DemoContent = serde_json::from_str(DEMO_CONTENT)
        .map_err(|e| ServiceError::internal(format!("demo content is malformed: {e}")))?;
    let now = Utc::now();
    let mut report = SeedReport::default();

    let registration = Registration::validate(
        Some(ADMIN_NAME),
        Some(&config.admin_email),
        Some(&config.admin_password),
    )?;
    if stores.users.find_user_by_email(&registration.email).await?.is_none() {
        let password = registration.password.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ServiceError::internal(format!("hashing task failed: {e}")))??;
        let admin = User::register(registration, hash, now).with_role(Role::Admin);
        stores.users.insert_user(admin).await?;
        report.admin_created = true;
    }

    for input in content.blog_posts {
        let post = BlogPost::create(input, now)?;
        if stores.blog.find_post_by_slug(&post.slug).await?.is_none() {
            stores.blog.insert_post(post).await?;
            report.posts += 1;
        }
    }

    for input in content.case_studies {
        let study = CaseStudy::create(input, now)?;
        if stores.case_studies.find_case_study_by_slug(&study.slug).await?.is_none() {
            stores.case_studies.insert_case_study(study).await?;
            report.case_studies += 1;
        }
    }

    tracing::info!(
        admin_created = report.admin_created,
        posts = report.posts,
        case_studies = report.case_studies,
        "demo data seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use bridgecms_auth::Argon2Hasher;
    use bridgecms_content::{BlogFilter, CaseStudyFilter};
    use bridgecms_core::PageRequest;
    use bridgecms_infra::InMemoryStore;

    use super::*;

    fn config() -> SeedConfig {
        SeedConfig {
            enabled: true,
            admin_email: "admin@bridgeaitech.com".to_string(),
            admin_password: "admin123".to_string(),
        }
    }

    #[tokio::test]
    async fn seeds_published_content_and_an_admin() {
        let stores = Stores::from_backend(Arc::new(InMemoryStore::new()));
        let report = seed_demo_data(&stores, Arc::new(Argon2Hasher::new()), &config()).await.unwrap();
        assert_eq!(
            report,
            SeedReport {
                admin_created: true,
                posts: 3,
                case_studies: 3
            }
        );

        let admin = stores.users.find_user_by_email("admin@bridgeaitech.com").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);

        let page = PageRequest::new(None, None, 10).unwrap();
        let posts = stores.blog.list_published_posts(BlogFilter::default(), page).await.unwrap();
        assert_eq!(posts.total, 3);
        let studies = stores
            .case_studies
            .list_published_case_studies(CaseStudyFilter::default())
            .await
            .unwrap();
        assert_eq!(studies.len(), 3);
    }

    #[tokio::test]
    async fn second_run_inserts_nothing() {
        let stores = Stores::from_backend(Arc::new(InMemoryStore::new()));
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
        seed_demo_data(&stores, hasher.clone(), &config()).await.unwrap();

        let again = seed_demo_data(&stores, hasher, &config()).await.unwrap();
        assert_eq!(again, SeedReport::default());
    }
}
