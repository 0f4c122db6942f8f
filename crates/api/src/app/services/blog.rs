use std::sync::Arc;

use chrono::Utc;

use bridgecms_auth::Action;
use bridgecms_content::{BlogFilter, BlogPost, BlogPostInput, BlogPostSummary};
use bridgecms_core::{DomainError, Page, PageRequest, PostId};
use bridgecms_infra::BlogStore;

use super::{ServiceResult, require};
use crate::context::PrincipalContext;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub struct BlogService {
    store: Arc<dyn BlogStore>,
}

impl BlogService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    /// Published posts, most recent first, without bodies.
    pub async fn list(
        &self,
        filter: BlogFilter,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> ServiceResult<Page<BlogPostSummary>> {
        let request = PageRequest::new(page, limit, DEFAULT_PAGE_SIZE)?;
        let page = self.store.list_published_posts(filter, request).await?;
        Ok(page.map(|post| post.summary()))
    }

    pub async fn get_by_slug(&self, slug: &str) -> ServiceResult<BlogPost> {
        self.store
            .find_post_by_slug(slug)
            .await?
            .filter(|post| post.published)
            .ok_or_else(|| DomainError::not_found("blog post").into())
    }

    pub async fn create(&self, principal: &PrincipalContext, input: BlogPostInput) -> ServiceResult<BlogPost> {
        require(principal, Action::CreateBlogPost)?;
        let post = BlogPost::create(input, Utc::now())?;

        if self.store.find_post_by_slug(&post.slug).await?.is_some() {
            return Err(DomainError::conflict("slug already exists").into());
        }
        self.store.insert_post(post.clone()).await?;

        tracing::info!(post_id = %post.id, slug = %post.slug, by = %principal.user_id(), "blog post created");
        Ok(post)
    }

    pub async fn update(
        &self,
        principal: &PrincipalContext,
        id: &str,
        input: BlogPostInput,
    ) -> ServiceResult<BlogPost> {
        require(principal, Action::UpdateBlogPost)?;
        let id: PostId = id.parse()?;

        let mut post = self
            .store
            .find_post(id)
            .await?
            .ok_or(DomainError::not_found("blog post"))?;
        post.apply_update(input, Utc::now())?;

        if let Some(other) = self.store.find_post_by_slug(&post.slug).await? {
            if other.id != post.id {
                return Err(DomainError::conflict("slug already exists").into());
            }
        }
        if !self.store.update_post(post.clone()).await? {
            return Err(DomainError::not_found("blog post").into());
        }

        tracing::info!(post_id = %post.id, by = %principal.user_id(), "blog post updated");
        Ok(post)
    }

    pub async fn delete(&self, principal: &PrincipalContext, id: &str) -> ServiceResult<()> {
        require(principal, Action::DeleteBlogPost)?;
        let id: PostId = id.parse()?;

        if !self.store.delete_post(id).await? {
            return Err(DomainError::not_found("blog post").into());
        }
        tracing::info!(post_id = %id, by = %principal.user_id(), "blog post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bridgecms_auth::Role;

    use super::*;
    use crate::app::services::ServiceError;
    use crate::app::services::testing::{principal, services};

    fn input(slug: &str, published: bool) -> BlogPostInput {
        BlogPostInput {
            title: Some("Title".to_string()),
            slug: Some(slug.to_string()),
            excerpt: Some("Excerpt".to_string()),
            content: Some("<p>Content</p>".to_string()),
            author: Some("Team".to_string()),
            published: Some(published),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn drafts_are_hidden_from_public_reads() {
        let svc = services();
        let editor = principal(Role::Editor);
        svc.blog.create(&editor, input("draft", false)).await.unwrap();

        let err = svc.blog.get_by_slug("draft").await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound(_))));

        let page = svc.blog.list(BlogFilter::default(), None, None).await.unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn duplicate_slug_conflicts() {
        let svc = services();
        let admin = principal(Role::Admin);
        svc.blog.create(&admin, input("same", true)).await.unwrap();
        let err = svc.blog.create(&admin, input("same", true)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn renaming_onto_taken_slug_conflicts() {
        let svc = services();
        let admin = principal(Role::Admin);
        svc.blog.create(&admin, input("taken", true)).await.unwrap();
        let post = svc.blog.create(&admin, input("mine", true)).await.unwrap();

        let err = svc
            .blog
            .update(
                &admin,
                &post.id.to_string(),
                BlogPostInput { slug: Some("taken".into()), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn viewer_cannot_write() {
        let svc = services();
        let err = svc.blog.create(&principal(Role::Viewer), input("x", true)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn editor_cannot_delete_and_malformed_id_is_rejected() {
        let svc = services();
        let editor = principal(Role::Editor);
        let post = svc.blog.create(&editor, input("x", true)).await.unwrap();

        let err = svc.blog.delete(&editor, &post.id.to_string()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = svc.blog.delete(&principal(Role::Admin), "not-a-uuid").await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::InvalidId(_))));
    }

    #[tokio::test]
    async fn page_size_zero_is_a_validation_error() {
        let svc = services();
        let err = svc.blog.list(BlogFilter::default(), Some(1), Some(0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
    }
}
