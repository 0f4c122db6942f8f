//! Blog posts.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bridgecms_core::{PostId, ValidationErrors};

/// Stored blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: PostId,
    pub title: String,
    /// Unique across posts.
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List-view projection: everything but `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostSummary {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub author: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&BlogPost> for BlogPostSummary {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            featured: post.featured,
            published: post.published,
            published_at: post.published_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Client payload for both create (`POST`) and update (`PUT`).
///
/// On create the required fields must be present; on update every field is
/// optional and only the provided ones replace stored values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlogPostInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
}

impl BlogPost {
    /// Build a new post; drafts (`published = false`, not featured) by default.
    pub fn create(input: BlogPostInput, now: DateTime<Utc>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = errors.required("title", input.title.as_deref());
        let slug = errors.required("slug", input.slug.as_deref());
        errors.slug("slug", input.slug.as_deref());
        let excerpt = errors.required("excerpt", input.excerpt.as_deref());
        let content = errors.required("content", input.content.as_deref());
        let author = errors.required("author", input.author.as_deref());
        errors.into_result()?;

        let mut post = Self {
            id: PostId::new(),
            title: title.unwrap_or_default(),
            slug: slug.unwrap_or_default(),
            excerpt: excerpt.unwrap_or_default(),
            content: content.unwrap_or_default(),
            author: author.unwrap_or_default(),
            category: clean_category(input.category),
            tags: clean_tags(input.tags.unwrap_or_default()),
            featured: input.featured.unwrap_or(false),
            published: input.published.unwrap_or(false),
            published_at: input.published_at,
            created_at: now,
            updated_at: now,
        };
        post.stamp_publication(now);
        Ok(post)
    }

    /// Replace the provided fields and refresh `updated_at`.
    ///
    /// Validates everything before touching `self`, so a rejected update leaves
    /// the post unchanged.
    pub fn apply_update(&mut self, input: BlogPostInput, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = errors.non_blank("title", input.title.as_deref());
        let slug = errors.non_blank("slug", input.slug.as_deref());
        errors.slug("slug", input.slug.as_deref());
        let excerpt = errors.non_blank("excerpt", input.excerpt.as_deref());
        let content = errors.non_blank("content", input.content.as_deref());
        let author = errors.non_blank("author", input.author.as_deref());
        errors.into_result()?;

        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = slug {
            self.slug = v;
        }
        if let Some(v) = excerpt {
            self.excerpt = v;
        }
        if let Some(v) = content {
            self.content = v;
        }
        if let Some(v) = author {
            self.author = v;
        }
        if input.category.is_some() {
            self.category = clean_category(input.category);
        }
        if let Some(tags) = input.tags {
            self.tags = clean_tags(tags);
        }
        if let Some(v) = input.featured {
            self.featured = v;
        }
        if let Some(v) = input.published {
            self.published = v;
        }
        if input.published_at.is_some() {
            self.published_at = input.published_at;
        }

        self.updated_at = now;
        self.stamp_publication(now);
        Ok(())
    }

    pub fn summary(&self) -> BlogPostSummary {
        BlogPostSummary::from(self)
    }

    // Published posts always carry a publish time so list ordering is total.
    fn stamp_publication(&mut self, now: DateTime<Utc>) {
        if self.published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
    }
}

/// Allow-listed public filters for the blog list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogFilter {
    pub category: Option<String>,
    pub featured: Option<bool>,
}

impl BlogFilter {
    /// Whether a post is visible in the public list under this filter.
    ///
    /// Drafts never are.
    pub fn matches(&self, post: &BlogPost) -> bool {
        if !post.published {
            return false;
        }
        if let Some(category) = &self.category {
            if post.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if post.featured != featured {
                return false;
            }
        }
        true
    }
}

/// List order: most recently published first, unpublished dates last.
pub fn newest_first(a: &BlogPost, b: &BlogPost) -> Ordering {
    let by_publication = match (a.published_at, b.published_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_publication
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

fn clean_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn input(slug: &str) -> BlogPostInput {
        BlogPostInput {
            title: Some("Understanding AI Agents".to_string()),
            slug: Some(slug.to_string()),
            excerpt: Some("A guide".to_string()),
            content: Some("<p>Body</p>".to_string()),
            author: Some("Team".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn create_applies_defaults() {
        let now = Utc::now();
        let post = BlogPost::create(input("ai-agents"), now).unwrap();

        assert!(!post.featured);
        assert!(!post.published);
        assert_eq!(post.published_at, None);
        assert!(post.tags.is_empty());
        assert_eq!(post.created_at, now);
        assert_eq!(post.updated_at, now);
    }

    #[test]
    fn create_reports_missing_fields() {
        let err = BlogPost::create(BlogPostInput::default(), Utc::now()).unwrap_err();
        let fields: Vec<&str> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "slug", "excerpt", "content", "author"]);
    }

    #[test]
    fn create_rejects_bad_slug() {
        let err = BlogPost::create(input("Not A Slug"), Utc::now()).unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert_eq!(err.errors()[0].field, "slug");
    }

    #[test]
    fn publishing_stamps_publication_time() {
        let now = Utc::now();
        let mut draft = BlogPost::create(input("ai-agents"), now).unwrap();

        let later = now + Duration::minutes(5);
        draft
            .apply_update(BlogPostInput { published: Some(true), ..Default::default() }, later)
            .unwrap();

        assert!(draft.published);
        assert_eq!(draft.published_at, Some(later));
    }

    #[test]
    fn update_replaces_only_provided_fields() {
        let now = Utc::now();
        let mut post = BlogPost::create(input("ai-agents"), now).unwrap();
        let later = now + Duration::seconds(30);

        post.apply_update(
            BlogPostInput {
                title: Some("New title".to_string()),
                tags: Some(vec![" ai ".to_string(), "".to_string()]),
                ..Default::default()
            },
            later,
        )
        .unwrap();

        assert_eq!(post.title, "New title");
        assert_eq!(post.slug, "ai-agents");
        assert_eq!(post.content, "<p>Body</p>");
        assert_eq!(post.tags, vec!["ai".to_string()]);
        assert_eq!(post.updated_at, later);
        assert_eq!(post.created_at, now);
    }

    #[test]
    fn rejected_update_leaves_post_untouched() {
        let mut post = BlogPost::create(input("ai-agents"), Utc::now()).unwrap();
        let before = post.clone();

        let err = post
            .apply_update(
                BlogPostInput {
                    title: Some("Changed".to_string()),
                    content: Some("   ".to_string()),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap_err();

        assert_eq!(err.errors()[0].field, "content");
        assert_eq!(post, before);
    }

    #[test]
    fn summary_has_no_content() {
        let post = BlogPost::create(input("ai-agents"), Utc::now()).unwrap();
        let json = serde_json::to_value(post.summary()).unwrap();
        assert!(json.get("content").is_none());
        assert_eq!(json["slug"], "ai-agents");
    }

    #[test]
    fn filter_hides_drafts_and_applies_fields() {
        let now = Utc::now();
        let mut post = BlogPost::create(
            BlogPostInput {
                category: Some("AI Technology".to_string()),
                featured: Some(true),
                published: Some(true),
                ..input("ai-agents")
            },
            now,
        )
        .unwrap();

        assert!(BlogFilter::default().matches(&post));
        assert!(BlogFilter { category: Some("AI Technology".to_string()), featured: Some(true) }.matches(&post));
        assert!(!BlogFilter { category: Some("Cloud".to_string()), featured: None }.matches(&post));
        assert!(!BlogFilter { category: None, featured: Some(false) }.matches(&post));

        post.published = false;
        assert!(!BlogFilter::default().matches(&post));
    }

    #[test]
    fn ordering_is_newest_publication_first() {
        let now = Utc::now();
        let mut older = BlogPost::create(input("older"), now).unwrap();
        older.published_at = Some(now - Duration::days(10));
        let mut newer = BlogPost::create(input("newer"), now).unwrap();
        newer.published_at = Some(now - Duration::days(1));
        let undated = BlogPost::create(input("undated"), now).unwrap();

        let mut posts = vec![undated.clone(), older.clone(), newer.clone()];
        posts.sort_by(newest_first);

        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["newer", "older", "undated"]);
    }
}
