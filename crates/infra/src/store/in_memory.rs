use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use bridgecms_auth::User;
use bridgecms_content::{
    BlogFilter, BlogPost, CaseStudy, CaseStudyFilter, Contact, ContactFilter, Setting, blog, case_study,
    contact,
};
use bridgecms_core::{CaseStudyId, ContactId, Page, PageRequest, PostId, UserId};

use super::{
    BlogStore, CaseStudyStore, ContactStore, SettingsStore, StoreError, StoreResult, UserStore,
};

/// In-memory store for tests/dev.
///
/// One lock per collection, held only for the synchronous map access.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    contacts: RwLock<HashMap<ContactId, Contact>>,
    posts: RwLock<HashMap<PostId, BlogPost>>,
    case_studies: RwLock<HashMap<CaseStudyId, CaseStudy>>,
    settings: RwLock<BTreeMap<String, Setting>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
}

fn paginate<T: Clone>(all: Vec<T>, request: PageRequest) -> Page<T> {
    let total = all.len() as u64;
    Page::new(request.slice(&all), total, request)
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: User) -> StoreResult<()> {
        let mut users = write(&self.users)?;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(read(&self.users)?.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(read(&self.users)?.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl ContactStore for InMemoryStore {
    async fn insert_contact(&self, contact: Contact) -> StoreResult<()> {
        write(&self.contacts)?.insert(contact.id, contact);
        Ok(())
    }

    async fn find_contact(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        Ok(read(&self.contacts)?.get(&id).cloned())
    }

    async fn update_contact(&self, contact: Contact) -> StoreResult<bool> {
        let mut contacts = write(&self.contacts)?;
        match contacts.get_mut(&contact.id) {
            Some(slot) => {
                *slot = contact;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_contacts(&self, filter: ContactFilter, page: PageRequest) -> StoreResult<Page<Contact>> {
        let mut matching: Vec<Contact> = read(&self.contacts)?
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        matching.sort_by(contact::newest_first);
        Ok(paginate(matching, page))
    }
}

#[async_trait]
impl BlogStore for InMemoryStore {
    async fn insert_post(&self, post: BlogPost) -> StoreResult<()> {
        let mut posts = write(&self.posts)?;
        if posts.values().any(|p| p.slug == post.slug) {
            return Err(StoreError::Duplicate("slug"));
        }
        posts.insert(post.id, post);
        Ok(())
    }

    async fn find_post(&self, id: PostId) -> StoreResult<Option<BlogPost>> {
        Ok(read(&self.posts)?.get(&id).cloned())
    }

    async fn find_post_by_slug(&self, slug: &str) -> StoreResult<Option<BlogPost>> {
        Ok(read(&self.posts)?.values().find(|p| p.slug == slug).cloned())
    }

    async fn update_post(&self, post: BlogPost) -> StoreResult<bool> {
        let mut posts = write(&self.posts)?;
        if !posts.contains_key(&post.id) {
            return Ok(false);
        }
        if posts.values().any(|p| p.id != post.id && p.slug == post.slug) {
            return Err(StoreError::Duplicate("slug"));
        }
        posts.insert(post.id, post);
        Ok(true)
    }

    async fn delete_post(&self, id: PostId) -> StoreResult<bool> {
        Ok(write(&self.posts)?.remove(&id).is_some())
    }

    async fn list_published_posts(&self, filter: BlogFilter, page: PageRequest) -> StoreResult<Page<BlogPost>> {
        let mut matching: Vec<BlogPost> = read(&self.posts)?
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(blog::newest_first);
        Ok(paginate(matching, page))
    }
}

#[async_trait]
impl CaseStudyStore for InMemoryStore {
    async fn insert_case_study(&self, study: CaseStudy) -> StoreResult<()> {
        let mut studies = write(&self.case_studies)?;
        if studies.values().any(|s| s.slug == study.slug) {
            return Err(StoreError::Duplicate("slug"));
        }
        studies.insert(study.id, study);
        Ok(())
    }

    async fn find_case_study(&self, id: CaseStudyId) -> StoreResult<Option<CaseStudy>> {
        Ok(read(&self.case_studies)?.get(&id).cloned())
    }

    async fn find_case_study_by_slug(&self, slug: &str) -> StoreResult<Option<CaseStudy>> {
        Ok(read(&self.case_studies)?.values().find(|s| s.slug == slug).cloned())
    }

    async fn update_case_study(&self, study: CaseStudy) -> StoreResult<bool> {
        let mut studies = write(&self.case_studies)?;
        if !studies.contains_key(&study.id) {
            return Ok(false);
        }
        if studies.values().any(|s| s.id != study.id && s.slug == study.slug) {
            return Err(StoreError::Duplicate("slug"));
        }
        studies.insert(study.id, study);
        Ok(true)
    }

    async fn delete_case_study(&self, id: CaseStudyId) -> StoreResult<bool> {
        Ok(write(&self.case_studies)?.remove(&id).is_some())
    }

    async fn list_published_case_studies(&self, filter: CaseStudyFilter) -> StoreResult<Vec<CaseStudy>> {
        let mut matching: Vec<CaseStudy> = read(&self.case_studies)?
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matching.sort_by(case_study::newest_first);
        Ok(matching)
    }
}

#[async_trait]
impl SettingsStore for InMemoryStore {
    async fn all_settings(&self) -> StoreResult<Vec<Setting>> {
        Ok(read(&self.settings)?.values().cloned().collect())
    }

    async fn upsert_setting(&self, setting: Setting) -> StoreResult<()> {
        write(&self.settings)?.insert(setting.key.clone(), setting);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use bridgecms_auth::Registration;
    use bridgecms_content::{BlogPostInput, ContactInput, ContactStatus, SettingValue};

    use super::*;

    fn post(slug: &str, published: bool) -> BlogPost {
        BlogPost::create(
            BlogPostInput {
                title: Some(format!("Post {slug}")),
                slug: Some(slug.to_string()),
                excerpt: Some("excerpt".to_string()),
                content: Some("content".to_string()),
                author: Some("Team".to_string()),
                published: Some(published),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        let reg = Registration::validate(Some("Ada"), Some("ada@example.com"), Some("secret1")).unwrap();
        let user = User::register(reg.clone(), "hash".to_string(), Utc::now());
        store.insert_user(user.clone()).await.unwrap();

        let again = User::register(reg, "hash".to_string(), Utc::now());
        assert_eq!(store.insert_user(again).await, Err(StoreError::Duplicate("email")));
        assert_eq!(store.find_user_by_email("ada@example.com").await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn slug_collision_on_update_keeps_original() {
        let store = InMemoryStore::new();
        let a = post("first", true);
        let mut b = post("second", true);
        store.insert_post(a.clone()).await.unwrap();
        store.insert_post(b.clone()).await.unwrap();

        b.slug = "first".to_string();
        assert_eq!(store.update_post(b.clone()).await, Err(StoreError::Duplicate("slug")));
        assert_eq!(store.find_post(b.id).await.unwrap().unwrap().slug, "second");
    }

    #[tokio::test]
    async fn published_posts_are_paginated_newest_first() {
        let store = InMemoryStore::new();
        let base = Utc::now();
        for i in 0..15 {
            let mut p = post(&format!("post-{i}"), true);
            p.published_at = Some(base + Duration::minutes(i));
            store.insert_post(p).await.unwrap();
        }
        store.insert_post(post("draft", false)).await.unwrap();

        let page = PageRequest::new(Some(2), Some(10), 10).unwrap();
        let result = store.list_published_posts(BlogFilter::default(), page).await.unwrap();

        assert_eq!(result.total, 15);
        assert_eq!(result.total_pages, 2);
        assert_eq!(result.current_page, 2);
        assert_eq!(result.items.len(), 5);
        assert_eq!(result.items[0].slug, "post-4");
        assert_eq!(result.items[4].slug, "post-0");
    }

    #[tokio::test]
    async fn delete_is_not_repeatable() {
        let store = InMemoryStore::new();
        let p = post("gone", true);
        store.insert_post(p.clone()).await.unwrap();
        assert!(store.delete_post(p.id).await.unwrap());
        assert!(!store.delete_post(p.id).await.unwrap());
    }

    #[tokio::test]
    async fn contacts_filter_by_status() {
        let store = InMemoryStore::new();
        let input = ContactInput {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            message: Some("hello".into()),
            ..Default::default()
        };
        let mut first = Contact::submit(input.clone(), Utc::now()).unwrap();
        store.insert_contact(first.clone()).await.unwrap();
        store.insert_contact(Contact::submit(input, Utc::now()).unwrap()).await.unwrap();

        first.status = ContactStatus::Closed;
        assert!(store.update_contact(first.clone()).await.unwrap());

        let page = PageRequest::new(None, None, 20).unwrap();
        let closed = store
            .list_contacts(ContactFilter { status: Some(ContactStatus::Closed) }, page)
            .await
            .unwrap();
        assert_eq!(closed.total, 1);
        assert_eq!(closed.items[0].id, first.id);

        let all = store.list_contacts(ContactFilter::default(), page).await.unwrap();
        assert_eq!(all.total, 2);
    }

    #[tokio::test]
    async fn settings_upsert_overwrites() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        store
            .upsert_setting(Setting { key: "theme".into(), value: "light".into(), updated_at: now })
            .await
            .unwrap();
        store
            .upsert_setting(Setting { key: "theme".into(), value: "dark".into(), updated_at: now })
            .await
            .unwrap();

        let all = store.all_settings().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value, SettingValue::from("dark"));
    }
}
