use std::sync::Arc;

use chrono::Utc;

use bridgecms_auth::Action;
use bridgecms_content::{CaseStudy, CaseStudyFilter, CaseStudyInput};
use bridgecms_core::{CaseStudyId, DomainError};
use bridgecms_infra::CaseStudyStore;

use super::{ServiceResult, require};
use crate::context::PrincipalContext;

pub struct CaseStudyService {
    store: Arc<dyn CaseStudyStore>,
}

impl CaseStudyService {
    pub fn new(store: Arc<dyn CaseStudyStore>) -> Self {
        Self { store }
    }

    /// Every published case study matching `filter`, newest first.
    pub async fn list(&self, filter: CaseStudyFilter) -> ServiceResult<Vec<CaseStudy>> {
        Ok(self.store.list_published_case_studies(filter).await?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> ServiceResult<CaseStudy> {
        self.store
            .find_case_study_by_slug(slug)
            .await?
            .filter(|study| study.published)
            .ok_or_else(|| DomainError::not_found("case study").into())
    }

    pub async fn create(&self, principal: &PrincipalContext, input: CaseStudyInput) -> ServiceResult<CaseStudy> {
        require(principal, Action::CreateCaseStudy)?;
        let study = CaseStudy::create(input, Utc::now())?;

        if self.store.find_case_study_by_slug(&study.slug).await?.is_some() {
            return Err(DomainError::conflict("slug already exists").into());
        }
        self.store.insert_case_study(study.clone()).await?;

        tracing::info!(case_study_id = %study.id, slug = %study.slug, by = %principal.user_id(), "case study created");
        Ok(study)
    }

    pub async fn update(
        &self,
        principal: &PrincipalContext,
        id: &str,
        input: CaseStudyInput,
    ) -> ServiceResult<CaseStudy> {
        require(principal, Action::UpdateCaseStudy)?;
        let id: CaseStudyId = id.parse()?;

        let mut study = self
            .store
            .find_case_study(id)
            .await?
            .ok_or(DomainError::not_found("case study"))?;
        study.apply_update(input)?;

        if let Some(other) = self.store.find_case_study_by_slug(&study.slug).await? {
            if other.id != study.id {
                return Err(DomainError::conflict("slug already exists").into());
            }
        }
        if !self.store.update_case_study(study.clone()).await? {
            return Err(DomainError::not_found("case study").into());
        }

        tracing::info!(case_study_id = %study.id, by = %principal.user_id(), "case study updated");
        Ok(study)
    }

    pub async fn delete(&self, principal: &PrincipalContext, id: &str) -> ServiceResult<()> {
        require(principal, Action::DeleteCaseStudy)?;
        let id: CaseStudyId = id.parse()?;

        if !self.store.delete_case_study(id).await? {
            return Err(DomainError::not_found("case study").into());
        }
        tracing::info!(case_study_id = %id, by = %principal.user_id(), "case study deleted");
        Ok(())
    }
}
