//! Case studies.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bridgecms_core::{CaseStudyId, ValidationErrors};

/// A labelled headline figure, e.g. `{label: "Revenue Increase", value: "45%"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

/// The three headline figures shown on a case study card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub metric1: Metric,
    pub metric2: Metric,
    pub metric3: Metric,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
    pub role: String,
}

/// Stored case study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudy {
    pub id: CaseStudyId,
    pub title: String,
    /// Unique across case studies.
    pub slug: String,
    pub company: String,
    pub industry: String,
    pub challenge: String,
    pub solution: String,
    pub results: Vec<String>,
    pub metrics: Metrics,
    pub testimonial: Testimonial,
    pub featured: bool,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

/// Client payload for create and update; see [`crate::BlogPostInput`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseStudyInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub challenge: Option<String>,
    pub solution: Option<String>,
    pub results: Option<Vec<String>>,
    pub metrics: Option<Metrics>,
    pub testimonial: Option<Testimonial>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
}

impl CaseStudy {
    pub fn create(input: CaseStudyInput, now: DateTime<Utc>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = errors.required("title", input.title.as_deref());
        let slug = errors.required("slug", input.slug.as_deref());
        errors.slug("slug", input.slug.as_deref());
        let company = errors.required("company", input.company.as_deref());
        let industry = errors.required("industry", input.industry.as_deref());
        let challenge = errors.required("challenge", input.challenge.as_deref());
        let solution = errors.required("solution", input.solution.as_deref());
        errors.into_result()?;

        Ok(Self {
            id: CaseStudyId::new(),
            title: title.unwrap_or_default(),
            slug: slug.unwrap_or_default(),
            company: company.unwrap_or_default(),
            industry: industry.unwrap_or_default(),
            challenge: challenge.unwrap_or_default(),
            solution: solution.unwrap_or_default(),
            results: clean_results(input.results.unwrap_or_default()),
            metrics: input.metrics.unwrap_or_default(),
            testimonial: input.testimonial.unwrap_or_default(),
            featured: input.featured.unwrap_or(false),
            published: input.published.unwrap_or(false),
            created_at: now,
        })
    }

    /// Replace the provided fields. Nothing changes if validation fails.
    pub fn apply_update(&mut self, input: CaseStudyInput) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = errors.non_blank("title", input.title.as_deref());
        let slug = errors.non_blank("slug", input.slug.as_deref());
        errors.slug("slug", input.slug.as_deref());
        let company = errors.non_blank("company", input.company.as_deref());
        let industry = errors.non_blank("industry", input.industry.as_deref());
        let challenge = errors.non_blank("challenge", input.challenge.as_deref());
        let solution = errors.non_blank("solution", input.solution.as_deref());
        errors.into_result()?;

        let replace = |slot: &mut String, value: Option<String>| {
            if let Some(v) = value {
                *slot = v;
            }
        };
        replace(&mut self.title, title);
        replace(&mut self.slug, slug);
        replace(&mut self.company, company);
        replace(&mut self.industry, industry);
        replace(&mut self.challenge, challenge);
        replace(&mut self.solution, solution);

        if let Some(results) = input.results {
            self.results = clean_results(results);
        }
        if let Some(metrics) = input.metrics {
            self.metrics = metrics;
        }
        if let Some(testimonial) = input.testimonial {
            self.testimonial = testimonial;
        }
        if let Some(v) = input.featured {
            self.featured = v;
        }
        if let Some(v) = input.published {
            self.published = v;
        }
        Ok(())
    }
}

/// Allow-listed public filters for the case study list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseStudyFilter {
    pub industry: Option<String>,
    pub featured: Option<bool>,
}

impl CaseStudyFilter {
    /// Published records matching every provided field.
    pub fn matches(&self, study: &CaseStudy) -> bool {
        study.published
            && self.industry.as_ref().is_none_or(|i| &study.industry == i)
            && self.featured.is_none_or(|f| study.featured == f)
    }
}

/// List order: newest first.
pub fn newest_first(a: &CaseStudy, b: &CaseStudy) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

fn clean_results(results: Vec<String>) -> Vec<String> {
    results
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn input(slug: &str) -> CaseStudyInput {
        CaseStudyInput {
            title: Some("AI Sales Intelligence".to_string()),
            slug: Some(slug.to_string()),
            company: Some("TechCorp Solutions".to_string()),
            industry: Some("Technology Services".to_string()),
            challenge: Some("Manual lead scoring".to_string()),
            solution: Some("Predictive scoring".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn create_defaults_to_unpublished_draft() {
        let study = CaseStudy::create(input("ai-sales"), Utc::now()).unwrap();
        assert!(!study.published);
        assert!(!study.featured);
        assert!(study.results.is_empty());
        assert_eq!(study.metrics, Metrics::default());
    }

    #[test]
    fn create_requires_core_fields() {
        let err = CaseStudy::create(
            CaseStudyInput { title: Some("x".into()), slug: Some("x".into()), ..Default::default() },
            Utc::now(),
        )
        .unwrap_err();
        let fields: Vec<&str> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["company", "industry", "challenge", "solution"]);
    }

    #[test]
    fn partial_metrics_deserialize_with_defaults() {
        let input: CaseStudyInput = serde_json::from_value(serde_json::json!({
            "metrics": { "metric1": { "label": "Revenue", "value": "45%" } },
            "testimonial": { "quote": "Great" }
        }))
        .unwrap();

        let metrics = input.metrics.unwrap();
        assert_eq!(metrics.metric1.value, "45%");
        assert_eq!(metrics.metric2, Metric::default());
        assert_eq!(input.testimonial.unwrap().author, "");
    }

    #[test]
    fn update_keeps_unspecified_fields() {
        let mut study = CaseStudy::create(input("ai-sales"), Utc::now()).unwrap();
        study
            .apply_update(CaseStudyInput {
                published: Some(true),
                results: Some(vec!["45% more revenue".to_string()]),
                ..Default::default()
            })
            .unwrap();

        assert!(study.published);
        assert_eq!(study.company, "TechCorp Solutions");
        assert_eq!(study.results, vec!["45% more revenue".to_string()]);
    }

    #[test]
    fn update_rejects_bad_slug_without_mutating() {
        let mut study = CaseStudy::create(input("ai-sales"), Utc::now()).unwrap();
        let before = study.clone();
        assert!(study
            .apply_update(CaseStudyInput {
                slug: Some("Bad_Slug".to_string()),
                published: Some(true),
                ..Default::default()
            })
            .is_err());
        assert_eq!(study, before);
    }

    #[test]
    fn filter_and_order() {
        let now = Utc::now();
        let mut a = CaseStudy::create(input("a"), now - Duration::days(2)).unwrap();
        a.published = true;
        let mut b = CaseStudy::create(
            CaseStudyInput { industry: Some("Financial Services".into()), featured: Some(true), ..input("b") },
            now,
        )
        .unwrap();
        b.published = true;
        let draft = CaseStudy::create(input("draft"), now).unwrap();

        let all = [draft, a, b];
        let filter = CaseStudyFilter::default();
        let mut visible: Vec<&CaseStudy> = all.iter().filter(|s| filter.matches(s)).collect();
        visible.sort_by(|x, y| newest_first(x, y));
        let slugs: Vec<&str> = visible.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["b", "a"]);

        let featured = CaseStudyFilter { industry: None, featured: Some(true) };
        assert_eq!(all.iter().filter(|s| featured.matches(s)).count(), 1);

        let fin = CaseStudyFilter { industry: Some("Financial Services".into()), featured: None };
        assert_eq!(all.iter().filter(|s| fin.matches(s)).count(), 1);
    }
}
