//! Endpoint operations and the JSON response envelope.
//!
//! The HTTP router itself lives outside this crate; each public method here
//! is the body of one route, returning either a success envelope or a typed
//! error envelope the router serializes as-is. Limits are silently clamped
//! to per-endpoint maxima, never rejected.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::enrich::api::SearchQuery;
use crate::enrich::service::{EnrichmentHealth, EnrichmentService};
use crate::enrich::ProfessorAnalytics;
use crate::models::{Course, EnhancedProfessor, Professor, Review};
use crate::store::ReviewStore;

const SEARCH_LIMIT_MAX: usize = 100;
const EASY_LIMIT_MAX: usize = 50;
const ALL_COURSES_LIMIT_MAX: usize = 200;
const PROFESSOR_SEARCH_LIMIT_MAX: usize = 50;

const RECENT_REVIEWS: usize = 5;
const COURSE_PROFESSORS: usize = 3;

/// Success envelope: `{success: true, data, message?, timestamp}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }
}

/// Error envelope: `{success: false, error, message, timestamp, code}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub code: String,
}

impl ApiError {
    fn new(error: &str, message: impl Into<String>, code: &str) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            code: code.to_string(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("Not Found", message, "NOT_FOUND")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("Validation Error", message, "VALIDATION_ERROR")
    }

    pub fn service(message: impl Into<String>) -> Self {
        Self::new("Service Error", message, "SERVICE_ERROR")
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = %e, "Internal service error");
        Self::service(e.to_string())
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[derive(Debug, Serialize)]
pub struct AppliedFilters {
    pub query: Option<String>,
    pub department: Option<String>,
    pub max_difficulty: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CourseList {
    pub courses: Vec<Course>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<AppliedFilters>,
}

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    pub course: Course,
    /// Up to 5 reviews, most recent first.
    pub recent_reviews: Vec<Review>,
    /// Up to 3 professors resolved from the review comments.
    pub professors: Vec<Professor>,
}

#[derive(Debug, Serialize)]
pub struct EnhancedCourseDetail {
    pub course: Course,
    pub recent_reviews: Vec<Review>,
    pub professors: Vec<EnhancedProfessor>,
}

#[derive(Debug, Serialize)]
pub struct ProfessorSearchResult {
    pub professors: Vec<EnhancedProfessor>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ProfessorAnalyticsResult {
    pub name: String,
    #[serde(flatten)]
    pub analytics: ProfessorAnalytics,
}

/// The request-handler facade: one constructed instance shared by the
/// router, owning the store and the enrichment service.
pub struct Api {
    store: Arc<ReviewStore>,
    enrichment: Arc<EnrichmentService>,
}

impl Api {
    pub fn new(store: Arc<ReviewStore>, enrichment: Arc<EnrichmentService>) -> Self {
        Self { store, enrichment }
    }

    /// `GET courses/search?q&department&max_difficulty&limit`
    pub async fn search_courses(
        &self,
        q: Option<&str>,
        department: Option<&str>,
        max_difficulty: Option<f64>,
        limit: Option<usize>,
    ) -> ApiResult<CourseList> {
        let q = match q {
            Some(q) if !q.trim().is_empty() => q.trim(),
            _ => return Err(ApiError::validation("query parameter 'q' is required")),
        };

        let limit = clamp_limit(limit, 20, SEARCH_LIMIT_MAX);
        let mut courses = self
            .store
            .search_courses(Some(q), department, max_difficulty)
            .await?;
        let total = courses.len();
        courses.truncate(limit);

        Ok(ApiResponse::ok(CourseList {
            courses,
            total,
            filters: Some(AppliedFilters {
                query: Some(q.to_string()),
                department: department.map(str::to_string),
                max_difficulty,
            }),
        }))
    }

    /// `GET courses/{code}`
    pub async fn course_detail(&self, code: &str) -> ApiResult<CourseDetail> {
        let course = self
            .store
            .course(code)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("course '{code}' not found")))?;

        Ok(ApiResponse::ok(CourseDetail {
            recent_reviews: self.recent_reviews(code).await?,
            professors: self.course_professors(code).await?,
            course,
        }))
    }

    /// `GET courses/{code}/enhanced`
    pub async fn enhanced_course_detail(&self, code: &str) -> ApiResult<EnhancedCourseDetail> {
        let course = self
            .store
            .course(code)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("course '{code}' not found")))?;

        let mut professors = Vec::new();
        for professor in self.course_professors(code).await? {
            professors.push(self.enrichment.enhance(&professor).await);
        }

        Ok(ApiResponse::ok(EnhancedCourseDetail {
            recent_reviews: self.recent_reviews(code).await?,
            professors,
            course,
        }))
    }

    /// `GET courses/easy?department&limit`
    pub async fn easy_courses(
        &self,
        department: Option<&str>,
        limit: Option<usize>,
    ) -> ApiResult<CourseList> {
        let limit = clamp_limit(limit, 10, EASY_LIMIT_MAX);
        let mut courses = self.store.easy_courses(department).await?;
        let total = courses.len();
        courses.truncate(limit);

        Ok(ApiResponse::ok(CourseList {
            courses,
            total,
            filters: Some(AppliedFilters {
                query: None,
                department: department.map(str::to_string),
                max_difficulty: Some(4.0),
            }),
        }))
    }

    /// `GET courses?limit` — all courses by review count, descending.
    pub async fn all_courses(&self, limit: Option<usize>) -> ApiResult<CourseList> {
        let limit = clamp_limit(limit, 50, ALL_COURSES_LIMIT_MAX);
        let mut courses = self.store.top_courses().await?;
        let total = courses.len();
        courses.truncate(limit);

        Ok(ApiResponse::ok(CourseList {
            courses,
            total,
            filters: None,
        }))
    }

    /// `GET professors/search?q&school&department&min_rating&limit`
    pub async fn search_professors(
        &self,
        q: Option<&str>,
        school: Option<&str>,
        department: Option<&str>,
        min_rating: Option<f64>,
        limit: Option<usize>,
    ) -> ApiResult<ProfessorSearchResult> {
        let q = match q {
            Some(q) if !q.trim().is_empty() => q.trim(),
            _ => return Err(ApiError::validation("query parameter 'q' is required")),
        };

        let query = SearchQuery {
            query: q.to_string(),
            school: school.map(str::to_string),
            department: department.map(str::to_string),
            min_rating,
            limit: clamp_limit(limit, 10, PROFESSOR_SEARCH_LIMIT_MAX),
        };

        let professors = self.enrichment.search(&query).await;
        Ok(ApiResponse::ok(ProfessorSearchResult {
            total: professors.len(),
            professors,
        }))
    }

    /// `GET professors/{name}` — local-first, then external search fallback.
    pub async fn professor(&self, name: &str) -> ApiResult<EnhancedProfessor> {
        if let Some(professor) = self.store.professor(name).await? {
            return Ok(ApiResponse::ok(self.enrichment.enhance(&professor).await));
        }

        // No local record: try the external search directly.
        let query = SearchQuery {
            query: name.to_string(),
            limit: 1,
            ..Default::default()
        };
        if let Some(hit) = self.enrichment.search(&query).await.into_iter().next() {
            return Ok(ApiResponse::with_message(
                hit,
                "no local reviews for this professor; external data only",
            ));
        }

        Err(ApiError::not_found(format!("professor '{name}' not found")))
    }

    /// `GET professors/{name}/analytics`
    pub async fn professor_analytics(&self, name: &str) -> ApiResult<ProfessorAnalyticsResult> {
        match self.enrichment.analytics(name).await {
            Some(analytics) => Ok(ApiResponse::ok(ProfessorAnalyticsResult {
                name: name.to_string(),
                analytics,
            })),
            None => Err(ApiError::not_found(format!(
                "no analytics available for professor '{name}'"
            ))),
        }
    }

    /// `GET professors/health`
    pub async fn enrichment_health(&self) -> ApiResult<EnrichmentHealth> {
        Ok(ApiResponse::ok(self.enrichment.health().await))
    }

    async fn recent_reviews(&self, code: &str) -> Result<Vec<Review>, ApiError> {
        let mut reviews = self.store.course_reviews(code).await?;
        reviews.sort_by(|a, b| b.review_date.cmp(&a.review_date));
        reviews.truncate(RECENT_REVIEWS);
        Ok(reviews)
    }

    async fn course_professors(&self, code: &str) -> Result<Vec<Professor>, ApiError> {
        let mut professors = self.store.professors_for_course(code).await?;
        professors.truncate(COURSE_PROFESSORS);
        Ok(professors)
    }
}

/// Clamps a requested page size into `1..=max`, with a default when absent.
fn clamp_limit(requested: Option<usize>, default: usize, max: usize) -> usize {
    requested.unwrap_or(default).clamp(1, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
        assert_eq!(clamp_limit(Some(5), 20, 100), 5);
        assert_eq!(clamp_limit(Some(500), 20, 100), 100);
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
    }
}
