//! Trait and payload types for the external professor-rating service.
//!
//! The service is consumed only through this contract so tests can
//! substitute a deterministic stub without network I/O.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Sentiment block as reported by the external service.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExternalSentiment {
    /// -1.0 to 1.0.
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub mention_count: u32,
}

/// One professor record from the external rating service.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExternalProfessor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    /// 1.0 to 5.0 overall rating.
    #[serde(default)]
    pub rating: f64,
    /// 1.0 to 5.0 difficulty on the external scale.
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default)]
    pub num_ratings: u32,
    /// Fraction 0.0 to 1.0 of raters who would take the professor again.
    #[serde(default)]
    pub would_take_again: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sentiment: Option<ExternalSentiment>,
}

/// Analytics payload proxied from the external analytics endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProfessorAnalytics {
    #[serde(default)]
    pub recommendation_score: u8,
    #[serde(default)]
    pub teaching_style_summary: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub data_quality: String,
}

/// Parameters for the external professor search endpoint.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub query: String,
    pub school: Option<String>,
    pub department: Option<String>,
    pub min_rating: Option<f64>,
    pub limit: usize,
}

/// Abstraction over the external professor-rating service.
#[async_trait::async_trait]
pub trait ProfessorApi: Send + Sync {
    /// Fetches a single professor record. `Ok(None)` means the service
    /// answered but knows no such professor.
    async fn fetch_professor(&self, name: &str) -> Result<Option<ExternalProfessor>>;

    /// Searches professors. Failures are errors here; the service layer
    /// maps them to an empty result set.
    async fn search_professors(&self, query: &SearchQuery) -> Result<Vec<ExternalProfessor>>;

    /// Fetches precomputed analytics for a professor, if available.
    async fn fetch_analytics(&self, name: &str) -> Result<Option<ProfessorAnalytics>>;

    /// Probes the service. `Ok` means an HTTP-success answer arrived.
    async fn health_check(&self) -> Result<()>;
}
