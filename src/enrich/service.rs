//! Orchestration layer over the external professor API.
//!
//! Owns the caches and the degradation policy: single-professor lookups
//! always produce a result (falling back to local-only data), searches
//! degrade to empty, analytics degrade to `None`. External failures never
//! propagate to callers.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::models::{EnhancedProfessor, Professor};

use super::api::{ProfessorAnalytics, ProfessorApi, SearchQuery};
use super::cache::{TtlCache, name_key};
use super::combine;

const PROFESSOR_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
const SEARCH_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Round-trip threshold separating healthy from degraded.
const DEGRADED_AFTER: Duration = Duration::from_secs(2);

/// External service health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unavailable,
    Disabled,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentHealth {
    pub status: HealthStatus,
    pub round_trip_ms: Option<u64>,
    pub cached_professors: usize,
    pub cached_searches: usize,
}

pub struct EnrichmentService {
    api: Arc<dyn ProfessorApi>,
    enabled: bool,
    professor_cache: TtlCache<EnhancedProfessor>,
    search_cache: TtlCache<Vec<EnhancedProfessor>>,
}

impl EnrichmentService {
    pub fn new(api: Arc<dyn ProfessorApi>, enabled: bool) -> Self {
        Self {
            api,
            enabled,
            professor_cache: TtlCache::new(PROFESSOR_CACHE_TTL),
            search_cache: TtlCache::new(SEARCH_CACHE_TTL),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enhances a locally derived professor, merging external data when
    /// available and falling back to local-only data on any failure.
    pub async fn enhance(&self, professor: &Professor) -> EnhancedProfessor {
        if !self.enabled {
            return combine::fallback(professor);
        }

        let key = name_key(&professor.name);
        if let Some(cached) = self.professor_cache.get(&key) {
            debug!(professor = %professor.name, "Enrichment cache hit");
            return cached;
        }

        let enhanced = match self.api.fetch_professor(&professor.name).await {
            Ok(Some(external)) => combine::combine(professor, &external),
            Ok(None) => {
                debug!(professor = %professor.name, "No external record, using local data");
                combine::fallback(professor)
            }
            Err(e) => {
                warn!(professor = %professor.name, error = %e, "External lookup failed, using local data");
                combine::fallback(professor)
            }
        };

        self.professor_cache.insert(key, enhanced.clone());
        enhanced
    }

    /// Proxies the external search. Any failure yields an empty list; there
    /// is no local fallback for search.
    pub async fn search(&self, query: &SearchQuery) -> Vec<EnhancedProfessor> {
        if !self.enabled {
            return Vec::new();
        }

        let key = search_key(query);
        if let Some(cached) = self.search_cache.get(&key) {
            debug!(%key, "Search cache hit");
            return cached;
        }

        match self.api.search_professors(query).await {
            Ok(externals) => {
                let results: Vec<EnhancedProfessor> =
                    externals.iter().map(combine::from_external).collect();
                self.search_cache.insert(key, results.clone());
                results
            }
            Err(e) => {
                // Failures are not cached so the next request can recover.
                warn!(query = %query.query, error = %e, "External search failed");
                Vec::new()
            }
        }
    }

    /// Proxies the external analytics endpoint; `None` on any failure.
    pub async fn analytics(&self, name: &str) -> Option<ProfessorAnalytics> {
        if !self.enabled {
            return None;
        }

        match self.api.fetch_analytics(name).await {
            Ok(analytics) => analytics,
            Err(e) => {
                warn!(professor = %name, error = %e, "External analytics fetch failed");
                None
            }
        }
    }

    /// Probes the external service and reports status plus cache stats.
    pub async fn health(&self) -> EnrichmentHealth {
        if !self.enabled {
            return EnrichmentHealth {
                status: HealthStatus::Disabled,
                round_trip_ms: None,
                cached_professors: self.professor_cache.len(),
                cached_searches: self.search_cache.len(),
            };
        }

        let started = Instant::now();
        let status = match self.api.health_check().await {
            Ok(()) if started.elapsed() <= DEGRADED_AFTER => HealthStatus::Healthy,
            Ok(()) => HealthStatus::Degraded,
            Err(e) => {
                warn!(error = %e, "External health probe failed");
                HealthStatus::Unavailable
            }
        };

        EnrichmentHealth {
            status,
            round_trip_ms: Some(started.elapsed().as_millis() as u64),
            cached_professors: self.professor_cache.len(),
            cached_searches: self.search_cache.len(),
        }
    }
}

/// Composite cache key over every search parameter.
fn search_key(query: &SearchQuery) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        name_key(&query.query),
        query.school.as_deref().unwrap_or("-").to_lowercase(),
        query.department.as_deref().unwrap_or("-").to_lowercase(),
        query
            .min_rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string()),
        query.limit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::api::{ExternalProfessor, ExternalSentiment};
    use crate::models::DataQuality;
    use anyhow::{Result, anyhow};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub API with scripted behavior and call counting.
    #[derive(Default)]
    struct StubApi {
        professor: Option<ExternalProfessor>,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ProfessorApi for StubApi {
        async fn fetch_professor(&self, _name: &str) -> Result<Option<ExternalProfessor>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("connection refused"));
            }
            Ok(self.professor.clone())
        }

        async fn search_professors(
            &self,
            _query: &SearchQuery,
        ) -> Result<Vec<ExternalProfessor>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("timed out"));
            }
            Ok(self.professor.clone().into_iter().collect())
        }

        async fn fetch_analytics(&self, _name: &str) -> Result<Option<ProfessorAnalytics>> {
            if self.fail {
                return Err(anyhow!("503"));
            }
            Ok(Some(ProfessorAnalytics::default()))
        }

        async fn health_check(&self) -> Result<()> {
            if self.fail {
                return Err(anyhow!("unreachable"));
            }
            Ok(())
        }
    }

    fn local_prof() -> Professor {
        Professor {
            name: "Jane Smith".to_string(),
            courses: vec!["CS111".to_string()],
            average_difficulty: 3.0,
            total_reviews: 4,
            characteristics: vec!["Helpful".to_string()],
            latest_review_date: "2023-11-01".to_string(),
        }
    }

    fn external_prof() -> ExternalProfessor {
        ExternalProfessor {
            name: "Jane Smith".to_string(),
            rating: 4.5,
            difficulty: 3.0,
            num_ratings: 30,
            sentiment: Some(ExternalSentiment {
                score: 0.4,
                mention_count: 8,
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_disabled_service_always_falls_back() {
        let api = Arc::new(StubApi {
            professor: Some(external_prof()),
            ..Default::default()
        });
        let service = EnrichmentService::new(api.clone(), false);

        let enhanced = service.enhance(&local_prof()).await;

        assert_eq!(enhanced.data_quality, DataQuality::Low);
        assert_eq!(enhanced.rmp_num_ratings, 0);
        assert_eq!(
            enhanced.data_sources,
            vec![combine::LOCAL_SOURCE.to_string()]
        );
        // The external API must never be touched.
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_enhance_merges_external_data() {
        let api = Arc::new(StubApi {
            professor: Some(external_prof()),
            ..Default::default()
        });
        let service = EnrichmentService::new(api, true);

        let enhanced = service.enhance(&local_prof()).await;

        assert_eq!(enhanced.rmp_num_ratings, 30);
        assert_eq!(enhanced.data_quality, DataQuality::High);
        assert_eq!(enhanced.data_sources.len(), 2);
    }

    #[tokio::test]
    async fn test_enhance_failure_falls_back_to_local() {
        let api = Arc::new(StubApi {
            fail: true,
            ..Default::default()
        });
        let service = EnrichmentService::new(api, true);

        let enhanced = service.enhance(&local_prof()).await;

        assert_eq!(enhanced.rmp_num_ratings, 0);
        assert_eq!(enhanced.data_quality, DataQuality::Low);
    }

    #[tokio::test]
    async fn test_cache_short_circuits_second_lookup() {
        let api = Arc::new(StubApi {
            professor: Some(external_prof()),
            ..Default::default()
        });
        let service = EnrichmentService::new(api.clone(), true);

        let first = service.enhance(&local_prof()).await;
        let second = service.enhance(&local_prof()).await;

        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.combined_rating, second.combined_rating);
    }

    #[tokio::test]
    async fn test_search_failure_yields_empty() {
        let api = Arc::new(StubApi {
            fail: true,
            ..Default::default()
        });
        let service = EnrichmentService::new(api, true);

        let query = SearchQuery {
            query: "smith".to_string(),
            limit: 10,
            ..Default::default()
        };
        assert!(service.search(&query).await.is_empty());
    }

    #[tokio::test]
    async fn test_analytics_failure_yields_none() {
        let api = Arc::new(StubApi {
            fail: true,
            ..Default::default()
        });
        let service = EnrichmentService::new(api, true);
        assert!(service.analytics("smith").await.is_none());
    }

    #[tokio::test]
    async fn test_health_classification() {
        let healthy = EnrichmentService::new(Arc::new(StubApi::default()), true);
        assert_eq!(healthy.health().await.status, HealthStatus::Healthy);

        let down = EnrichmentService::new(
            Arc::new(StubApi {
                fail: true,
                ..Default::default()
            }),
            true,
        );
        assert_eq!(down.health().await.status, HealthStatus::Unavailable);

        let disabled = EnrichmentService::new(Arc::new(StubApi::default()), false);
        assert_eq!(disabled.health().await.status, HealthStatus::Disabled);
    }
}
