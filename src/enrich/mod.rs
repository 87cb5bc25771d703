//! Professor enrichment: merging local aggregates with an external
//! rating service under caching, timeouts, and graceful degradation.

pub mod api;
pub mod cache;
pub mod combine;
pub mod http;
pub mod service;

pub use api::{ExternalProfessor, ProfessorAnalytics, ProfessorApi, SearchQuery};
pub use http::HttpProfessorApi;
pub use service::{EnrichmentHealth, EnrichmentService, HealthStatus};
