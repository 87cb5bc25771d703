//! Environment-driven configuration.
//!
//! Values come from the process environment (a `.env` file is loaded by the
//! entry point via `dotenvy` before this runs). Every field has a default so
//! the service starts with no configuration at all.

use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Master switch for the external enrichment layer.
    pub enrichment_enabled: bool,
    /// Base URL of the external professor-rating service.
    pub professor_api_url: String,
    /// Port the (external) HTTP server layer binds to.
    pub port: u16,
    /// Deployment mode, e.g. "development" or "production".
    pub environment: String,
    /// Path to the review CSV export.
    pub reviews_csv_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enrichment_enabled: true,
            professor_api_url: "http://localhost:8000".to_string(),
            port: 3001,
            environment: "development".to_string(),
            reviews_csv_path: "data/reviews.csv".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads configuration from the environment, keeping defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enrichment_enabled: env::var("ENRICHMENT_ENABLED")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.enrichment_enabled),
            professor_api_url: env::var("PROFESSOR_API_URL")
                .unwrap_or(defaults.professor_api_url),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            environment: env::var("APP_ENV").unwrap_or(defaults.environment),
            reviews_csv_path: env::var("REVIEWS_CSV_PATH")
                .unwrap_or(defaults.reviews_csv_path),
        }
    }
}
