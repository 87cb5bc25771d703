//! `reqwest`-backed implementation of [`ProfessorApi`].
//!
//! Every call carries an explicit per-operation timeout; a timeout or
//! non-success status surfaces as an error that the service layer turns
//! into local fallback data.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::api::{ExternalProfessor, ProfessorAnalytics, ProfessorApi, SearchQuery};

/// Per-operation request timeouts.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
const ANALYTICS_TIMEOUT: Duration = Duration::from_secs(8);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

pub struct HttpProfessorApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpProfessorApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(3))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

#[async_trait]
impl ProfessorApi for HttpProfessorApi {
    async fn fetch_professor(&self, name: &str) -> Result<Option<ExternalProfessor>> {
        let url = format!("{}/professors/{}", self.base_url, urlencode(name));
        debug!(%url, "Fetching external professor record");

        let response = self
            .client
            .get(&url)
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow!(
                "professor lookup returned status {}",
                response.status()
            ));
        }

        Ok(Some(response.json().await?))
    }

    async fn search_professors(&self, query: &SearchQuery) -> Result<Vec<ExternalProfessor>> {
        let mut params = vec![
            ("q".to_string(), query.query.clone()),
            ("limit".to_string(), query.limit.to_string()),
        ];
        if let Some(school) = &query.school {
            params.push(("school".to_string(), school.clone()));
        }
        if let Some(department) = &query.department {
            params.push(("department".to_string(), department.clone()));
        }
        if let Some(min_rating) = query.min_rating {
            params.push(("min_rating".to_string(), min_rating.to_string()));
        }

        let url = format!("{}/professors/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&params)
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "professor search returned status {}",
                response.status()
            ));
        }

        Ok(response.json().await?)
    }

    async fn fetch_analytics(&self, name: &str) -> Result<Option<ProfessorAnalytics>> {
        let url = format!(
            "{}/professors/{}/analytics",
            self.base_url,
            urlencode(name)
        );

        let response = self
            .client
            .get(&url)
            .timeout(ANALYTICS_TIMEOUT)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow!(
                "analytics lookup returned status {}",
                response.status()
            ));
        }

        Ok(Some(response.json().await?))
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("health probe returned status {}", response.status()));
        }
        Ok(())
    }
}

/// Minimal path-segment encoding for professor names (spaces and reserved
/// characters).
fn urlencode(segment: &str) -> String {
    segment
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urlencode_spaces_and_safe_chars() {
        assert_eq!(urlencode("Jane Smith"), "Jane%20Smith");
        assert_eq!(urlencode("ol-sen_2.x~"), "ol-sen_2.x~");
    }
}
