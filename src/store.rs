//! In-memory store over the derived review collections.
//!
//! The CSV is parsed and aggregated at most once per process: the first
//! caller triggers the load and concurrent callers await the same in-flight
//! operation via [`tokio::sync::OnceCell`]. A failed load leaves the cell
//! empty, so the next request retries. After a successful load the
//! collections are immutable.

use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::OnceCell;
use tracing::info;

use crate::aggregate::{self, Aggregates};
use crate::ingest::{self, normalize_course_code};
use crate::models::{Course, Department, Professor, Review};

struct StoreData {
    reviews: Vec<Review>,
    aggregates: Aggregates,
}

/// Lookup/search facade over the aggregated review data.
///
/// Construct one instance at process startup and share it behind an `Arc`;
/// there is no global.
pub struct ReviewStore {
    csv_path: PathBuf,
    data: OnceCell<StoreData>,
}

impl ReviewStore {
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            data: OnceCell::new(),
        }
    }

    async fn data(&self) -> Result<&StoreData> {
        self.data
            .get_or_try_init(|| async {
                info!(path = %self.csv_path.display(), "Loading review data");
                let reviews = ingest::load_reviews(&self.csv_path)?;
                let aggregates = aggregate::aggregate(&reviews);
                Ok(StoreData {
                    reviews,
                    aggregates,
                })
            })
            .await
    }

    /// All courses, in course-code order.
    pub async fn all_courses(&self) -> Result<Vec<Course>> {
        Ok(self.data().await?.aggregates.courses.clone())
    }

    /// Exact course lookup, case-insensitive via normalization.
    pub async fn course(&self, code: &str) -> Result<Option<Course>> {
        let code = normalize_course_code(code);
        Ok(self
            .data()
            .await?
            .aggregates
            .courses
            .iter()
            .find(|c| c.course_code == code)
            .cloned())
    }

    /// Courses matching every given filter.
    ///
    /// `query` substring-matches course code OR department (both
    /// case-insensitive); `department` is a case-insensitive exact match;
    /// `max_difficulty` is an inclusive upper bound. Absent filters match
    /// everything.
    pub async fn search_courses(
        &self,
        query: Option<&str>,
        department: Option<&str>,
        max_difficulty: Option<f64>,
    ) -> Result<Vec<Course>> {
        let query = query.map(str::to_uppercase);
        let department = department.map(str::to_uppercase);

        Ok(self
            .data()
            .await?
            .aggregates
            .courses
            .iter()
            .filter(|c| {
                if let Some(q) = &query {
                    if !c.course_code.contains(q.as_str())
                        && !c.department.contains(q.as_str())
                    {
                        return false;
                    }
                }
                if let Some(d) = &department {
                    if c.department != *d {
                        return false;
                    }
                }
                if let Some(max) = max_difficulty {
                    if c.average_difficulty > max {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect())
    }

    /// All reviews for a course, in ingestion order. Callers sort.
    pub async fn course_reviews(&self, code: &str) -> Result<Vec<Review>> {
        let code = normalize_course_code(code);
        Ok(self
            .data()
            .await?
            .reviews
            .iter()
            .filter(|r| r.course_code == code)
            .cloned()
            .collect())
    }

    /// First professor whose name contains `name`, case-insensitive.
    ///
    /// Substring matching is deliberate: callers can look up "smith" and
    /// find "Jane Smith".
    pub async fn professor(&self, name: &str) -> Result<Option<Professor>> {
        let needle = name.to_lowercase();
        Ok(self
            .data()
            .await?
            .aggregates
            .professors
            .iter()
            .find(|p| p.name.to_lowercase().contains(&needle))
            .cloned())
    }

    /// Professors who taught the given course, in name order.
    pub async fn professors_for_course(&self, code: &str) -> Result<Vec<Professor>> {
        let code = normalize_course_code(code);
        Ok(self
            .data()
            .await?
            .aggregates
            .professors
            .iter()
            .filter(|p| p.courses.iter().any(|c| *c == code))
            .cloned()
            .collect())
    }

    pub async fn all_departments(&self) -> Result<Vec<Department>> {
        Ok(self.data().await?.aggregates.departments.clone())
    }

    pub async fn department(&self, code: &str) -> Result<Option<Department>> {
        let code = code.trim().to_uppercase();
        Ok(self
            .data()
            .await?
            .aggregates
            .departments
            .iter()
            .find(|d| d.code == code)
            .cloned())
    }

    /// Courses with average difficulty <= 4.0 and at least 2 reviews,
    /// sorted by difficulty ascending, then review count descending.
    pub async fn easy_courses(&self, department: Option<&str>) -> Result<Vec<Course>> {
        let department = department.map(str::to_uppercase);
        let mut courses: Vec<Course> = self
            .data()
            .await?
            .aggregates
            .courses
            .iter()
            .filter(|c| c.average_difficulty <= 4.0 && c.total_reviews >= 2)
            .filter(|c| match &department {
                Some(d) => c.department == *d,
                None => true,
            })
            .cloned()
            .collect();

        courses.sort_by(|a, b| {
            a.average_difficulty
                .partial_cmp(&b.average_difficulty)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.total_reviews.cmp(&a.total_reviews))
        });
        Ok(courses)
    }

    /// All courses sorted by review count descending.
    pub async fn top_courses(&self) -> Result<Vec<Course>> {
        let mut courses = self.all_courses().await?;
        courses.sort_by(|a, b| b.total_reviews.cmp(&a.total_reviews));
        Ok(courses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture_store(rows: &[&str]) -> (tempfile::NamedTempFile, ReviewStore) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "Class,Average Difficulty,Additional Comments,Difficulty,Date"
        )
        .unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        let store = ReviewStore::new(file.path());
        (file, store)
    }

    #[tokio::test]
    async fn test_course_lookup_case_insensitive() {
        let (_file, store) = fixture_store(&["CS111,5.0,fine,5,2023-01-01"]);

        assert!(store.course("cs 111").await.unwrap().is_some());
        assert!(store.course("CS111").await.unwrap().is_some());
        assert!(store.course("CS999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_filters_are_anded() {
        let (_file, store) = fixture_store(&[
            "AHS001,5.0,easy one,2,2023-01-01",
            "AHS001,5.0,still easy,3,2023-01-02",
            "AHS010,5.0,brutal,9,2023-01-01",
            "CS111,5.0,fine,3,2023-01-01",
        ]);

        let results = store
            .search_courses(Some("AHS"), None, Some(4.0))
            .await
            .unwrap();
        let codes: Vec<&str> = results.iter().map(|c| c.course_code.as_str()).collect();
        assert_eq!(codes, vec!["AHS001"]);
    }

    #[tokio::test]
    async fn test_easy_courses_require_two_reviews() {
        let (_file, store) = fixture_store(&[
            "CS111,5.0,fine,2,2023-01-01",
            "CS111,5.0,fine,2,2023-01-02",
            "CS120,5.0,single easy review,2,2023-01-01",
        ]);

        let easy = store.easy_courses(None).await.unwrap();
        let codes: Vec<&str> = easy.iter().map(|c| c.course_code.as_str()).collect();
        assert_eq!(codes, vec!["CS111"]);
    }

    #[tokio::test]
    async fn test_easy_courses_sorted_by_difficulty_then_reviews() {
        let (_file, store) = fixture_store(&[
            "CS101,5.0,a,2,2023-01-01",
            "CS101,5.0,a,2,2023-01-02",
            "CS102,5.0,b,2,2023-01-01",
            "CS102,5.0,b,2,2023-01-02",
            "CS102,5.0,b,2,2023-01-03",
            "CS103,5.0,c,4,2023-01-01",
            "CS103,5.0,c,4,2023-01-02",
        ]);

        let easy = store.easy_courses(None).await.unwrap();
        let codes: Vec<&str> = easy.iter().map(|c| c.course_code.as_str()).collect();
        // CS102 ties CS101 on difficulty but has more reviews.
        assert_eq!(codes, vec!["CS102", "CS101", "CS103"]);
    }

    #[tokio::test]
    async fn test_professor_substring_lookup() {
        let (_file, store) = fixture_store(&[
            "CS111,5.0,Professor Jane Smith was great,5,2023-01-01",
        ]);

        let prof = store.professor("smith").await.unwrap();
        assert_eq!(prof.unwrap().name, "Jane Smith");
    }

    #[tokio::test]
    async fn test_concurrent_first_load_parses_once() {
        let (_file, store) = fixture_store(&["CS111,5.0,fine,5,2023-01-01"]);
        let store = std::sync::Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.all_courses().await.unwrap() })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        // Every concurrent caller sees the same single-parse result.
        for courses in &results {
            assert_eq!(courses.len(), 1);
            assert_eq!(courses[0].course_code, "CS111");
        }
    }

    #[tokio::test]
    async fn test_failed_load_is_retryable() {
        let store = ReviewStore::new("/nonexistent/reviews.csv");
        assert!(store.all_courses().await.is_err());
        // The cell stays empty; a second call attempts the load again.
        assert!(store.all_courses().await.is_err());
    }
}
