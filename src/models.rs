//! Core data types for reviews and the derived aggregates.

use serde::{Deserialize, Serialize};

/// A single validated student review, built from one CSV row.
///
/// Immutable after ingestion. Rows that fail validation (missing course
/// code, difficulty outside 1..=10) never become a `Review`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub course_code: String,
    /// Self-reported difficulty, 1 (easiest) to 10 (hardest).
    pub difficulty: u8,
    pub comment: String,
    /// Professor name extracted from the comment text, if any pattern matched.
    pub professor_name: Option<String>,
    /// Raw date string from the CSV; compared lexically for "latest".
    pub review_date: String,
    /// e.g. "Fall 2023", extracted from the comment text.
    pub semester: Option<String>,
}

/// Counts of reviews per difficulty bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DifficultyDistribution {
    /// difficulty <= 2
    pub very_easy: usize,
    /// 3..=4
    pub easy: usize,
    /// 5..=6
    pub moderate: usize,
    /// 7..=8
    pub hard: usize,
    /// difficulty >= 9
    pub very_hard: usize,
}

impl DifficultyDistribution {
    /// Increments the bucket covering `difficulty`.
    pub fn record(&mut self, difficulty: u8) {
        match difficulty {
            0..=2 => self.very_easy += 1,
            3..=4 => self.easy += 1,
            5..=6 => self.moderate += 1,
            7..=8 => self.hard += 1,
            _ => self.very_hard += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.very_easy + self.easy + self.moderate + self.hard + self.very_hard
    }
}

/// Aggregate statistics for one course code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub course_code: String,
    pub department: String,
    /// Arithmetic mean of member review difficulties, rounded to 2 dp.
    pub average_difficulty: f64,
    pub total_reviews: usize,
    pub difficulty_distribution: DifficultyDistribution,
    pub latest_review_date: String,
}

/// Aggregate statistics for one extracted professor name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professor {
    pub name: String,
    /// Course codes this professor was mentioned in, sorted, deduplicated.
    pub courses: Vec<String>,
    pub average_difficulty: f64,
    pub total_reviews: usize,
    /// Up to 5 teaching-characteristic labels, in rule order.
    pub characteristics: Vec<String>,
    pub latest_review_date: String,
}

/// Aggregate statistics for one department code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub code: String,
    pub name: String,
    pub course_count: usize,
    pub average_difficulty: f64,
    /// Up to 3 course codes, lowest average difficulty first.
    pub easiest_courses: Vec<String>,
    /// Up to 3 course codes, highest average difficulty first.
    pub hardest_courses: Vec<String>,
    /// Up to 5 course codes by review count, descending.
    pub most_reviewed_courses: Vec<String>,
}

/// How much corroborating data backs an enriched professor record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Low,
    Medium,
    High,
}

/// Sentiment summary carried over from the external rating service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentSummary {
    /// -1.0 (negative) to 1.0 (positive).
    pub score: f64,
    pub mention_count: u32,
}

/// A [`Professor`] merged with external rating data, built per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedProfessor {
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub courses: Vec<String>,
    pub local_average_difficulty: f64,
    pub local_review_count: usize,
    pub characteristics: Vec<String>,

    // External-source fields, zeroed when enrichment is off or failed.
    pub rmp_rating: f64,
    pub rmp_difficulty: f64,
    pub rmp_num_ratings: u32,
    pub would_take_again: Option<f64>,
    pub tags: Vec<String>,
    pub sentiment: SentimentSummary,

    pub data_quality: DataQuality,
    /// Weighted blend of external rating, local ease, and sentiment; 2 dp.
    pub combined_rating: f64,
    /// 0..=100.
    pub recommendation_score: u8,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub summary: String,
    pub data_sources: Vec<String>,
}

/// Rounds to two decimal places, the precision used for every derived average.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
