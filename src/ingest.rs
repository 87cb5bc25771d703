//! CSV ingestion for the course review dataset.
//!
//! Reads the static review export once, validates and normalizes each row,
//! and yields [`Review`] records ready for aggregation. Invalid rows are
//! skipped silently; an unreadable file fails the whole load.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::extract;
use crate::models::Review;

/// One raw row of the review export, mapped by header name.
///
/// The column schema (`Class`, `Average Difficulty`, `Additional Comments`,
/// `Difficulty`, `Date`) is fixed by the upstream export and must be
/// preserved for compatibility.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Class", default)]
    class: String,
    #[serde(rename = "Average Difficulty", default)]
    _average_difficulty: String,
    #[serde(rename = "Additional Comments", default)]
    comments: String,
    #[serde(rename = "Difficulty", default)]
    difficulty: String,
    #[serde(rename = "Date", default)]
    date: String,
}

/// Loads and validates all reviews from the CSV at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or the CSV structure is
/// unreadable. Individual bad rows are dropped, not errors.
pub fn load_reviews(path: impl AsRef<Path>) -> Result<Vec<Review>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open reviews CSV at {}", path.display()))?;

    let mut rdr = csv::Reader::from_reader(file);
    let mut reviews = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.deserialize() {
        let row: RawRow = result.context("malformed CSV row structure")?;
        match review_from_row(row) {
            Some(review) => reviews.push(review),
            None => skipped += 1,
        }
    }

    info!(
        path = %path.display(),
        loaded = reviews.len(),
        skipped,
        "Review CSV ingested"
    );
    Ok(reviews)
}

/// Validates one raw row, returning `None` for rows that must be skipped.
fn review_from_row(row: RawRow) -> Option<Review> {
    let course_code = normalize_course_code(&row.class);
    if course_code.is_empty() {
        debug!("Skipping row with empty course code");
        return None;
    }

    let difficulty: u8 = match row.difficulty.trim().parse() {
        Ok(d) if (1..=10).contains(&d) => d,
        _ => {
            debug!(course = %course_code, raw = %row.difficulty, "Skipping row with invalid difficulty");
            return None;
        }
    };

    Some(Review {
        professor_name: extract::professor_name(&row.comments),
        semester: extract::semester(&row.comments),
        course_code,
        difficulty,
        comment: row.comments,
        review_date: row.date.trim().to_string(),
    })
}

/// Trims, uppercases, and strips internal whitespace: `" cs 111 "` -> `"CS111"`.
pub fn normalize_course_code(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// The leading run of alphabetic characters of a course code, or `"UNKNOWN"`.
pub fn department_code(course_code: &str) -> String {
    let prefix: String = course_code
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect();
    if prefix.is_empty() {
        "UNKNOWN".to_string()
    } else {
        prefix
    }
}
