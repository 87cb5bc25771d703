//! Merging local professor aggregates with external rating data.
//!
//! The weighting constants reproduce the upstream scoring behavior exactly;
//! the blend mixes a 1-5 external rating with a difficulty-derived local
//! ease score and a sentiment term. Do not retune without a data reason.

use crate::ingest::department_code;
use crate::models::{
    DataQuality, EnhancedProfessor, Professor, SentimentSummary, round2,
};

use super::api::ExternalProfessor;

/// Name of the local data source reported in `data_sources`.
pub const LOCAL_SOURCE: &str = "UCR Course Reviews";
/// Name of the external data source reported in `data_sources`.
pub const EXTERNAL_SOURCE: &str = "RateMyProfessors";

/// Local difficulty assumed when an external search hit has no local
/// reviews at all (scale midpoint).
const DEFAULT_LOCAL_DIFFICULTY: f64 = 5.0;

/// Merges a locally derived professor with an external payload.
pub fn combine(professor: &Professor, external: &ExternalProfessor) -> EnhancedProfessor {
    let sentiment = external.sentiment.clone().unwrap_or_default();

    let combined_rating = combined_rating(
        external.rating,
        professor.average_difficulty,
        sentiment.score,
    );
    let recommendation = recommendation_score(
        combined_rating,
        external.num_ratings,
        sentiment.score,
        external.difficulty,
    );
    let quality = data_quality(
        professor.total_reviews,
        external.num_ratings,
        sentiment.mention_count,
    );

    let (first_name, last_name) = split_name(&professor.name);
    let department = external
        .department
        .clone()
        .unwrap_or_else(|| local_department(professor));

    let (pros, cons) = pros_and_cons(&professor.characteristics, &external.tags);

    let summary = format!(
        "{} rates {:.2}/5 across {} external ratings and {} local reviews.",
        professor.name, combined_rating, external.num_ratings, professor.total_reviews
    );

    EnhancedProfessor {
        name: professor.name.clone(),
        first_name,
        last_name,
        department,
        courses: professor.courses.clone(),
        local_average_difficulty: professor.average_difficulty,
        local_review_count: professor.total_reviews,
        characteristics: professor.characteristics.clone(),
        rmp_rating: external.rating,
        rmp_difficulty: external.difficulty,
        rmp_num_ratings: external.num_ratings,
        would_take_again: external.would_take_again,
        tags: external.tags.clone(),
        sentiment: SentimentSummary {
            score: sentiment.score,
            mention_count: sentiment.mention_count,
        },
        data_quality: quality,
        combined_rating,
        recommendation_score: recommendation,
        pros,
        cons,
        summary,
        data_sources: vec![LOCAL_SOURCE.to_string(), EXTERNAL_SOURCE.to_string()],
    }
}

/// Builds an enhanced record from local data alone, used when enrichment is
/// disabled or the external call failed. All external fields are zeroed.
pub fn fallback(professor: &Professor) -> EnhancedProfessor {
    let (first_name, last_name) = split_name(&professor.name);
    let (pros, cons) = pros_and_cons(&professor.characteristics, &[]);

    let ease = (11.0 - professor.average_difficulty) / 2.0;
    let combined = round2(ease);
    let recommendation =
        clamp_score(((11.0 - professor.average_difficulty) * 10.0).round());

    EnhancedProfessor {
        name: professor.name.clone(),
        first_name,
        last_name,
        department: local_department(professor),
        courses: professor.courses.clone(),
        local_average_difficulty: professor.average_difficulty,
        local_review_count: professor.total_reviews,
        characteristics: professor.characteristics.clone(),
        rmp_rating: 0.0,
        rmp_difficulty: 0.0,
        rmp_num_ratings: 0,
        would_take_again: None,
        tags: Vec::new(),
        sentiment: SentimentSummary::default(),
        data_quality: DataQuality::Low,
        combined_rating: combined,
        recommendation_score: recommendation,
        pros,
        cons,
        summary: format!(
            "{} has {} local reviews averaging difficulty {:.2}; no external data.",
            professor.name, professor.total_reviews, professor.average_difficulty
        ),
        data_sources: vec![LOCAL_SOURCE.to_string()],
    }
}

/// Builds an enhanced record from an external search hit with no local
/// counterpart. The local ease term uses the scale midpoint.
pub fn from_external(external: &ExternalProfessor) -> EnhancedProfessor {
    let placeholder = Professor {
        name: external.name.clone(),
        courses: Vec::new(),
        average_difficulty: DEFAULT_LOCAL_DIFFICULTY,
        total_reviews: 0,
        characteristics: Vec::new(),
        latest_review_date: String::new(),
    };
    let mut enhanced = combine(&placeholder, external);
    enhanced.local_average_difficulty = 0.0;
    enhanced.data_sources = vec![EXTERNAL_SOURCE.to_string()];
    enhanced
}

/// 0.7 x external rating + 0.2 x local ease + 0.1 x scaled sentiment,
/// rounded to 2 dp. No explicit clamp.
pub fn combined_rating(external_rating: f64, local_difficulty: f64, sentiment: f64) -> f64 {
    let ease = (11.0 - local_difficulty) / 2.0;
    let sentiment_term = (sentiment + 1.0) * 2.5;
    round2(0.7 * external_rating + 0.2 * ease + 0.1 * sentiment_term)
}

/// combined x 20, plus a rating-count bonus and sentiment bonus, minus a
/// difficulty penalty, clamped to 0..=100.
pub fn recommendation_score(
    combined: f64,
    num_ratings: u32,
    sentiment: f64,
    external_difficulty: f64,
) -> u8 {
    let mut bonus = match num_ratings {
        n if n >= 20 => 10.0,
        n if n >= 10 => 5.0,
        _ => 0.0,
    };
    if sentiment > 0.2 {
        bonus += 5.0;
    }
    let penalty = if external_difficulty > 4.0 { 10.0 } else { 0.0 };

    clamp_score((combined * 20.0 + bonus - penalty).round())
}

/// Point-scored quality tier: >=6 high, >=3 medium, else low.
pub fn data_quality(local_reviews: usize, external_ratings: u32, mentions: u32) -> DataQuality {
    let mut points = 0u32;

    points += match local_reviews {
        n if n >= 5 => 2,
        n if n >= 2 => 1,
        _ => 0,
    };
    points += match external_ratings {
        n if n >= 20 => 3,
        n if n >= 5 => 2,
        n if n >= 1 => 1,
        _ => 0,
    };
    points += match mentions {
        n if n >= 5 => 2,
        n if n >= 1 => 1,
        _ => 0,
    };

    match points {
        p if p >= 6 => DataQuality::High,
        p if p >= 3 => DataQuality::Medium,
        _ => DataQuality::Low,
    }
}

const POSITIVE_KEYWORDS: &[&str] = &[
    "easy", "helpful", "engaging", "caring", "clear", "fair", "curve", "fun",
    "flexible", "amazing", "respected", "accessible",
];
const NEGATIVE_KEYWORDS: &[&str] = &[
    "hard", "difficult", "challenging", "dry", "boring", "tough", "strict",
    "heavy", "workload", "unclear", "exam",
];

/// Splits characteristics and external tags into pros and cons by keyword
/// match. Each list is capped at 5 with duplicates removed, insertion order
/// preserved.
pub fn pros_and_cons(characteristics: &[String], tags: &[String]) -> (Vec<String>, Vec<String>) {
    let mut pros = Vec::new();
    let mut cons = Vec::new();

    for label in characteristics.iter().chain(tags.iter()) {
        let lower = label.to_lowercase();
        if POSITIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
            push_capped(&mut pros, label);
        } else if NEGATIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
            push_capped(&mut cons, label);
        }
    }

    (pros, cons)
}

fn push_capped(list: &mut Vec<String>, label: &str) {
    if list.len() < 5 && !list.iter().any(|l| l == label) {
        list.push(label.to_string());
    }
}

fn clamp_score(value: f64) -> u8 {
    value.clamp(0.0, 100.0) as u8
}

/// Splits on the first whitespace: "Jane Ann Smith" -> ("Jane", "Ann Smith").
fn split_name(name: &str) -> (String, String) {
    match name.split_once(char::is_whitespace) {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (name.to_string(), String::new()),
    }
}

fn local_department(professor: &Professor) -> String {
    professor
        .courses
        .first()
        .map(|code| department_code(code))
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::api::ExternalSentiment;

    fn local_prof() -> Professor {
        Professor {
            name: "Jane Smith".to_string(),
            courses: vec!["CS111".to_string(), "CS141".to_string()],
            average_difficulty: 2.0,
            total_reviews: 3,
            characteristics: vec!["Easy grading".to_string(), "Challenging".to_string()],
            latest_review_date: "2023-12-01".to_string(),
        }
    }

    fn external_prof() -> ExternalProfessor {
        ExternalProfessor {
            name: "Jane Smith".to_string(),
            department: None,
            rating: 4.0,
            difficulty: 3.0,
            num_ratings: 25,
            would_take_again: Some(0.9),
            tags: vec!["Caring".to_string(), "Tough grader".to_string()],
            sentiment: Some(ExternalSentiment {
                score: 0.2,
                mention_count: 6,
            }),
        }
    }

    #[test]
    fn test_combined_rating_worked_example() {
        // 0.7*4.0 + 0.2*((11-2)/2) + 0.1*((0.2+1)*2.5) = 2.8 + 0.9 + 0.3
        assert_eq!(combined_rating(4.0, 2.0, 0.2), 4.0);
    }

    #[test]
    fn test_recommendation_score_bonuses_and_penalty() {
        // combined 4.0 -> 80, +10 (>=20 ratings), sentiment 0.2 is not >0.2,
        // difficulty 3.0 -> no penalty.
        assert_eq!(recommendation_score(4.0, 25, 0.2, 3.0), 90);
        // +5 sentiment bonus when strictly above 0.2.
        assert_eq!(recommendation_score(4.0, 25, 0.3, 3.0), 95);
        // -10 when external difficulty above 4.
        assert_eq!(recommendation_score(4.0, 25, 0.3, 4.5), 85);
        // mid-tier rating-count bonus.
        assert_eq!(recommendation_score(4.0, 12, 0.0, 3.0), 85);
        // clamped at 100.
        assert_eq!(recommendation_score(5.0, 25, 0.5, 1.0), 100);
    }

    #[test]
    fn test_data_quality_tiers() {
        assert_eq!(data_quality(5, 20, 5), DataQuality::High); // 2+3+2 = 7
        assert_eq!(data_quality(2, 5, 0), DataQuality::Medium); // 1+2 = 3
        assert_eq!(data_quality(1, 1, 1), DataQuality::Low); // 0+1+1 = 2
        assert_eq!(data_quality(0, 0, 0), DataQuality::Low);
    }

    #[test]
    fn test_combine_merges_both_sources() {
        let enhanced = combine(&local_prof(), &external_prof());

        assert_eq!(enhanced.first_name, "Jane");
        assert_eq!(enhanced.last_name, "Smith");
        // No external department, so derived from first taught course.
        assert_eq!(enhanced.department, "CS");
        assert_eq!(enhanced.combined_rating, 4.0);
        assert_eq!(enhanced.rmp_num_ratings, 25);
        assert_eq!(enhanced.data_quality, DataQuality::High);
        assert_eq!(
            enhanced.data_sources,
            vec![LOCAL_SOURCE.to_string(), EXTERNAL_SOURCE.to_string()]
        );
    }

    #[test]
    fn test_fallback_zeroes_external_fields() {
        let enhanced = fallback(&local_prof());

        assert_eq!(enhanced.rmp_num_ratings, 0);
        assert_eq!(enhanced.rmp_rating, 0.0);
        assert_eq!(enhanced.data_quality, DataQuality::Low);
        assert_eq!(enhanced.data_sources, vec![LOCAL_SOURCE.to_string()]);
        // (11 - 2) * 10 = 90.
        assert_eq!(enhanced.recommendation_score, 90);
        // (11 - 2) / 2 = 4.5.
        assert_eq!(enhanced.combined_rating, 4.5);
    }

    #[test]
    fn test_pros_and_cons_split_dedupe_cap() {
        let characteristics = vec![
            "Easy grading".to_string(),
            "Challenging".to_string(),
            "Easy grading".to_string(),
        ];
        let tags = vec!["Caring".to_string(), "Tough grader".to_string()];
        let (pros, cons) = pros_and_cons(&characteristics, &tags);

        assert_eq!(pros, vec!["Easy grading", "Caring"]);
        assert_eq!(cons, vec!["Challenging", "Tough grader"]);
    }

    #[test]
    fn test_split_name_single_word() {
        assert_eq!(split_name("Nguyen"), ("Nguyen".to_string(), String::new()));
        assert_eq!(
            split_name("Jane Ann Smith"),
            ("Jane".to_string(), "Ann Smith".to_string())
        );
    }
}
