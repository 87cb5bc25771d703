//! Single-pass aggregation from raw reviews to derived collections.
//!
//! Groups reviews by course, professor, and department and computes the
//! derived statistics each lookup operation serves. Runs exactly once per
//! process; the store guards that (see `store`).

use std::collections::BTreeMap;
use tracing::info;

use crate::extract;
use crate::ingest::department_code;
use crate::models::{
    Course, Department, DifficultyDistribution, Professor, Review, round2,
};

/// Display names for known department codes. Unknown codes pass through
/// unchanged.
static DEPARTMENT_NAMES: &[(&str, &str)] = &[
    ("AHS", "Applied Health Sciences"),
    ("ANTH", "Anthropology"),
    ("ART", "Art"),
    ("BIOL", "Biology"),
    ("BUS", "Business"),
    ("CHEM", "Chemistry"),
    ("CS", "Computer Science"),
    ("ECON", "Economics"),
    ("EE", "Electrical Engineering"),
    ("ENGL", "English"),
    ("ENGR", "Engineering"),
    ("HIST", "History"),
    ("MATH", "Mathematics"),
    ("ME", "Mechanical Engineering"),
    ("PHIL", "Philosophy"),
    ("PHYS", "Physics"),
    ("POSC", "Political Science"),
    ("PSYC", "Psychology"),
    ("SOC", "Sociology"),
    ("STAT", "Statistics"),
];

/// Resolves a department code to its display name.
pub fn department_name(code: &str) -> String {
    DEPARTMENT_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| code.to_string())
}

/// All derived collections produced by one aggregation pass.
#[derive(Debug, Default)]
pub struct Aggregates {
    pub courses: Vec<Course>,
    pub professors: Vec<Professor>,
    pub departments: Vec<Department>,
}

/// Builds course, professor, and department aggregates from `reviews`.
pub fn aggregate(reviews: &[Review]) -> Aggregates {
    let mut by_course: BTreeMap<&str, Vec<&Review>> = BTreeMap::new();
    let mut by_professor: BTreeMap<&str, Vec<&Review>> = BTreeMap::new();

    for review in reviews {
        by_course
            .entry(review.course_code.as_str())
            .or_default()
            .push(review);
        if let Some(name) = &review.professor_name {
            by_professor.entry(name.as_str()).or_default().push(review);
        }
    }

    let courses: Vec<Course> = by_course
        .iter()
        .map(|(code, group)| build_course(code, group))
        .collect();

    let professors: Vec<Professor> = by_professor
        .iter()
        .map(|(name, group)| build_professor(name, group))
        .collect();

    let departments = build_departments(&courses);

    info!(
        reviews = reviews.len(),
        courses = courses.len(),
        professors = professors.len(),
        departments = departments.len(),
        "Aggregation pass complete"
    );

    Aggregates {
        courses,
        professors,
        departments,
    }
}

fn build_course(code: &str, group: &[&Review]) -> Course {
    let mut distribution = DifficultyDistribution::default();
    for review in group {
        distribution.record(review.difficulty);
    }

    Course {
        course_code: code.to_string(),
        department: department_code(code),
        average_difficulty: mean_difficulty(group),
        total_reviews: group.len(),
        difficulty_distribution: distribution,
        latest_review_date: latest_date(group),
    }
}

fn build_professor(name: &str, group: &[&Review]) -> Professor {
    let mut courses: Vec<String> = group.iter().map(|r| r.course_code.clone()).collect();
    courses.sort();
    courses.dedup();

    Professor {
        name: name.to_string(),
        courses,
        average_difficulty: mean_difficulty(group),
        total_reviews: group.len(),
        characteristics: extract::characteristics(
            group.iter().map(|r| r.comment.as_str()),
        ),
        latest_review_date: latest_date(group),
    }
}

fn build_departments(courses: &[Course]) -> Vec<Department> {
    let mut by_department: BTreeMap<&str, Vec<&Course>> = BTreeMap::new();
    for course in courses {
        by_department
            .entry(course.department.as_str())
            .or_default()
            .push(course);
    }

    by_department
        .iter()
        .map(|(code, group)| {
            let average = group
                .iter()
                .map(|c| c.average_difficulty)
                .sum::<f64>()
                / group.len() as f64;

            let mut by_difficulty: Vec<&&Course> = group.iter().collect();
            by_difficulty.sort_by(|a, b| {
                a.average_difficulty
                    .partial_cmp(&b.average_difficulty)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let easiest: Vec<String> = by_difficulty
                .iter()
                .take(3)
                .map(|c| c.course_code.clone())
                .collect();
            let hardest: Vec<String> = by_difficulty
                .iter()
                .rev()
                .take(3)
                .map(|c| c.course_code.clone())
                .collect();

            let mut by_reviews: Vec<&&Course> = group.iter().collect();
            by_reviews.sort_by(|a, b| b.total_reviews.cmp(&a.total_reviews));
            let most_reviewed: Vec<String> = by_reviews
                .iter()
                .take(5)
                .map(|c| c.course_code.clone())
                .collect();

            Department {
                code: (*code).to_string(),
                name: department_name(code),
                course_count: group.len(),
                average_difficulty: round2(average),
                easiest_courses: easiest,
                hardest_courses: hardest,
                most_reviewed_courses: most_reviewed,
            }
        })
        .collect()
}

fn mean_difficulty(group: &[&Review]) -> f64 {
    let sum: u32 = group.iter().map(|r| u32::from(r.difficulty)).sum();
    round2(sum as f64 / group.len() as f64)
}

fn latest_date(group: &[&Review]) -> String {
    group
        .iter()
        .map(|r| r.review_date.as_str())
        .max()
        .unwrap_or_default()
        .to_string()
}
