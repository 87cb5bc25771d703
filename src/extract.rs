//! Text-pattern extraction over review comments.
//!
//! All of this is heuristic: professor names and semesters only exist in
//! free-form comment text, so extraction is ordered pattern matching with
//! first-match-wins semantics. Pattern order is load-bearing.

use regex::Regex;
use std::sync::LazyLock;

/// A capitalized name: one or more `Xxxx` words.
const NAME: &str = r"([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)";

static TITLE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?:Prof\.?|Professor|Dr\.?)\s+{NAME}")).unwrap()
});
static WITH_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"with\s+{NAME}")).unwrap());
static NAME_IS_WAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{NAME}\s+(?:is|was)\b")).unwrap());

static SEMESTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Fall|Spring|Summer|Winter)\s+(\d{4})\b").unwrap()
});

/// Extracts a professor name from a comment.
///
/// Tries, in order: a title ("Prof./Professor/Dr. Jane Doe"), a
/// "with Jane Doe" phrase, then a bare "Jane Doe is/was" clause. The first
/// pattern that matches wins; no match yields `None`.
pub fn professor_name(comment: &str) -> Option<String> {
    for pattern in [&*TITLE_NAME, &*WITH_NAME, &*NAME_IS_WAS] {
        if let Some(caps) = pattern.captures(comment) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// Extracts a "Season YYYY" semester mention from a comment.
pub fn semester(comment: &str) -> Option<String> {
    SEMESTER
        .captures(comment)
        .map(|caps| format!("{} {}", &caps[1], &caps[2]))
}

/// Ordered keyword -> label rules for teaching characteristics.
///
/// Collection order is rule order, not frequency order, so reordering this
/// table changes output.
const CHARACTERISTIC_RULES: &[(&[&str], &str)] = &[
    (&["easy", "simple", "straightforward"], "Easy grading"),
    (&["hard", "difficult", "challenging"], "Challenging"),
    (&["helpful", "supportive", "caring"], "Helpful"),
    (&["boring", "dry", "monotone"], "Lectures can be dry"),
    (&["interesting", "engaging", "fun"], "Engaging lectures"),
    (&["homework", "busywork", "workload"], "Heavy workload"),
    (&["curve", "curved"], "Grades on a curve"),
    (&["attendance", "mandatory"], "Attendance matters"),
    (&["exam", "midterm", "final"], "Exam heavy"),
    (&["project", "group work"], "Project based"),
];

/// Maximum characteristics collected per professor or course group.
pub const MAX_CHARACTERISTICS: usize = 5;

/// Derives up to [`MAX_CHARACTERISTICS`] labels from a group of comments.
///
/// Comments are lowercased and joined; each rule fires if any of its
/// keywords occurs anywhere in the joined text.
pub fn characteristics<'a, I>(comments: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let text = comments
        .into_iter()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");

    let mut labels = Vec::new();
    for (keywords, label) in CHARACTERISTIC_RULES {
        if keywords.iter().any(|k| text.contains(k)) {
            labels.push((*label).to_string());
            if labels.len() == MAX_CHARACTERISTICS {
                break;
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_professor_title_patterns() {
        assert_eq!(
            professor_name("Dr. Smith was great"),
            Some("Smith".to_string())
        );
        assert_eq!(
            professor_name("Professor Jane Doe explains well"),
            Some("Jane Doe".to_string())
        );
        assert_eq!(
            professor_name("Prof. Lee assigns a lot"),
            Some("Lee".to_string())
        );
    }

    #[test]
    fn test_professor_with_pattern() {
        assert_eq!(
            professor_name("took this with Garcia last year"),
            Some("Garcia".to_string())
        );
    }

    #[test]
    fn test_professor_is_was_pattern() {
        assert_eq!(
            professor_name("Nguyen is the best lecturer here"),
            Some("Nguyen".to_string())
        );
    }

    #[test]
    fn test_title_wins_over_later_patterns() {
        // "Dr. Smith" and "Jones is" both match; title pattern is tried first.
        assert_eq!(
            professor_name("Dr. Smith said Jones is retiring"),
            Some("Smith".to_string())
        );
    }

    #[test]
    fn test_no_professor_match() {
        assert_eq!(professor_name("lots of homework, decent curve"), None);
    }

    #[test]
    fn test_semester_extraction() {
        assert_eq!(
            semester("Took this Fall 2023, heavy final"),
            Some("Fall 2023".to_string())
        );
        assert_eq!(semester("no semester mentioned"), None);
        assert_eq!(semester("Winter 23 is not a full year"), None);
    }

    #[test]
    fn test_characteristics_rule_order_and_cap() {
        let comments = [
            "super easy class, fun lectures",
            "hard exams but helpful professor",
            "boring homework, graded on a curve, mandatory attendance",
        ];
        let labels = characteristics(comments.iter().copied());

        // Rule order, capped at 5 even though more rules match.
        assert_eq!(
            labels,
            vec![
                "Easy grading",
                "Challenging",
                "Helpful",
                "Lectures can be dry",
                "Engaging lectures",
            ]
        );
    }

    #[test]
    fn test_characteristics_empty_input() {
        assert!(characteristics(std::iter::empty()).is_empty());
    }
}
