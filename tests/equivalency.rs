mod common;

use std::sync::Arc;

use course_equivalency::domain::course::{CatalogCourse, InputCourseDescriptor};
use course_equivalency::domain::result::{Decision, classify};
use course_equivalency::domain::types::{CourseId, InstitutionId};
use course_equivalency::processing::embedding::HashingEmbedder;
use course_equivalency::processing::matcher::{EquivalencyMatcher, MatchError};
use course_equivalency::repository::{CatalogReader, DieselRepository};

use common::{TestDb, new_course};

fn course(id: i32, title: &str, description: &str) -> CatalogCourse {
    CatalogCourse {
        id: CourseId::new(id).expect("valid course id"),
        institution_id: InstitutionId::new(1).expect("valid institution id"),
        title: title.to_string(),
        description: description.to_string(),
        credits: Some(3),
        department: Some("Computer Science".to_string()),
        prerequisites: None,
        language: "en".to_string(),
    }
}

fn catalog() -> Vec<CatalogCourse> {
    vec![
        course(1, "Introduction to Programming", "basics of programming, loops and functions"),
        course(2, "Database Systems", "database normalization"),
        course(3, "Discrete Mathematics", "sets, relations, graphs and proofs"),
    ]
}

fn matcher() -> EquivalencyMatcher {
    EquivalencyMatcher::new(Arc::new(HashingEmbedder::default()))
}

#[test]
fn related_course_outranks_unrelated_one() {
    let matcher = matcher();
    let query = "introductory course covering loops and functions";

    let best = matcher
        .match_single(query, &catalog())
        .expect("match succeeds");
    let unrelated = matcher
        .match_single(query, &catalog()[1..2])
        .expect("match succeeds");

    assert_eq!(best.matched.as_ref().map(|c| c.id.get()), Some(1));
    assert!(best.score > unrelated.score);
}

#[test]
fn scores_stay_in_range_and_match_a_candidate() {
    let matcher = matcher();
    let candidates = catalog();

    for query in [
        "loops",
        "relational database design and normalization",
        "graph proofs",
        "medieval poetry",
        "",
    ] {
        let result = matcher
            .match_single(query, &candidates)
            .expect("match succeeds");

        assert!((-100.0..=100.0).contains(&result.score), "{query}: {}", result.score);
        assert_eq!(result.decision, classify(result.score));
        let matched = result.matched.expect("non-empty catalog always matches");
        assert!(candidates.contains(&matched));
    }
}

#[test]
fn repeated_matches_are_bit_identical() {
    let matcher = matcher();
    let candidates = catalog();

    let first = matcher
        .match_single("programming with functions", &candidates)
        .expect("match succeeds");
    let second = matcher
        .match_single("programming with functions", &candidates)
        .expect("match succeeds");

    assert_eq!(first.score.to_bits(), second.score.to_bits());
    assert_eq!(first.matched, second.matched);
}

#[test]
fn empty_description_yields_defined_low_score() {
    let course_a = course(1, "A", "loops and functions");

    let result = matcher()
        .match_single("", std::slice::from_ref(&course_a))
        .expect("match succeeds");

    assert_eq!(result.matched, Some(course_a));
    assert_eq!(result.score, 0.0);
    assert_eq!(result.decision, Decision::Rejected);
}

#[test]
fn empty_catalog_yields_no_match() {
    let result = matcher()
        .match_single("loops", &[])
        .expect("match succeeds");

    assert!(result.matched.is_none());
    assert_eq!(result.score, 0.0);
    assert_eq!(result.decision, Decision::Rejected);
}

#[test]
fn single_description_set_equals_single_match() {
    let matcher = matcher();
    let candidates = catalog();
    let description = "Sets, graphs and relations";

    assert_eq!(
        matcher
            .match_set(&[description], &candidates)
            .expect("match succeeds"),
        matcher
            .match_single(description, &candidates)
            .expect("match succeeds")
    );
}

#[test]
fn set_combines_modules_into_one_document() {
    let matcher = matcher();
    let candidates = catalog();

    let combined = matcher
        .match_set(&["Loops.", "Functions.", "Programming basics."], &candidates)
        .expect("match succeeds");

    assert_eq!(combined.matched.as_ref().map(|c| c.id.get()), Some(1));
    assert!((combined.score - 100.0).abs() < 1e-4);
    assert_eq!(combined.decision, Decision::Accepted);
}

#[test]
fn plan_preserves_order_and_averages_scores() {
    let matcher = matcher();
    let candidates = catalog();
    let plan = vec![
        InputCourseDescriptor::new("DB", "database normalization").with_credits(3),
        InputCourseDescriptor::new("Prog", "loops and functions").with_credits(4),
        InputCourseDescriptor::new("Poetry", "medieval poetry"),
    ];

    let result = matcher.match_plan(&plan, &candidates).expect("plan matches");

    assert_eq!(result.items.len(), plan.len());
    for (item, input) in result.items.iter().zip(&plan) {
        assert_eq!(&item.input, input);
    }
    assert_eq!(result.items[0].result.matched.as_ref().map(|c| c.id.get()), Some(2));
    assert_eq!(result.items[1].result.matched.as_ref().map(|c| c.id.get()), Some(1));

    let mean = result.items.iter().map(|item| item.result.score).sum::<f64>() / 3.0;
    assert!((result.aggregate_score - mean).abs() < 1e-9);
}

#[test]
fn empty_plan_is_rejected_explicitly() {
    assert_eq!(
        matcher().match_plan(&[], &catalog()),
        Err(MatchError::EmptyPlan)
    );
}

#[test]
fn english_query_prefers_english_catalog_entry_over_arabic_one() {
    let candidates = vec![
        course(1, "مقدمة في البرمجة", "أساسيات برمجة Python، الحلقات، الدوال."),
        course(2, "Introduction to Programming", "Basics of Python programming, loops, functions."),
    ];

    let result = matcher()
        .match_single("Python programming with loops and functions", &candidates)
        .expect("match succeeds");

    assert_eq!(result.matched.as_ref().map(|c| c.id.get()), Some(2));
}

#[test]
fn catalog_loaded_from_database_feeds_the_matcher() {
    let db = TestDb::new("matching.db");
    let dhofar = db.add_university("Dhofar University");
    db.add_course(new_course(
        dhofar,
        "Introduction to Programming",
        Some("Basics of Python programming, loops, functions."),
    ));
    db.add_course(new_course(
        dhofar,
        "Database Systems",
        Some("SQL, relational models, normalization."),
    ));
    let repo = DieselRepository::new(db.pool());
    let institution = repo
        .find_institution_by_name("Dhofar University")
        .expect("institution exists");
    let candidates = repo
        .get_candidate_courses(institution.id)
        .expect("courses load");

    let result = matcher()
        .match_single("Relational models and SQL normalization", &candidates)
        .expect("match succeeds");

    assert_eq!(
        result.matched.map(|course| course.title),
        Some("Database Systems".to_string())
    );
    assert_eq!(result.decision, Decision::Accepted);
}
