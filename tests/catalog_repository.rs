mod common;

use course_equivalency::domain::types::InstitutionId;
use course_equivalency::repository::{CatalogReader, DieselRepository, RepositoryError};

use common::{TestDb, new_course};

#[test]
fn candidates_are_scoped_to_one_institution_in_insertion_order() {
    let db = TestDb::new("scoped.db");
    let dhofar = db.add_university("Dhofar University");
    let other = db.add_university("Other College");
    db.add_course(new_course(
        dhofar,
        "Introduction to Programming",
        Some("Basics of Python programming, loops, functions."),
    ));
    db.add_course(new_course(
        other,
        "Compilers",
        Some("Parsing and code generation."),
    ));
    db.add_course(new_course(
        dhofar,
        "Database Systems",
        Some("SQL, relational models, normalization."),
    ));
    let repo = DieselRepository::new(db.pool());

    let courses = repo
        .get_candidate_courses(InstitutionId::new(dhofar).expect("valid id"))
        .expect("courses load");

    let titles: Vec<&str> = courses.iter().map(|course| course.title.as_str()).collect();
    assert_eq!(titles, vec!["Introduction to Programming", "Database Systems"]);
    assert!(courses.iter().all(|course| course.institution_id.get() == dhofar));
}

#[test]
fn null_description_becomes_empty_text() {
    let db = TestDb::new("nulls.db");
    let dhofar = db.add_university("Dhofar University");
    let mut course = new_course(dhofar, "Seminar", None);
    course.language = None;
    db.add_course(course);
    let repo = DieselRepository::new(db.pool());

    let courses = repo
        .get_candidate_courses(InstitutionId::new(dhofar).expect("valid id"))
        .expect("courses load");

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].description, "");
    assert_eq!(courses[0].language, "en");
    assert_eq!(courses[0].credits, Some(3));
}

#[test]
fn institution_without_courses_has_empty_catalog() {
    let db = TestDb::new("empty.db");
    let id = db.add_university("Empty University");
    let repo = DieselRepository::new(db.pool());

    let courses = repo
        .get_candidate_courses(InstitutionId::new(id).expect("valid id"))
        .expect("courses load");

    assert!(courses.is_empty());
}

#[test]
fn institutions_are_found_by_name() {
    let db = TestDb::new("names.db");
    db.add_university("Other College");
    let dhofar = db.add_university("Dhofar University");
    let repo = DieselRepository::new(db.pool());

    let institution = repo
        .find_institution_by_name("Dhofar University")
        .expect("institution exists");
    assert_eq!(institution.id.get(), dhofar);
    assert_eq!(institution.name, "Dhofar University");

    assert!(matches!(
        repo.find_institution_by_name("Missing"),
        Err(RepositoryError::NotFound)
    ));
}
