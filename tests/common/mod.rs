//! Helpers for integration tests.
#![allow(dead_code)]

use course_equivalency::db::{DbPool, establish_connection_pool};
use course_equivalency::models::course::NewUniversityCourse;
use course_equivalency::schema::{universities, university_courses};
use diesel::prelude::*;
use tempfile::TempDir;

const CREATE_TABLES: [&str; 2] = [
    "CREATE TABLE universities (
        id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        name TEXT NOT NULL
    )",
    "CREATE TABLE university_courses (
        id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        credits INTEGER,
        department TEXT,
        prerequisites TEXT,
        language TEXT DEFAULT 'en',
        university_id INTEGER REFERENCES universities(id)
    )",
];

/// Temporary catalog database used in integration tests.
pub struct TestDb {
    pool: DbPool,
    _dir: TempDir,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory.");
        let path = dir.path().join(filename);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 temp path"))
            .expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        for statement in CREATE_TABLES {
            diesel::sql_query(statement)
                .execute(&mut conn)
                .expect("Failed to create catalog tables.");
        }
        TestDb { pool, _dir: dir }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn add_university(&self, name: &str) -> i32 {
        let mut conn = self.pool.get().expect("connection");
        diesel::insert_into(universities::table)
            .values(universities::name.eq(name))
            .execute(&mut conn)
            .expect("insert university");
        universities::table
            .select(universities::id)
            .order(universities::id.desc())
            .first(&mut conn)
            .expect("university id")
    }

    pub fn add_course(&self, course: NewUniversityCourse<'_>) {
        let mut conn = self.pool.get().expect("connection");
        diesel::insert_into(university_courses::table)
            .values(&course)
            .execute(&mut conn)
            .expect("insert course");
    }
}

pub fn new_course<'a>(
    university_id: i32,
    title: &'a str,
    description: Option<&'a str>,
) -> NewUniversityCourse<'a> {
    NewUniversityCourse {
        title,
        description,
        credits: Some(3),
        department: Some("Computer Science"),
        prerequisites: None,
        language: Some("en"),
        university_id: Some(university_id),
    }
}
