//! Diesel row types for the catalog tables.

use diesel::prelude::*;

use crate::domain::course::{CatalogCourse, Institution};
use crate::domain::types::{CourseId, InstitutionId, TypeConstraintError};

/// Language assumed for courses stored without one.
pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::universities)]
pub struct University {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::university_courses)]
pub struct UniversityCourse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub credits: Option<i32>,
    pub department: Option<String>,
    pub prerequisites: Option<String>,
    pub language: Option<String>,
    pub university_id: Option<i32>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::university_courses)]
pub struct NewUniversityCourse<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub credits: Option<i32>,
    pub department: Option<&'a str>,
    pub prerequisites: Option<&'a str>,
    pub language: Option<&'a str>,
    pub university_id: Option<i32>,
}

impl TryFrom<University> for Institution {
    type Error = TypeConstraintError;

    fn try_from(row: University) -> Result<Self, Self::Error> {
        Ok(Self {
            id: InstitutionId::new(row.id)?,
            name: row.name,
        })
    }
}

impl TryFrom<UniversityCourse> for CatalogCourse {
    type Error = TypeConstraintError;

    fn try_from(row: UniversityCourse) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CourseId::new(row.id)?,
            institution_id: InstitutionId::new(row.university_id.unwrap_or_default())?,
            title: row.title,
            description: row.description.unwrap_or_default(),
            credits: row.credits,
            department: row.department,
            prerequisites: row.prerequisites,
            language: row
                .language
                .filter(|language| !language.is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        })
    }
}
