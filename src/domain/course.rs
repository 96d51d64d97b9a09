use serde::{Deserialize, Serialize};

use crate::domain::types::{CourseId, InstitutionId};

/// An institution owning a reference catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub id: InstitutionId,
    pub name: String,
}

/// A course of a reference catalog. Read-only for the matching core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogCourse {
    pub id: CourseId,
    pub institution_id: InstitutionId,
    pub title: String,
    /// Raw description; an empty string is valid but uninformative.
    pub description: String,
    pub credits: Option<i32>,
    pub department: Option<String>,
    pub prerequisites: Option<String>,
    pub language: String,
}

/// An externally supplied course to be matched.
///
/// Credits are carried as submitted and never validated here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputCourseDescriptor {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub credits: Option<i32>,
}

impl InputCourseDescriptor {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            credits: None,
        }
    }

    pub fn with_credits(mut self, credits: i32) -> Self {
        self.credits = Some(credits);
        self
    }
}
