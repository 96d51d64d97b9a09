use thiserror::Error;

use crate::db::{DbConnection, DbPool};
use crate::domain::course::{CatalogCourse, Institution};
use crate::domain::types::InstitutionId;

pub mod catalog;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("validation error: {0}")]
    ValidationError(String),
    #[error("database connection error: {0}")]
    ConnectionError(String),
    #[error("unexpected repository error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<diesel::result::Error> for RepositoryError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::NotFound => RepositoryError::NotFound,
            other => RepositoryError::Unexpected(other.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(error: diesel::r2d2::PoolError) -> Self {
        RepositoryError::ConnectionError(error.to_string())
    }
}

/// Read access to reference catalogs.
pub trait CatalogReader {
    /// Courses of one institution, in catalog insertion order.
    fn get_candidate_courses(
        &self,
        institution_id: InstitutionId,
    ) -> RepositoryResult<Vec<CatalogCourse>>;

    fn find_institution_by_name(&self, name: &str) -> RepositoryResult<Institution>;
}

/// Diesel-backed repository over the catalog tables.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}
