use diesel::prelude::*;

use crate::domain::course::{CatalogCourse, Institution};
use crate::domain::types::InstitutionId;
use crate::models::course::{University, UniversityCourse};
use crate::repository::{CatalogReader, DieselRepository, RepositoryError, RepositoryResult};

impl CatalogReader for DieselRepository {
    fn get_candidate_courses(
        &self,
        institution_id: InstitutionId,
    ) -> RepositoryResult<Vec<CatalogCourse>> {
        use crate::schema::university_courses;

        let mut conn = self.conn()?;

        let rows = university_courses::table
            .filter(university_courses::university_id.eq(institution_id.get()))
            .order(university_courses::id.asc())
            .select(UniversityCourse::as_select())
            .load::<UniversityCourse>(&mut conn)?;

        rows.into_iter()
            .map(CatalogCourse::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| RepositoryError::ValidationError(err.to_string()))
    }

    fn find_institution_by_name(&self, name: &str) -> RepositoryResult<Institution> {
        use crate::schema::universities;

        let mut conn = self.conn()?;

        // Lowest id wins when names are duplicated
        let row = universities::table
            .filter(universities::name.eq(name))
            .order(universities::id.asc())
            .select(University::as_select())
            .first::<University>(&mut conn)?;

        Institution::try_from(row).map_err(|err| RepositoryError::ValidationError(err.to_string()))
    }
}
