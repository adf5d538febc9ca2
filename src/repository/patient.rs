//! Diesel implementation of the patient repository.

use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::patient::{NewPatient, Patient, PatientColumn, PatientSort};
use crate::domain::types::{HubId, PatientId};
use crate::filter::{FilterColumn, FilterValue, Predicate, SortSpec, like_pattern};
use crate::models::patient::{NewPatient as DbNewPatient, Patient as DbPatient};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, PatientListQuery, PatientReader, PatientWriter};
use crate::schema::patients;

type BoxedPatients<'a> = patients::BoxedQuery<'a, Sqlite>;

/// Translates one predicate into a `WHERE` clause on `patients`.
fn apply_predicate<'a>(
    query: BoxedPatients<'a>,
    predicate: &Predicate<PatientColumn>,
) -> RepositoryResult<BoxedPatients<'a>> {
    use FilterValue::{Int, Text, Timestamp};

    let query = match predicate {
        Predicate::Eq(PatientColumn::HubId, Int(hub_id)) => {
            query.filter(patients::hub_id.eq(*hub_id))
        }
        Predicate::Eq(PatientColumn::Mrn, Text(mrn)) => query.filter(patients::mrn.eq(mrn.clone())),
        Predicate::Contains(PatientColumn::Name, term) => {
            query.filter(patients::name.like(like_pattern(term)).escape('\\'))
        }
        Predicate::Contains(PatientColumn::Email, term) => {
            query.filter(patients::email.like(like_pattern(term)).escape('\\'))
        }
        Predicate::Gte(PatientColumn::CreatedAt, Timestamp(at)) => {
            query.filter(patients::created_at.ge(*at))
        }
        Predicate::Lte(PatientColumn::CreatedAt, Timestamp(at)) => {
            query.filter(patients::created_at.le(*at))
        }
        other => {
            return Err(RepositoryError::ValidationError(format!(
                "unsupported filter on patients.{}: {other:?}",
                other.column().name()
            )));
        }
    };

    Ok(query)
}

/// Builds a boxed query restricted by every predicate of the conjunction.
fn filtered<'a>(predicates: &[Predicate<PatientColumn>]) -> RepositoryResult<BoxedPatients<'a>> {
    predicates
        .iter()
        .try_fold(patients::table.into_boxed(), apply_predicate)
}

fn ordered<'a>(query: BoxedPatients<'a>, sort: &SortSpec<PatientSort>) -> BoxedPatients<'a> {
    match sort.key {
        PatientSort::CreatedAt => {
            order_with_tiebreak!(query, patients::created_at, patients::id, sort.direction)
        }
        PatientSort::UpdatedAt => {
            order_with_tiebreak!(query, patients::updated_at, patients::id, sort.direction)
        }
        PatientSort::Name => {
            order_with_tiebreak!(query, patients::name, patients::id, sort.direction)
        }
        PatientSort::Mrn => order_with_tiebreak!(query, patients::mrn, patients::id, sort.direction),
    }
}

impl PatientReader for DieselRepository {
    fn get_patient_by_id(&self, id: PatientId, hub_id: HubId) -> RepositoryResult<Option<Patient>> {
        let mut conn = self.conn()?;

        let db_patient = patients::table
            .filter(patients::id.eq(id.get()))
            .filter(patients::hub_id.eq(hub_id.get()))
            .first::<DbPatient>(&mut conn)
            .optional()?;

        match db_patient {
            Some(db_patient) => Ok(Some(
                Patient::try_from(db_patient).map_err(RepositoryError::from)?,
            )),
            None => Ok(None),
        }
    }

    fn list_patients(&self, query: &PatientListQuery) -> RepositoryResult<(usize, Vec<Patient>)> {
        let mut conn = self.conn()?;
        let predicates = query.filter.predicates();

        // Get the total count before applying pagination
        let total = filtered(predicates)?
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        if total == 0 || query.page.offset() >= total as i64 {
            return Ok((total, Vec::new()));
        }

        let items = ordered(filtered(predicates)?, &query.sort)
            .offset(query.page.offset())
            .limit(query.page.count())
            .load::<DbPatient>(&mut conn)?
            .into_iter()
            .map(|db_patient| Patient::try_from(db_patient).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, items))
    }
}

impl PatientWriter for DieselRepository {
    fn create_patient(&self, new_patient: &NewPatient) -> RepositoryResult<Patient> {
        let mut conn = self.conn()?;

        let db_new_patient: DbNewPatient = new_patient.into();

        let db_patient = diesel::insert_into(patients::table)
            .values(&db_new_patient)
            .get_result::<DbPatient>(&mut conn)?;

        Patient::try_from(db_patient).map_err(RepositoryError::from)
    }
}
