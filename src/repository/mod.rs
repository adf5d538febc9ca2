//! Persistence traits and their Diesel implementation.

use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::access_override::{
    AccessOverride, AccessOverrideColumn, AccessOverrideSort, NewAccessOverride, OverrideReview,
};
use crate::domain::patient::{NewPatient, Patient, PatientColumn, PatientSort};
use crate::domain::types::{AccessOverrideId, HubId, PatientId};
use crate::filter::{Conjunction, SortKey, SortSpec};
use crate::pagination::PageRequest;
use crate::repository::errors::RepositoryResult;

/// Orders a boxed query by `$column` and then by `$id` in the same direction,
/// so rows sharing a sort value still come back in a stable order.
macro_rules! order_with_tiebreak {
    ($query:expr, $column:expr, $id:expr, $direction:expr) => {
        match $direction {
            $crate::filter::SortDirection::Asc => {
                $query.order_by($column.asc()).then_order_by($id.asc())
            }
            $crate::filter::SortDirection::Desc => {
                $query.order_by($column.desc()).then_order_by($id.desc())
            }
        }
    };
}

pub mod access_override;
pub mod errors;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod patient;

/// Everything a repository needs to run one list call: the predicate set,
/// the resolved ordering and the page window.
#[derive(Debug, Clone)]
pub struct ListQuery<C, S> {
    pub filter: Conjunction<C>,
    pub sort: SortSpec<S>,
    pub page: PageRequest,
}

impl<C, S: SortKey> ListQuery<C, S> {
    pub fn new(filter: Conjunction<C>) -> Self {
        Self {
            filter,
            sort: SortSpec::default(),
            page: PageRequest::default(),
        }
    }

    pub fn sort(mut self, sort: SortSpec<S>) -> Self {
        self.sort = sort;
        self
    }

    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}

pub type PatientListQuery = ListQuery<PatientColumn, PatientSort>;
pub type AccessOverrideListQuery = ListQuery<AccessOverrideColumn, AccessOverrideSort>;

pub trait PatientReader {
    fn get_patient_by_id(&self, id: PatientId, hub_id: HubId) -> RepositoryResult<Option<Patient>>;
    /// Returns the number of matching rows and the requested page of them.
    fn list_patients(&self, query: &PatientListQuery) -> RepositoryResult<(usize, Vec<Patient>)>;
}

pub trait PatientWriter {
    fn create_patient(&self, new_patient: &NewPatient) -> RepositoryResult<Patient>;
}

pub trait AccessOverrideReader {
    fn get_access_override_by_id(
        &self,
        id: AccessOverrideId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<AccessOverride>>;
    /// Returns the number of matching rows and the requested page of them.
    fn list_access_overrides(
        &self,
        query: &AccessOverrideListQuery,
    ) -> RepositoryResult<(usize, Vec<AccessOverride>)>;
}

pub trait AccessOverrideWriter {
    fn create_access_override(
        &self,
        new_override: &NewAccessOverride,
    ) -> RepositoryResult<AccessOverride>;
    /// Applies a review to a pending override. Fails with `NotFound` when the
    /// override does not exist in the hub or is no longer pending.
    fn review_access_override(
        &self,
        id: AccessOverrideId,
        hub_id: HubId,
        review: &OverrideReview,
    ) -> RepositoryResult<AccessOverride>;
}

/// Diesel-backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}
