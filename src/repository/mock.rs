//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::access_override::{AccessOverride, NewAccessOverride, OverrideReview};
use crate::domain::patient::{NewPatient, Patient};
use crate::domain::types::{AccessOverrideId, HubId, PatientId};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    AccessOverrideListQuery, AccessOverrideReader, AccessOverrideWriter, PatientListQuery,
    PatientReader, PatientWriter,
};

mock! {
    pub Repository {}

    impl PatientReader for Repository {
        fn get_patient_by_id(&self, id: PatientId, hub_id: HubId) -> RepositoryResult<Option<Patient>>;
        fn list_patients(&self, query: &PatientListQuery) -> RepositoryResult<(usize, Vec<Patient>)>;
    }

    impl PatientWriter for Repository {
        fn create_patient(&self, new_patient: &NewPatient) -> RepositoryResult<Patient>;
    }

    impl AccessOverrideReader for Repository {
        fn get_access_override_by_id(
            &self,
            id: AccessOverrideId,
            hub_id: HubId,
        ) -> RepositoryResult<Option<AccessOverride>>;
        fn list_access_overrides(
            &self,
            query: &AccessOverrideListQuery,
        ) -> RepositoryResult<(usize, Vec<AccessOverride>)>;
    }

    impl AccessOverrideWriter for Repository {
        fn create_access_override(
            &self,
            new_override: &NewAccessOverride,
        ) -> RepositoryResult<AccessOverride>;
        fn review_access_override(
            &self,
            id: AccessOverrideId,
            hub_id: HubId,
            review: &OverrideReview,
        ) -> RepositoryResult<AccessOverride>;
    }
}
