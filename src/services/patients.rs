use validator::Validate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::patient::PatientColumn;
use crate::domain::types::PatientId;
use crate::dto::patient::PatientDto;
use crate::filter::{FilterBuilder, Predicate};
use crate::forms::patient::{NewPatientForm, PatientSearchForm};
use crate::pagination::Page;
use crate::repository::{PatientListQuery, PatientReader, PatientWriter};
use crate::services::{
    SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE, ServiceError, ServiceResult, caller_scope,
    ensure_role,
};

/// Searches patients of the caller's hub.
pub fn list_patients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: PatientSearchForm,
) -> ServiceResult<Page<PatientDto>>
where
    R: PatientReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let (hub_id, _) = caller_scope(user)?;

    form.validate()?;
    let page = form.page_request()?;
    let scope = FilterBuilder::new()
        .require(Predicate::Eq(PatientColumn::HubId, hub_id.into()))
        .build()?;
    let query = PatientListQuery::new(scope.and(form.filter()?))
        .sort(form.sort_spec())
        .paginate(page);

    let (total, patients) = repo.list_patients(&query)?;

    Ok(Page::new(total, &page, patients).map(PatientDto::from))
}

pub fn get_patient<R>(repo: &R, user: &AuthenticatedUser, id: i32) -> ServiceResult<PatientDto>
where
    R: PatientReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let (hub_id, _) = caller_scope(user)?;
    let id = PatientId::new(id)?;

    repo.get_patient_by_id(id, hub_id)?
        .map(PatientDto::from)
        .ok_or(ServiceError::NotFound)
}

/// Registers a patient in the caller's hub. Admin only.
pub fn create_patient<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: NewPatientForm,
) -> ServiceResult<PatientDto>
where
    R: PatientWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;
    let (hub_id, _) = caller_scope(user)?;

    form.validate()?;
    let new_patient = form.into_new_patient(hub_id)?;
    let patient = repo.create_patient(&new_patient)?;

    Ok(PatientDto::from(patient))
}
