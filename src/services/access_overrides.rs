//! Emergency access override use cases.
//!
//! Rows outside the caller's scope are filtered out rather than reported:
//! every query is pinned to the caller's hub, and callers without the admin
//! role only ever see overrides they requested themselves.

use chrono::Utc;
use validator::Validate;

use crate::domain::access_override::{AccessOverride, AccessOverrideColumn, OverrideReview};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::{AccessOverrideId, PatientId};
use crate::dto::access_override::AccessOverrideDto;
use crate::filter::{Conjunction, FilterBuilder, Predicate};
use crate::forms::access_override::{
    AccessOverrideSearchForm, NewAccessOverrideForm, ReviewAccessOverrideForm,
};
use crate::pagination::Page;
use crate::repository::errors::RepositoryError;
use crate::repository::{
    AccessOverrideListQuery, AccessOverrideReader, AccessOverrideWriter, PatientReader,
};
use crate::services::{
    SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE, ServiceError, ServiceResult, caller_scope,
    ensure_role,
};

/// Predicates every override query of `user` must satisfy.
fn visibility_scope(
    user: &AuthenticatedUser,
) -> ServiceResult<Conjunction<AccessOverrideColumn>> {
    let (hub_id, user_id) = caller_scope(user)?;
    let is_admin = user.has_role(SERVICE_ADMIN_ROLE);

    let scope = FilterBuilder::new()
        .require(Predicate::Eq(AccessOverrideColumn::HubId, hub_id.into()))
        .when(
            !is_admin,
            Predicate::Eq(AccessOverrideColumn::UserId, user_id.into()),
        )
        .build()?;

    Ok(scope)
}

fn is_visible(user: &AuthenticatedUser, value: &AccessOverride) -> bool {
    user.has_role(SERVICE_ADMIN_ROLE)
        || user.user_id().is_ok_and(|user_id| user_id == value.user_id)
}

/// Searches overrides visible to the caller.
pub fn list_overrides<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AccessOverrideSearchForm,
) -> ServiceResult<Page<AccessOverrideDto>>
where
    R: AccessOverrideReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let scope = visibility_scope(user)?;

    form.validate()?;
    let page = form.page_request()?;
    let query = AccessOverrideListQuery::new(scope.and(form.filter()?))
        .sort(form.sort_spec())
        .paginate(page);

    let (total, overrides) = repo.list_access_overrides(&query)?;

    Ok(Page::new(total, &page, overrides).map(AccessOverrideDto::from))
}

pub fn get_override<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id: i32,
) -> ServiceResult<AccessOverrideDto>
where
    R: AccessOverrideReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let (hub_id, _) = caller_scope(user)?;
    let id = AccessOverrideId::new(id)?;

    match repo.get_access_override_by_id(id, hub_id)? {
        Some(value) if is_visible(user, &value) => Ok(AccessOverrideDto::from(value)),
        _ => Err(ServiceError::NotFound),
    }
}

/// Requests emergency access to a patient of the caller's hub.
pub fn create_override<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: NewAccessOverrideForm,
) -> ServiceResult<AccessOverrideDto>
where
    R: PatientReader + AccessOverrideWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    let (hub_id, user_id) = caller_scope(user)?;

    form.validate()?;
    let patient_id = PatientId::new(form.patient_id)?;
    if repo.get_patient_by_id(patient_id, hub_id)?.is_none() {
        return Err(ServiceError::NotFound);
    }

    let new_override = form.into_new_override(hub_id, user_id)?;
    let created = repo.create_access_override(&new_override)?;

    Ok(AccessOverrideDto::from(created))
}

/// Approves or revokes a pending override. Admin only.
pub fn review_override<R>(
    repo: &R,
    user: &AuthenticatedUser,
    id: i32,
    form: ReviewAccessOverrideForm,
) -> ServiceResult<AccessOverrideDto>
where
    R: AccessOverrideReader + AccessOverrideWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;
    let (hub_id, reviewer) = caller_scope(user)?;

    form.validate()?;
    let id = AccessOverrideId::new(id)?;
    let notes = form.notes()?;

    let existing = repo
        .get_access_override_by_id(id, hub_id)?
        .ok_or(ServiceError::NotFound)?;
    if !existing.is_pending() {
        return Err(ServiceError::Conflict(format!(
            "override {id} is already {}",
            existing.status
        )));
    }

    let review = OverrideReview {
        status: form.decision.into(),
        reviewed_by: reviewer,
        reviewed_at: Utc::now().naive_utc(),
        notes,
    };
    // The row exists, so an empty conditional update means another review won.
    let reviewed = repo
        .review_access_override(id, hub_id, &review)
        .map_err(|err| match err {
            RepositoryError::NotFound => {
                ServiceError::Conflict(format!("override {id} is no longer pending"))
            }
            other => ServiceError::from(other),
        })?;

    log::info!("Override {id} marked {} by user {reviewer}", reviewed.status);

    Ok(AccessOverrideDto::from(reviewed))
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::domain::access_override::OverrideStatus;
    use crate::domain::patient::Patient;
    use crate::domain::types::{
        HubId, MedicalRecordNumber, OverrideReason, PatientName, UserId,
    };
    use crate::filter::FilterValue;
    use crate::forms::access_override::ReviewDecision;
    use crate::repository::mock::MockRepository;
    use crate::services::test_users::{admin, clinician, outsider};

    fn stored_override(id: i32, owner: i32, status: OverrideStatus) -> AccessOverride {
        let at = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        AccessOverride {
            id: AccessOverrideId::new(id).unwrap(),
            hub_id: HubId::new(42).unwrap(),
            user_id: UserId::new(owner).unwrap(),
            patient_id: PatientId::new(3).unwrap(),
            reason: OverrideReason::new("Trauma bay admission").unwrap(),
            status,
            expires_at: at + Duration::hours(4),
            reviewed_by: None,
            reviewed_at: None,
            notes: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn stored_patient() -> Patient {
        let at = Utc::now().naive_utc();
        Patient {
            id: PatientId::new(3).unwrap(),
            hub_id: HubId::new(42).unwrap(),
            name: PatientName::new("Ann").unwrap(),
            mrn: MedicalRecordNumber::new("MRN-3").unwrap(),
            email: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn new_override_form(patient_id: i32) -> NewAccessOverrideForm {
        NewAccessOverrideForm {
            patient_id,
            reason: "Trauma bay admission".to_string(),
            expires_at: Utc::now() + Duration::hours(4),
            notes: None,
        }
    }

    #[test]
    fn list_requires_access_role() {
        let mut repo = MockRepository::new();
        repo.expect_list_access_overrides().times(0);

        assert_eq!(
            list_overrides(&repo, &outsider(), AccessOverrideSearchForm::default()),
            Err(ServiceError::Unauthorized)
        );
    }

    #[test]
    fn clinician_list_is_restricted_to_own_overrides() {
        let mut repo = MockRepository::new();
        repo.expect_list_access_overrides()
            .withf(|query| {
                query.filter.predicates()
                    == [
                        Predicate::Eq(AccessOverrideColumn::HubId, FilterValue::Int(42)),
                        Predicate::Eq(AccessOverrideColumn::UserId, FilterValue::Int(7)),
                        Predicate::Eq(AccessOverrideColumn::PatientId, FilterValue::Int(3)),
                    ]
            })
            .times(1)
            .returning(|_| Ok((0, Vec::new())));
        let form = AccessOverrideSearchForm {
            patient_id: Some(3),
            ..AccessOverrideSearchForm::default()
        };

        let page = list_overrides(&repo, &clinician(), form).unwrap();

        assert_eq!(page.pagination.records, 0);
        assert_eq!(page.pagination.pages, 0);
        assert!(page.data.is_empty());
    }

    #[test]
    fn admin_list_sees_whole_hub() {
        let mut repo = MockRepository::new();
        repo.expect_list_access_overrides()
            .withf(|query| {
                query.filter.predicates()
                    == [Predicate::Eq(
                        AccessOverrideColumn::HubId,
                        FilterValue::Int(42),
                    )]
            })
            .times(1)
            .returning(|_| Ok((1, vec![stored_override(1, 7, OverrideStatus::Pending)])));

        let page = list_overrides(&repo, &admin(), AccessOverrideSearchForm::default()).unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].user_id, 7);
    }

    #[test]
    fn caller_filter_cannot_widen_scope() {
        let mut repo = MockRepository::new();
        repo.expect_list_access_overrides()
            .withf(|query| {
                let predicates = query.filter.predicates();
                predicates.contains(&Predicate::Eq(
                    AccessOverrideColumn::UserId,
                    FilterValue::Int(7),
                )) && predicates.contains(&Predicate::Eq(
                    AccessOverrideColumn::UserId,
                    FilterValue::Int(8),
                ))
            })
            .times(1)
            .returning(|_| Ok((0, Vec::new())));
        let form = AccessOverrideSearchForm {
            user_id: Some(8),
            ..AccessOverrideSearchForm::default()
        };

        let page = list_overrides(&repo, &clinician(), form).unwrap();

        assert!(page.data.is_empty());
    }

    #[test]
    fn foreign_override_fetch_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_access_override_by_id()
            .returning(|_, _| Ok(Some(stored_override(5, 8, OverrideStatus::Pending))));

        assert_eq!(
            get_override(&repo, &clinician(), 5),
            Err(ServiceError::NotFound)
        );
    }

    #[test]
    fn own_override_fetch_succeeds() {
        let mut repo = MockRepository::new();
        repo.expect_get_access_override_by_id()
            .withf(|id, hub_id| id.get() == 5 && hub_id.get() == 42)
            .returning(|_, _| Ok(Some(stored_override(5, 7, OverrideStatus::Pending))));

        let dto = get_override(&repo, &clinician(), 5).unwrap();

        assert_eq!(dto.id, 5);
    }

    #[test]
    fn create_requires_patient_in_hub() {
        let mut repo = MockRepository::new();
        repo.expect_get_patient_by_id().returning(|_, _| Ok(None));
        repo.expect_create_access_override().times(0);

        assert_eq!(
            create_override(&repo, &clinician(), new_override_form(3)),
            Err(ServiceError::NotFound)
        );
    }

    #[test]
    fn create_records_requesting_user() {
        let mut repo = MockRepository::new();
        repo.expect_get_patient_by_id()
            .returning(|_, _| Ok(Some(stored_patient())));
        repo.expect_create_access_override()
            .withf(|new_override| {
                new_override.user_id.get() == 7
                    && new_override.hub_id.get() == 42
                    && new_override.patient_id.get() == 3
            })
            .times(1)
            .returning(|_| Ok(stored_override(9, 7, OverrideStatus::Pending)));

        let dto = create_override(&repo, &clinician(), new_override_form(3)).unwrap();

        assert_eq!(dto.status, OverrideStatus::Pending);
        assert_eq!(dto.reviewed_by, None);
    }

    #[test]
    fn review_requires_admin() {
        let mut repo = MockRepository::new();
        repo.expect_get_access_override_by_id().times(0);
        repo.expect_review_access_override().times(0);
        let form = ReviewAccessOverrideForm {
            decision: ReviewDecision::Approve,
            notes: None,
        };

        assert_eq!(
            review_override(&repo, &clinician(), 1, form),
            Err(ServiceError::Unauthorized)
        );
    }

    #[test]
    fn reviewed_override_cannot_be_reviewed_again() {
        let mut repo = MockRepository::new();
        repo.expect_get_access_override_by_id()
            .returning(|_, _| Ok(Some(stored_override(1, 7, OverrideStatus::Revoked))));
        repo.expect_review_access_override().times(0);
        let form = ReviewAccessOverrideForm {
            decision: ReviewDecision::Approve,
            notes: None,
        };

        assert!(matches!(
            review_override(&repo, &admin(), 1, form),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn review_lost_to_concurrent_reviewer_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_access_override_by_id()
            .returning(|_, _| Ok(Some(stored_override(1, 7, OverrideStatus::Pending))));
        repo.expect_review_access_override()
            .times(1)
            .returning(|_, _, _| Err(RepositoryError::NotFound));
        let form = ReviewAccessOverrideForm {
            decision: ReviewDecision::Revoke,
            notes: None,
        };

        assert!(matches!(
            review_override(&repo, &admin(), 1, form),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn review_applies_decision() {
        let mut repo = MockRepository::new();
        repo.expect_get_access_override_by_id()
            .returning(|_, _| Ok(Some(stored_override(1, 7, OverrideStatus::Pending))));
        repo.expect_review_access_override()
            .withf(|id, hub_id, review| {
                id.get() == 1
                    && hub_id.get() == 42
                    && review.status == OverrideStatus::Approved
                    && review.reviewed_by.get() == 1
                    && review.notes.as_ref().map(|n| n.as_str()) == Some("ok")
            })
            .times(1)
            .returning(|_, _, review| {
                let mut value = stored_override(1, 7, review.status);
                value.reviewed_by = Some(review.reviewed_by);
                value.reviewed_at = Some(review.reviewed_at);
                value.notes = review.notes.clone();
                Ok(value)
            });
        let form = ReviewAccessOverrideForm {
            decision: ReviewDecision::Approve,
            notes: Some("ok".to_string()),
        };

        let dto = review_override(&repo, &admin(), 1, form).unwrap();

        assert_eq!(dto.status, OverrideStatus::Approved);
        assert_eq!(dto.reviewed_by, Some(1));
        assert_eq!(dto.notes.as_deref(), Some("ok"));
    }
}
