//! Diesel implementation of the access override repository.

use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::access_override::{
    AccessOverride, AccessOverrideColumn, AccessOverrideSort, NewAccessOverride,
    OverrideReview, OverrideStatus,
};
use crate::domain::types::{AccessOverrideId, HubId};
use crate::filter::{FilterColumn, FilterValue, Predicate, SortSpec, like_pattern};
use crate::models::access_override::{
    AccessOverride as DbAccessOverride, NewAccessOverride as DbNewAccessOverride, ReviewChanges,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    AccessOverrideListQuery, AccessOverrideReader, AccessOverrideWriter, DieselRepository,
};
use crate::schema::access_overrides;

type BoxedOverrides<'a> = access_overrides::BoxedQuery<'a, Sqlite>;

fn apply_predicate<'a>(
    query: BoxedOverrides<'a>,
    predicate: &Predicate<AccessOverrideColumn>,
) -> RepositoryResult<BoxedOverrides<'a>> {
    use AccessOverrideColumn as Col;
    use FilterValue::{Int, Text, Timestamp};

    let query = match predicate {
        Predicate::Eq(Col::HubId, Int(hub_id)) => {
            query.filter(access_overrides::hub_id.eq(*hub_id))
        }
        Predicate::Eq(Col::UserId, Int(user_id)) => {
            query.filter(access_overrides::user_id.eq(*user_id))
        }
        Predicate::Eq(Col::PatientId, Int(patient_id)) => {
            query.filter(access_overrides::patient_id.eq(*patient_id))
        }
        Predicate::Eq(Col::ReviewedBy, Int(reviewer)) => {
            query.filter(access_overrides::reviewed_by.eq(*reviewer))
        }
        Predicate::Eq(Col::Status, Text(status)) => {
            query.filter(access_overrides::status.eq(status.clone()))
        }
        Predicate::Contains(Col::Reason, term) => {
            query.filter(access_overrides::reason.like(like_pattern(term)).escape('\\'))
        }
        Predicate::Gte(Col::ExpiresAt, Timestamp(at)) => {
            query.filter(access_overrides::expires_at.ge(*at))
        }
        Predicate::Lte(Col::ExpiresAt, Timestamp(at)) => {
            query.filter(access_overrides::expires_at.le(*at))
        }
        Predicate::Gte(Col::CreatedAt, Timestamp(at)) => {
            query.filter(access_overrides::created_at.ge(*at))
        }
        Predicate::Lte(Col::CreatedAt, Timestamp(at)) => {
            query.filter(access_overrides::created_at.le(*at))
        }
        other => {
            return Err(RepositoryError::ValidationError(format!(
                "unsupported filter on access_overrides.{}: {other:?}",
                other.column().name()
            )));
        }
    };

    Ok(query)
}

fn filtered<'a>(
    predicates: &[Predicate<AccessOverrideColumn>],
) -> RepositoryResult<BoxedOverrides<'a>> {
    predicates
        .iter()
        .try_fold(access_overrides::table.into_boxed(), apply_predicate)
}

fn ordered<'a>(
    query: BoxedOverrides<'a>,
    sort: &SortSpec<AccessOverrideSort>,
) -> BoxedOverrides<'a> {
    use access_overrides::{created_at, expires_at, id, status, updated_at};

    match sort.key {
        AccessOverrideSort::CreatedAt => order_with_tiebreak!(query, created_at, id, sort.direction),
        AccessOverrideSort::UpdatedAt => order_with_tiebreak!(query, updated_at, id, sort.direction),
        AccessOverrideSort::ExpiresAt => order_with_tiebreak!(query, expires_at, id, sort.direction),
        AccessOverrideSort::Status => order_with_tiebreak!(query, status, id, sort.direction),
    }
}

fn into_domain(row: DbAccessOverride) -> RepositoryResult<AccessOverride> {
    AccessOverride::try_from(row).map_err(RepositoryError::from)
}

impl AccessOverrideReader for DieselRepository {
    fn get_access_override_by_id(
        &self,
        id: AccessOverrideId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<AccessOverride>> {
        let mut conn = self.conn()?;

        access_overrides::table
            .filter(access_overrides::id.eq(id.get()))
            .filter(access_overrides::hub_id.eq(hub_id.get()))
            .first::<DbAccessOverride>(&mut conn)
            .optional()?
            .map(into_domain)
            .transpose()
    }

    fn list_access_overrides(
        &self,
        query: &AccessOverrideListQuery,
    ) -> RepositoryResult<(usize, Vec<AccessOverride>)> {
        let mut conn = self.conn()?;
        let predicates = query.filter.predicates();

        let total = filtered(predicates)?
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        if total == 0 || query.page.offset() >= total as i64 {
            return Ok((total, Vec::new()));
        }

        let items = ordered(filtered(predicates)?, &query.sort)
            .offset(query.page.offset())
            .limit(query.page.count())
            .load::<DbAccessOverride>(&mut conn)?
            .into_iter()
            .map(into_domain)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, items))
    }
}

impl AccessOverrideWriter for DieselRepository {
    fn create_access_override(
        &self,
        new_override: &NewAccessOverride,
    ) -> RepositoryResult<AccessOverride> {
        let mut conn = self.conn()?;

        let db_new_override: DbNewAccessOverride = new_override.into();

        let row = diesel::insert_into(access_overrides::table)
            .values(&db_new_override)
            .get_result::<DbAccessOverride>(&mut conn)?;

        into_domain(row)
    }

    fn review_access_override(
        &self,
        id: AccessOverrideId,
        hub_id: HubId,
        review: &OverrideReview,
    ) -> RepositoryResult<AccessOverride> {
        let mut conn = self.conn()?;

        let changes: ReviewChanges = review.into();

        let row = diesel::update(
            access_overrides::table
                .filter(access_overrides::id.eq(id.get()))
                .filter(access_overrides::hub_id.eq(hub_id.get()))
                .filter(access_overrides::status.eq(OverrideStatus::Pending.as_str())),
        )
        .set(&changes)
        .get_result::<DbAccessOverride>(&mut conn)?;

        into_domain(row)
    }
}
