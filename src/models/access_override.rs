use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::access_override::{
    AccessOverride as DomainAccessOverride, NewAccessOverride as DomainNewAccessOverride,
    OverrideReview,
};
use crate::domain::types::{
    AccessOverrideId, HubId, OverrideNotes, OverrideReason, PatientId, TypeConstraintError,
    UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::access_overrides)]
/// Diesel model for [`crate::domain::access_override::AccessOverride`].
pub struct AccessOverride {
    pub id: i32,
    pub hub_id: i32,
    pub user_id: i32,
    pub patient_id: i32,
    pub reason: String,
    pub status: String,
    pub expires_at: NaiveDateTime,
    pub reviewed_by: Option<i32>,
    pub reviewed_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::access_overrides)]
/// Insertable form of [`AccessOverride`].
pub struct NewAccessOverride<'a> {
    pub hub_id: i32,
    pub user_id: i32,
    pub patient_id: i32,
    pub reason: &'a str,
    pub status: &'a str,
    pub expires_at: NaiveDateTime,
    pub notes: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::access_overrides)]
/// Columns written when a reviewer decides on an override. `None` leaves the
/// column untouched.
pub struct ReviewChanges<'a> {
    pub status: &'a str,
    pub reviewed_by: Option<i32>,
    pub reviewed_at: Option<NaiveDateTime>,
    pub notes: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<AccessOverride> for DomainAccessOverride {
    type Error = TypeConstraintError;

    fn try_from(row: AccessOverride) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AccessOverrideId::new(row.id)?,
            hub_id: HubId::new(row.hub_id)?,
            user_id: UserId::new(row.user_id)?,
            patient_id: PatientId::new(row.patient_id)?,
            reason: OverrideReason::new(row.reason)?,
            status: row.status.parse()?,
            expires_at: row.expires_at,
            reviewed_by: row.reviewed_by.map(UserId::new).transpose()?,
            reviewed_at: row.reviewed_at,
            notes: row.notes.map(OverrideNotes::new).transpose()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewAccessOverride> for NewAccessOverride<'a> {
    fn from(value: &'a DomainNewAccessOverride) -> Self {
        Self {
            hub_id: value.hub_id.get(),
            user_id: value.user_id.get(),
            patient_id: value.patient_id.get(),
            reason: value.reason.as_str(),
            status: "pending",
            expires_at: value.expires_at,
            notes: value.notes.as_ref().map(|notes| notes.as_str()),
            created_at: value.created_at,
            updated_at: value.created_at,
        }
    }
}

impl<'a> From<&'a OverrideReview> for ReviewChanges<'a> {
    fn from(review: &'a OverrideReview) -> Self {
        Self {
            status: review.status.as_str(),
            reviewed_by: Some(review.reviewed_by.get()),
            reviewed_at: Some(review.reviewed_at),
            notes: review.notes.as_ref().map(|notes| notes.as_str()),
            updated_at: review.reviewed_at,
        }
    }
}
