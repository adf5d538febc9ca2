use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::domain::access_override::{
    AccessOverrideColumn, AccessOverrideSort, NewAccessOverride, OverrideStatus,
};
use crate::domain::types::{
    HubId, OverrideNotes, OverrideReason, PatientId, TypeConstraintError, UserId,
};
use crate::filter::{Conjunction, FilterBuilder, FilterError, SortDirection, SortSpec};
use crate::pagination::{PageRequest, PaginationError};

/// Body of `PATCH /api/v1/overrides`.
///
/// Every filter field treats `null` exactly like an absent field.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AccessOverrideSearchForm {
    pub page: Option<i64>,
    #[serde(alias = "pageSize", alias = "per_page")]
    pub limit: Option<i64>,
    #[serde(alias = "orderBy")]
    pub sort: Option<String>,
    #[serde(alias = "direction")]
    pub order: Option<SortDirection>,
    #[validate(range(min = 1))]
    pub user_id: Option<i32>,
    #[validate(range(min = 1))]
    pub patient_id: Option<i32>,
    #[validate(range(min = 1))]
    pub reviewed_by: Option<i32>,
    pub status: Option<OverrideStatus>,
    /// Substring of the stated reason.
    #[validate(length(max = 255))]
    pub reason: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub expires_from: Option<DateTime<Utc>>,
    pub expires_to: Option<DateTime<Utc>>,
}

impl AccessOverrideSearchForm {
    pub fn page_request(&self) -> Result<PageRequest, PaginationError> {
        PageRequest::try_new(self.page, self.limit)
    }

    pub fn sort_spec(&self) -> SortSpec<AccessOverrideSort> {
        SortSpec::resolve(self.sort.as_deref(), self.order)
    }

    /// Predicates for the fields present in the request.
    pub fn filter(&self) -> Result<Conjunction<AccessOverrideColumn>, FilterError> {
        use AccessOverrideColumn as Col;

        FilterBuilder::new()
            .eq(Col::UserId, self.user_id)
            .eq(Col::PatientId, self.patient_id)
            .eq(Col::ReviewedBy, self.reviewed_by)
            .eq(Col::Status, self.status)
            .contains(Col::Reason, self.reason.as_deref())
            .range(
                Col::CreatedAt,
                self.created_from.map(|at| at.naive_utc()),
                self.created_to.map(|at| at.naive_utc()),
            )
            .range(
                Col::ExpiresAt,
                self.expires_from.map(|at| at.naive_utc()),
                self.expires_to.map(|at| at.naive_utc()),
            )
            .build()
    }
}

/// Body of `POST /api/v1/overrides`.
#[derive(Debug, Deserialize, Validate)]
pub struct NewAccessOverrideForm {
    #[validate(range(min = 1))]
    pub patient_id: i32,
    #[validate(length(min = 1, max = 1000))]
    pub reason: String,
    pub expires_at: DateTime<Utc>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl NewAccessOverrideForm {
    pub fn into_new_override(
        self,
        hub_id: HubId,
        user_id: UserId,
    ) -> Result<NewAccessOverride, TypeConstraintError> {
        Ok(NewAccessOverride::new(
            hub_id,
            user_id,
            PatientId::new(self.patient_id)?,
            OverrideReason::new(self.reason)?,
            self.expires_at.naive_utc(),
            optional_notes(self.notes)?,
        ))
    }
}

/// Reviewer decision on a pending override.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Revoke,
}

impl From<ReviewDecision> for OverrideStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approve => OverrideStatus::Approved,
            ReviewDecision::Revoke => OverrideStatus::Revoked,
        }
    }
}

/// Body of `POST /api/v1/overrides/{id}/review`.
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewAccessOverrideForm {
    pub decision: ReviewDecision,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl ReviewAccessOverrideForm {
    pub fn notes(&self) -> Result<Option<OverrideNotes>, TypeConstraintError> {
        optional_notes(self.notes.clone())
    }
}

/// Blank notes are stored as absent.
fn optional_notes(notes: Option<String>) -> Result<Option<OverrideNotes>, TypeConstraintError> {
    notes
        .filter(|notes| !notes.trim().is_empty())
        .map(OverrideNotes::new)
        .transpose()
}
