use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    AccessOverrideId, HubId, OverrideNotes, OverrideReason, PatientId, TypeConstraintError,
    UserId,
};
use crate::filter::{FilterColumn, FilterValue, SortKey};

/// Lifecycle of an emergency access override.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OverrideStatus {
    Pending,
    Approved,
    Revoked,
}

impl OverrideStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            OverrideStatus::Pending => "pending",
            OverrideStatus::Approved => "approved",
            OverrideStatus::Revoked => "revoked",
        }
    }
}

impl Display for OverrideStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverrideStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OverrideStatus::Pending),
            "approved" => Ok(OverrideStatus::Approved),
            "revoked" => Ok(OverrideStatus::Revoked),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown override status `{other}`"
            ))),
        }
    }
}

impl From<OverrideStatus> for FilterValue {
    fn from(value: OverrideStatus) -> Self {
        FilterValue::Text(value.as_str().to_string())
    }
}

/// Emergency ("break-glass") access granted to a user for one patient record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AccessOverride {
    pub id: AccessOverrideId,
    pub hub_id: HubId,
    /// User who requested the override.
    pub user_id: UserId,
    pub patient_id: PatientId,
    pub reason: OverrideReason,
    pub status: OverrideStatus,
    pub expires_at: NaiveDateTime,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<NaiveDateTime>,
    pub notes: Option<OverrideNotes>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl AccessOverride {
    pub fn is_pending(&self) -> bool {
        self.status == OverrideStatus::Pending
    }
}

#[derive(Clone, Debug)]
pub struct NewAccessOverride {
    pub hub_id: HubId,
    pub user_id: UserId,
    pub patient_id: PatientId,
    pub reason: OverrideReason,
    pub expires_at: NaiveDateTime,
    pub notes: Option<OverrideNotes>,
    pub created_at: NaiveDateTime,
}

impl NewAccessOverride {
    #[must_use]
    pub fn new(
        hub_id: HubId,
        user_id: UserId,
        patient_id: PatientId,
        reason: OverrideReason,
        expires_at: NaiveDateTime,
        notes: Option<OverrideNotes>,
    ) -> Self {
        Self {
            hub_id,
            user_id,
            patient_id,
            reason,
            expires_at,
            notes,
            created_at: Utc::now().naive_utc(),
        }
    }
}

/// Reviewer decision applied to a pending override.
#[derive(Clone, Debug)]
pub struct OverrideReview {
    pub status: OverrideStatus,
    pub reviewed_by: UserId,
    pub reviewed_at: NaiveDateTime,
    pub notes: Option<OverrideNotes>,
}

/// Access override columns available to list filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessOverrideColumn {
    HubId,
    UserId,
    PatientId,
    Status,
    Reason,
    ReviewedBy,
    ExpiresAt,
    CreatedAt,
}

impl FilterColumn for AccessOverrideColumn {
    fn name(self) -> &'static str {
        match self {
            AccessOverrideColumn::HubId => "hub_id",
            AccessOverrideColumn::UserId => "user_id",
            AccessOverrideColumn::PatientId => "patient_id",
            AccessOverrideColumn::Status => "status",
            AccessOverrideColumn::Reason => "reason",
            AccessOverrideColumn::ReviewedBy => "reviewed_by",
            AccessOverrideColumn::ExpiresAt => "expires_at",
            AccessOverrideColumn::CreatedAt => "created_at",
        }
    }
}

/// Sortable access override columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessOverrideSort {
    CreatedAt,
    UpdatedAt,
    ExpiresAt,
    Status,
}

impl SortKey for AccessOverrideSort {
    const DEFAULT: Self = AccessOverrideSort::CreatedAt;

    fn parse(value: &str) -> Option<Self> {
        match value {
            "created_at" | "createdAt" => Some(AccessOverrideSort::CreatedAt),
            "updated_at" | "updatedAt" => Some(AccessOverrideSort::UpdatedAt),
            "expires_at" | "expiresAt" => Some(AccessOverrideSort::ExpiresAt),
            "status" => Some(AccessOverrideSort::Status),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            AccessOverrideSort::CreatedAt => "created_at",
            AccessOverrideSort::UpdatedAt => "updated_at",
            AccessOverrideSort::ExpiresAt => "expires_at",
            AccessOverrideSort::Status => "status",
        }
    }
}
