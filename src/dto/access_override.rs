use serde::{Deserialize, Serialize};

use crate::domain::access_override::{AccessOverride, OverrideStatus};
use crate::dto::format_timestamp;

/// Access override as returned by create, fetch, review and list endpoints.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessOverrideDto {
    pub id: i32,
    pub hub_id: i32,
    pub user_id: i32,
    pub patient_id: i32,
    pub reason: String,
    pub status: OverrideStatus,
    pub expires_at: String,
    pub reviewed_by: Option<i32>,
    pub reviewed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<AccessOverride> for AccessOverrideDto {
    fn from(value: AccessOverride) -> Self {
        Self {
            id: value.id.get(),
            hub_id: value.hub_id.get(),
            user_id: value.user_id.get(),
            patient_id: value.patient_id.get(),
            reason: value.reason.into_inner(),
            status: value.status,
            expires_at: format_timestamp(value.expires_at),
            reviewed_by: value.reviewed_by.map(|user| user.get()),
            reviewed_at: value.reviewed_at.map(format_timestamp),
            notes: value.notes.map(|notes| notes.into_inner()),
            created_at: format_timestamp(value.created_at),
            updated_at: format_timestamp(value.updated_at),
        }
    }
}
