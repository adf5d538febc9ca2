use serde::{Deserialize, Serialize};

use crate::domain::patient::Patient;
use crate::dto::format_timestamp;

/// Patient as returned by create, fetch and list endpoints.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientDto {
    pub id: i32,
    pub hub_id: i32,
    pub name: String,
    pub mrn: String,
    pub email: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Patient> for PatientDto {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id.get(),
            hub_id: patient.hub_id.get(),
            name: patient.name.into_inner(),
            mrn: patient.mrn.into_inner(),
            email: patient.email.map(|email| email.into_inner()),
            created_at: format_timestamp(patient.created_at),
            updated_at: format_timestamp(patient.updated_at),
        }
    }
}
