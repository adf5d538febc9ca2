use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{HubId, MedicalRecordNumber, PatientEmail, PatientId, PatientName};
use crate::filter::{FilterColumn, SortKey};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: PatientId,
    pub hub_id: HubId,
    pub name: PatientName,
    /// Medical record number, unique within the hub.
    pub mrn: MedicalRecordNumber,
    pub email: Option<PatientEmail>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewPatient {
    pub hub_id: HubId,
    pub name: PatientName,
    pub mrn: MedicalRecordNumber,
    pub email: Option<PatientEmail>,
    pub created_at: NaiveDateTime,
}

impl NewPatient {
    #[must_use]
    pub fn new(
        hub_id: HubId,
        name: PatientName,
        mrn: MedicalRecordNumber,
        email: Option<PatientEmail>,
    ) -> Self {
        Self {
            hub_id,
            name,
            mrn,
            email,
            created_at: Utc::now().naive_utc(),
        }
    }
}

/// Patient columns available to list filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatientColumn {
    HubId,
    Name,
    Mrn,
    Email,
    CreatedAt,
}

impl FilterColumn for PatientColumn {
    fn name(self) -> &'static str {
        match self {
            PatientColumn::HubId => "hub_id",
            PatientColumn::Name => "name",
            PatientColumn::Mrn => "mrn",
            PatientColumn::Email => "email",
            PatientColumn::CreatedAt => "created_at",
        }
    }
}

/// Sortable patient columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatientSort {
    CreatedAt,
    UpdatedAt,
    Name,
    Mrn,
}

impl SortKey for PatientSort {
    const DEFAULT: Self = PatientSort::CreatedAt;

    fn parse(value: &str) -> Option<Self> {
        match value {
            "created_at" | "createdAt" => Some(PatientSort::CreatedAt),
            "updated_at" | "updatedAt" => Some(PatientSort::UpdatedAt),
            "name" => Some(PatientSort::Name),
            "mrn" => Some(PatientSort::Mrn),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            PatientSort::CreatedAt => "created_at",
            PatientSort::UpdatedAt => "updated_at",
            PatientSort::Name => "name",
            PatientSort::Mrn => "mrn",
        }
    }
}
