use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::patient::{NewPatient as DomainNewPatient, Patient as DomainPatient};
use crate::domain::types::{
    HubId, MedicalRecordNumber, PatientEmail, PatientId, PatientName, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::patients)]
/// Diesel model for [`crate::domain::patient::Patient`].
pub struct Patient {
    pub id: i32,
    pub hub_id: i32,
    pub name: String,
    pub mrn: String,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::patients)]
/// Insertable form of [`Patient`].
pub struct NewPatient<'a> {
    pub hub_id: i32,
    pub name: &'a str,
    pub mrn: &'a str,
    pub email: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Patient> for DomainPatient {
    type Error = TypeConstraintError;

    fn try_from(patient: Patient) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PatientId::new(patient.id)?,
            hub_id: HubId::new(patient.hub_id)?,
            name: PatientName::new(patient.name)?,
            mrn: MedicalRecordNumber::new(patient.mrn)?,
            email: patient.email.map(PatientEmail::new).transpose()?,
            created_at: patient.created_at,
            updated_at: patient.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewPatient> for NewPatient<'a> {
    fn from(patient: &'a DomainNewPatient) -> Self {
        Self {
            hub_id: patient.hub_id.get(),
            name: patient.name.as_str(),
            mrn: patient.mrn.as_str(),
            email: patient.email.as_ref().map(|email| email.as_str()),
            created_at: patient.created_at,
            updated_at: patient.created_at,
        }
    }
}
