use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::domain::patient::{NewPatient, PatientColumn, PatientSort};
use crate::domain::types::{
    HubId, MedicalRecordNumber, PatientEmail, PatientName, TypeConstraintError,
};
use crate::filter::{Conjunction, FilterBuilder, FilterError, SortDirection, SortSpec};
use crate::pagination::{PageRequest, PaginationError};

/// Body of `PATCH /api/v1/patients`.
///
/// Every filter field treats `null` exactly like an absent field.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PatientSearchForm {
    pub page: Option<i64>,
    #[serde(alias = "pageSize", alias = "per_page")]
    pub limit: Option<i64>,
    #[serde(alias = "orderBy")]
    pub sort: Option<String>,
    #[serde(alias = "direction")]
    pub order: Option<SortDirection>,
    /// Substring of the patient name.
    #[validate(length(max = 255))]
    pub name: Option<String>,
    /// Exact medical record number.
    #[validate(length(max = 64))]
    pub mrn: Option<String>,
    /// Substring of the contact email.
    #[validate(length(max = 255))]
    pub email: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

impl PatientSearchForm {
    pub fn page_request(&self) -> Result<PageRequest, PaginationError> {
        PageRequest::try_new(self.page, self.limit)
    }

    pub fn sort_spec(&self) -> SortSpec<PatientSort> {
        SortSpec::resolve(self.sort.as_deref(), self.order)
    }

    /// Predicates for the fields present in the request.
    pub fn filter(&self) -> Result<Conjunction<PatientColumn>, FilterError> {
        let mrn = self
            .mrn
            .as_deref()
            .map(str::trim)
            .filter(|mrn| !mrn.is_empty());

        FilterBuilder::new()
            .contains(PatientColumn::Name, self.name.as_deref())
            .eq(PatientColumn::Mrn, mrn)
            .contains(PatientColumn::Email, self.email.as_deref())
            .range(
                PatientColumn::CreatedAt,
                self.created_from.map(|at| at.naive_utc()),
                self.created_to.map(|at| at.naive_utc()),
            )
            .build()
    }
}

/// Body of `POST /api/v1/patients`.
#[derive(Debug, Deserialize, Validate)]
pub struct NewPatientForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub mrn: String,
    #[validate(email)]
    pub email: Option<String>,
}

impl NewPatientForm {
    pub fn into_new_patient(self, hub_id: HubId) -> Result<NewPatient, TypeConstraintError> {
        let email = self
            .email
            .filter(|email| !email.trim().is_empty())
            .map(PatientEmail::new)
            .transpose()?;

        Ok(NewPatient::new(
            hub_id,
            PatientName::new(self.name)?,
            MedicalRecordNumber::new(self.mrn)?,
            email,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterValue, Predicate};

    #[test]
    fn empty_body_is_match_all_with_defaults() {
        let form: PatientSearchForm = serde_json::from_str("{}").unwrap();
        assert!(form.filter().unwrap().is_empty());
        assert_eq!(form.page_request().unwrap(), PageRequest::default());
        assert_eq!(form.sort_spec(), SortSpec::default());
    }

    #[test]
    fn null_fields_behave_like_absent_fields() {
        let form: PatientSearchForm = serde_json::from_str(
            r#"{
                "page": null,
                "limit": null,
                "sort": null,
                "order": null,
                "name": null,
                "mrn": null,
                "email": null,
                "created_from": null,
                "created_to": null
            }"#,
        )
        .unwrap();

        assert!(form.filter().unwrap().is_empty());
        assert_eq!(form.page_request().unwrap(), PageRequest::default());
        assert_eq!(form.sort_spec(), SortSpec::default());
    }

    #[test]
    fn aliases_are_accepted() {
        let form: PatientSearchForm = serde_json::from_str(
            r#"{"pageSize": 5, "orderBy": "name", "direction": "asc"}"#,
        )
        .unwrap();

        assert_eq!(form.page_request().unwrap().limit(), 5);
        let sort = form.sort_spec();
        assert_eq!(sort.key, PatientSort::Name);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn present_fields_become_predicates() {
        let form: PatientSearchForm = serde_json::from_str(
            r#"{"name": "smi", "mrn": " MRN-7 ", "created_from": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let filter = form.filter().unwrap();
        let predicates = filter.predicates();
        assert_eq!(predicates.len(), 3);
        assert_eq!(
            predicates[0],
            Predicate::Contains(PatientColumn::Name, "smi".to_string())
        );
        assert_eq!(
            predicates[1],
            Predicate::Eq(PatientColumn::Mrn, FilterValue::Text("MRN-7".to_string()))
        );
        assert!(matches!(
            predicates[2],
            Predicate::Gte(PatientColumn::CreatedAt, FilterValue::Timestamp(_))
        ));
    }

    #[test]
    fn inverted_created_range_is_rejected() {
        let form: PatientSearchForm = serde_json::from_str(
            r#"{"created_from": "2024-02-01T00:00:00Z", "created_to": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(
            form.filter(),
            Err(FilterError::InvertedRange("created_at"))
        );
    }

    #[test]
    fn overlong_name_fails_validation() {
        let form = PatientSearchForm {
            name: Some("x".repeat(256)),
            ..PatientSearchForm::default()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn new_patient_form_normalizes_values() {
        let form = NewPatientForm {
            name: " Jane ".to_string(),
            mrn: "MRN-1".to_string(),
            email: Some("".to_string()),
        };

        let new_patient = form.into_new_patient(HubId::new(3).unwrap()).unwrap();
        assert_eq!(new_patient.name.as_str(), "Jane");
        assert_eq!(new_patient.email, None);
        assert_eq!(new_patient.hub_id.get(), 3);
    }
}
