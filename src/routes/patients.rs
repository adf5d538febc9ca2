use actix_web::{HttpResponse, get, patch, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::patient::{NewPatientForm, PatientSearchForm};
use crate::repository::DieselRepository;
use crate::services::{ServiceError, patients as patients_service};

#[patch("/v1/patients")]
pub async fn search_patients(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<PatientSearchForm>,
) -> Result<HttpResponse, ServiceError> {
    let page =
        web::block(move || patients_service::list_patients(repo.get_ref(), &user, form)).await??;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/v1/patients")]
pub async fn create_patient(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<NewPatientForm>,
) -> Result<HttpResponse, ServiceError> {
    let patient =
        web::block(move || patients_service::create_patient(repo.get_ref(), &user, form))
            .await??;
    Ok(HttpResponse::Created().json(patient))
}

#[get("/v1/patients/{patient_id}")]
pub async fn show_patient(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    patient_id: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let patient_id = patient_id.into_inner();
    let patient =
        web::block(move || patients_service::get_patient(repo.get_ref(), &user, patient_id))
            .await??;
    Ok(HttpResponse::Ok().json(patient))
}
