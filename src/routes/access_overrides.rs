use actix_web::{HttpResponse, get, patch, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::access_override::{
    AccessOverrideSearchForm, NewAccessOverrideForm, ReviewAccessOverrideForm,
};
use crate::repository::DieselRepository;
use crate::services::{ServiceError, access_overrides as overrides_service};

#[patch("/v1/overrides")]
pub async fn search_overrides(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<AccessOverrideSearchForm>,
) -> Result<HttpResponse, ServiceError> {
    let page =
        web::block(move || overrides_service::list_overrides(repo.get_ref(), &user, form))
            .await??;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/v1/overrides")]
pub async fn create_override(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<NewAccessOverrideForm>,
) -> Result<HttpResponse, ServiceError> {
    let created =
        web::block(move || overrides_service::create_override(repo.get_ref(), &user, form))
            .await??;
    Ok(HttpResponse::Created().json(created))
}

#[get("/v1/overrides/{override_id}")]
pub async fn show_override(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    override_id: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let override_id = override_id.into_inner();
    let value =
        web::block(move || overrides_service::get_override(repo.get_ref(), &user, override_id))
            .await??;
    Ok(HttpResponse::Ok().json(value))
}

#[post("/v1/overrides/{override_id}/review")]
pub async fn review_override(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    override_id: web::Path<i32>,
    web::Json(form): web::Json<ReviewAccessOverrideForm>,
) -> Result<HttpResponse, ServiceError> {
    let override_id = override_id.into_inner();
    let reviewed = web::block(move || {
        overrides_service::review_override(repo.get_ref(), &user, override_id, form)
    })
    .await??;
    Ok(HttpResponse::Ok().json(reviewed))
}
