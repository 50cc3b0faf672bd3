mod controller;
pub mod model;

use actix_web::web::Data;
use actix_web::{post, web, HttpRequest, HttpResponse};
use serde_json::json;

use model::{CredentialsForm, RecoverForm, ResetPasswordForm, UpdatePasswordForm};

use crate::app::{bearer_token, AppState};
use crate::backend::BackendClient;
use crate::common::error::AppError;

#[post("/auth/sign-up")]
async fn sign_up(
    state: Data<AppState>,
    payload: web::Json<CredentialsForm>,
) -> Result<HttpResponse, AppError> {
    let user = controller::sign_up(state.auth.as_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

#[post("/auth/sign-in")]
async fn sign_in(
    state: Data<AppState>,
    payload: web::Json<CredentialsForm>,
) -> Result<HttpResponse, AppError> {
    let session = controller::sign_in(state.auth.as_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[post("/auth/sign-out")]
async fn sign_out(state: Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    controller::sign_out(state.auth.as_ref(), bearer_token(&req)).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[post("/auth/reset-password")]
async fn reset_password(
    state: Data<AppState>,
    payload: web::Json<ResetPasswordForm>,
) -> Result<HttpResponse, AppError> {
    controller::request_password_reset(state.auth.as_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Accepted().json(json!({ "success": true })))
}

#[post("/auth/recover")]
async fn recover(
    state: Data<AppState>,
    payload: web::Json<RecoverForm>,
) -> Result<HttpResponse, AppError> {
    let session = controller::recover(state.auth.as_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[post("/auth/update-password")]
async fn update_password(
    state: Data<AppState>,
    client: BackendClient,
    payload: web::Json<UpdatePasswordForm>,
) -> Result<HttpResponse, AppError> {
    controller::update_password(state.auth.as_ref(), &client, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(sign_up)
        .service(sign_in)
        .service(sign_out)
        .service(reset_password)
        .service(recover)
        .service(update_password);
}
