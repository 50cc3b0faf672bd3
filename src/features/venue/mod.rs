mod controller;
pub mod model;

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::backend::BackendClient;
use crate::common::error::AppError;
use crate::features::event::model::VenueForm;

#[get("/venues")]
async fn list_venues(client: BackendClient) -> Result<HttpResponse, AppError> {
    let venues = controller::list(&client).await?;
    Ok(HttpResponse::Ok().json(venues))
}

#[post("/venues")]
async fn create_venue(
    client: BackendClient,
    payload: web::Json<VenueForm>,
) -> Result<HttpResponse, AppError> {
    let created = controller::create(&client, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

#[put("/venues/{id}")]
async fn update_venue(
    client: BackendClient,
    path: web::Path<Uuid>,
    payload: web::Json<VenueForm>,
) -> Result<HttpResponse, AppError> {
    controller::update(&client, path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[delete("/venues/{id}")]
async fn delete_venue(
    client: BackendClient,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    controller::delete(&client, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_venues)
        .service(create_venue)
        .service(update_venue)
        .service(delete_venue);
}
