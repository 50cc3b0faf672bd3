pub mod controller;
pub mod model;
pub mod normalize;
pub mod service;
pub mod validation;

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use model::{CreatedEvent, EventFilter, EventForm};

use crate::backend::BackendClient;
use crate::common::error::AppError;

#[get("/events")]
async fn list_events(
    client: BackendClient,
    filter: web::Query<EventFilter>,
) -> Result<HttpResponse, AppError> {
    let events = service::list_events(&client, filter.into_inner()).await?;
    Ok(HttpResponse::Ok().json(events))
}

#[post("/events")]
async fn create_event(
    client: BackendClient,
    payload: web::Json<EventForm>,
) -> Result<HttpResponse, AppError> {
    let created = controller::create_event(&client, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(CreatedEvent::from(created)))
}

#[get("/events/{id}")]
async fn get_event(
    client: BackendClient,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let event = controller::get_event(&client, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(event))
}

#[get("/events/{id}/edit")]
async fn get_event_for_edit(
    client: BackendClient,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let form = controller::get_event_for_edit(&client, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(form))
}

#[put("/events/{id}")]
async fn update_event(
    client: BackendClient,
    path: web::Path<Uuid>,
    payload: web::Json<EventForm>,
) -> Result<HttpResponse, AppError> {
    controller::update_event(&client, path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[delete("/events/{id}")]
async fn delete_event(
    client: BackendClient,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    controller::delete_event(&client, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_events)
        .service(create_event)
        .service(get_event_for_edit)
        .service(get_event)
        .service(update_event)
        .service(delete_event);
}
