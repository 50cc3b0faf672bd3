use uuid::Uuid;

use super::model::{CreatedVenue, TemplateVenue};
use crate::backend::{BackendClient, NewVenueRow, VenueFields};
use crate::common::error::AppError;
use crate::features::event::model::{ValidVenue, VenueForm};
use crate::features::event::validation::validate_venue;

pub async fn list(client: &BackendClient) -> Result<Vec<TemplateVenue>, AppError> {
    let rows = client
        .store()
        .list_template_venues()
        .await
        .map_err(|error| AppError::from_backend("Failed to load venues", error))?;

    Ok(rows.into_iter().map(TemplateVenue::from).collect())
}

pub async fn create(client: &BackendClient, form: VenueForm) -> Result<CreatedVenue, AppError> {
    client.authenticated_user()?;
    let venue = validate_venue(form)?;

    let ids = client
        .store()
        .insert_venues(vec![NewVenueRow {
            event_id: None,
            name: venue.name,
            address: venue.address,
            city: venue.city,
            state: venue.state,
            capacity: i64::from(venue.capacity),
        }])
        .await
        .map_err(|error| AppError::from_backend("Failed to create venue", error))?;

    let id = ids
        .into_iter()
        .next()
        .ok_or_else(|| AppError::persistence("Failed to create venue: no id returned"))?;
    Ok(CreatedVenue { id })
}

pub async fn update(
    client: &BackendClient,
    venue_id: Uuid,
    form: VenueForm,
) -> Result<(), AppError> {
    client.authenticated_user()?;
    let venue = validate_venue(form)?;

    let updated = client
        .store()
        .update_template_venue(venue_id, venue_fields(venue))
        .await
        .map_err(|error| AppError::from_backend("Failed to update venue", error))?;
    if updated == 0 {
        return Err(AppError::not_found(format!("venue {venue_id} does not exist")));
    }
    Ok(())
}

pub async fn delete(client: &BackendClient, venue_id: Uuid) -> Result<(), AppError> {
    client.authenticated_user()?;

    let deleted = client
        .store()
        .delete_template_venue(venue_id)
        .await
        .map_err(|error| AppError::from_backend("Failed to delete venue", error))?;
    if deleted == 0 {
        return Err(AppError::not_found(format!("venue {venue_id} does not exist")));
    }
    Ok(())
}

fn venue_fields(venue: ValidVenue) -> VenueFields {
    VenueFields {
        name: venue.name,
        address: venue.address,
        city: venue.city,
        state: venue.state,
        capacity: i64::from(venue.capacity),
    }
}
