//! Create, read, update and delete of an event together with its venues.
//!
//! The backend has no transaction spanning both collections, so every
//! operation is an ordered sequence of single-collection calls:
//! - create inserts the event, then its venues; if the venue batch fails
//!   the event stays and the result carries [`Advisory::VenuesNotSaved`];
//! - update replaces the venue set wholesale (delete all, insert all), and
//!   the delete is best-effort;
//! - delete removes the venues best-effort, then the event, and treats
//!   "nothing deleted" as a failure since blocked deletes are silent.
//!
//! Concurrent updates and deletes of one event are not isolated from each
//! other.

use uuid::Uuid;

use super::model::{EventDetails, EventEditForm, EventForm, ValidEvent, ValidVenue};
use super::normalize;
use super::validation::{validate_event, DATE_FORMAT};
use crate::backend::{
    AuthUser, BackendClient, EventChanges, EventRecord, NewEventRow, NewVenueRow,
};
use crate::common::error::{friendly_message, AppError};
use crate::common::outcome::{best_effort, Advisory, Completed};

pub async fn create_event(
    client: &BackendClient,
    form: EventForm,
) -> Result<Completed<Uuid>, AppError> {
    let user = client.authenticated_user()?;
    let event = validate_event(form)?;

    let event_id = client
        .store()
        .insert_event(NewEventRow {
            owner_id: user.id,
            name: event.name.clone(),
            sport_type: event.sport_type.to_string(),
            description: event.description.clone(),
            event_date: event.event_date.format(DATE_FORMAT).to_string(),
        })
        .await
        .map_err(|error| AppError::from_backend("Event insert failed", error))?;

    // The event row is committed from here on; a venue failure only warns.
    let saved = client
        .store()
        .insert_venues(venue_rows(event_id, &event.venues))
        .await;
    let advisory = best_effort(saved, |message| Advisory::VenuesNotSaved {
        event_id,
        message,
    });

    log::info!("event {event_id} created by {}", user.id);
    Ok(Completed::new(event_id).with_advisory(advisory))
}

pub async fn get_event(client: &BackendClient, event_id: Uuid) -> Result<EventDetails, AppError> {
    let record = load_record(client, event_id).await?;
    Ok(normalize::event_details(record))
}

pub async fn get_event_for_edit(
    client: &BackendClient,
    event_id: Uuid,
) -> Result<EventEditForm, AppError> {
    let record = load_record(client, event_id).await?;
    Ok(normalize::edit_form(record))
}

/// Replaces the event's fields and its complete venue list.
pub async fn update_event(
    client: &BackendClient,
    event_id: Uuid,
    form: EventForm,
) -> Result<Completed<()>, AppError> {
    let user = client.authenticated_user()?;
    let event = validate_event(form)?;
    verify_ownership(client, event_id, user).await?;

    let updated = client
        .store()
        .update_event(event_id, event_changes(&event))
        .await
        .map_err(|error| AppError::from_backend("Event update failed", error))?;
    if updated == 0 {
        return Err(AppError::persistence(
            "Event update failed: no rows were updated - check authorization",
        ));
    }

    let cleared = client.store().delete_event_venues(event_id).await;
    let advisory = best_effort(cleared, |message| Advisory::VenueCleanupFailed {
        event_id,
        message,
    });

    client
        .store()
        .insert_venues(venue_rows(event_id, &event.venues))
        .await
        .map_err(|error| AppError::from_backend("Failed to save venues", error))?;

    log::info!("event {event_id} updated by {}", user.id);
    Ok(Completed::new(()).with_advisory(advisory))
}

pub async fn delete_event(
    client: &BackendClient,
    event_id: Uuid,
) -> Result<Completed<()>, AppError> {
    let cleared = client.store().delete_event_venues(event_id).await;
    let advisory = best_effort(cleared, |message| Advisory::VenueCleanupFailed {
        event_id,
        message,
    });

    let deleted = client
        .store()
        .delete_event(event_id)
        .await
        .map_err(|error| AppError::from_backend("Failed to delete event", error))?;
    if deleted.is_empty() {
        return Err(AppError::persistence(
            "Event delete failed: no rows were deleted - check authorization",
        ));
    }

    log::info!("event {event_id} deleted");
    Ok(Completed::new(()).with_advisory(advisory))
}

async fn load_record(client: &BackendClient, event_id: Uuid) -> Result<EventRecord, AppError> {
    client
        .store()
        .fetch_event(event_id)
        .await
        .map_err(|error| AppError::from_backend("Failed to load event", error))?
        .ok_or_else(|| AppError::not_found(format!("event {event_id} does not exist")))
}

async fn verify_ownership(
    client: &BackendClient,
    event_id: Uuid,
    user: &AuthUser,
) -> Result<(), AppError> {
    let owner = match client.store().find_event_owner(event_id).await {
        Ok(Some(owner)) => owner,
        Ok(None) => {
            return Err(AppError::forbidden(format!(
                "could not verify ownership of event {event_id}: event not found"
            )))
        }
        Err(error) => {
            log::error!("ownership check for event {event_id} failed: {error}");
            return Err(AppError::forbidden(format!(
                "could not verify ownership of event {event_id}: {}",
                friendly_message(&error.message)
            )));
        }
    };

    if owner.owner_id != user.id {
        log::warn!("user {} tried to modify event {event_id}", user.id);
        return Err(AppError::forbidden("permission denied: you do not own this event"));
    }
    Ok(())
}

fn event_changes(event: &ValidEvent) -> EventChanges {
    EventChanges {
        name: event.name.clone(),
        sport_type: event.sport_type.to_string(),
        description: event.description.clone(),
        event_date: event.event_date.format(DATE_FORMAT).to_string(),
    }
}

fn venue_rows(event_id: Uuid, venues: &[ValidVenue]) -> Vec<NewVenueRow> {
    venues
        .iter()
        .map(|venue| NewVenueRow {
            event_id: Some(event_id),
            name: venue.name.clone(),
            address: venue.address.clone(),
            city: venue.city.clone(),
            state: venue.state.clone(),
            capacity: i64::from(venue.capacity),
        })
        .collect()
}
