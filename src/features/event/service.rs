use super::model::{EventDetails, EventFilter};
use super::normalize;
use crate::backend::{BackendClient, EventQuery};
use crate::common::error::AppError;

/// Sport filter value meaning "every sport".
pub const ALL_SPORTS: &str = "all";

impl EventFilter {
    /// Turns dashboard input into a store query. Blank fields mean no filter;
    /// any other sport is an exact match, so unknown sports just match nothing.
    pub fn into_query(self) -> EventQuery {
        let name_contains = self
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let sport_type = match self.sport.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(sport) if sport.eq_ignore_ascii_case(ALL_SPORTS) => None,
            Some(sport) => Some(sport.to_string()),
        };

        EventQuery {
            name_contains,
            sport_type,
        }
    }
}

/// Events matching the filter, earliest date first, with display defaults.
pub async fn list_events(
    client: &BackendClient,
    filter: EventFilter,
) -> Result<Vec<EventDetails>, AppError> {
    let query = filter.into_query();
    let records = client
        .store()
        .query_events(&query)
        .await
        .map_err(|error| AppError::from_backend("Failed to load events", error))?;

    Ok(records.into_iter().map(normalize::event_details).collect())
}
