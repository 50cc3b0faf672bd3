//! Reshapes joined event reads into display and edit records.

use super::model::{EventDetails, EventEditForm, SportType, VenueDetails};
use super::validation::{parse_date, DATE_FORMAT};
use crate::backend::{EventRecord, RawVenue, RelatedVenues};

/// Capacity shown for a venue whose row has none.
pub const DEFAULT_CAPACITY: i64 = 100;

/// Sport label shown when the row has none.
pub const UNKNOWN_SPORT: &str = "N/A";

/// The joined relation as an ordered list, whatever shape it arrived in.
pub fn venue_list(related: Option<RelatedVenues>) -> Vec<RawVenue> {
    match related {
        None => Vec::new(),
        Some(RelatedVenues::One(venue)) => vec![venue],
        Some(RelatedVenues::Many(venues)) => venues,
    }
}

pub fn venue_details(raw: RawVenue) -> VenueDetails {
    VenueDetails {
        name: raw.name.unwrap_or_default(),
        address: raw.address.unwrap_or_default(),
        city: raw.city.unwrap_or_default(),
        state: raw.state.unwrap_or_default(),
        capacity: raw.capacity.unwrap_or(DEFAULT_CAPACITY),
    }
}

pub fn event_details(record: EventRecord) -> EventDetails {
    let event_date = record
        .event_date
        .as_deref()
        .and_then(leading_date)
        .and_then(parse_date);

    EventDetails {
        id: record.id,
        name: record.name.unwrap_or_default(),
        sport_type: record
            .sport_type
            .filter(|sport| !sport.is_empty())
            .unwrap_or_else(|| UNKNOWN_SPORT.to_string()),
        description: record.description.unwrap_or_default(),
        event_date,
        venues: venue_list(record.venues)
            .into_iter()
            .map(venue_details)
            .collect(),
    }
}

/// The edit form always shows at least one venue row.
pub fn edit_form(record: EventRecord) -> EventEditForm {
    let details = event_details(record);
    let sport_type = details
        .sport_type
        .parse::<SportType>()
        .unwrap_or(SportType::Football);
    let mut venues = details.venues;
    if venues.is_empty() {
        venues.push(venue_details(RawVenue::default()));
    }

    EventEditForm {
        id: details.id,
        name: details.name,
        sport_type,
        description: details.description,
        event_date: details
            .event_date
            .map(|date| date.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        venues,
    }
}

/// Stored dates may carry a time part; only the calendar date matters.
fn leading_date(raw: &str) -> Option<&str> {
    raw.get(..10)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;

    fn field_a() -> RawVenue {
        RawVenue {
            id: None,
            name: Some("Field A".into()),
            address: Some("1 Main St".into()),
            city: Some("Springfield".into()),
            state: Some("IL".into()),
            capacity: Some(500),
        }
    }

    fn record(venues: Option<RelatedVenues>) -> EventRecord {
        EventRecord {
            id: Uuid::new_v4(),
            name: Some("Derby".into()),
            sport_type: Some("Soccer".into()),
            description: None,
            event_date: Some("2025-05-01".into()),
            venues,
        }
    }

    #[test]
    fn a_single_object_becomes_a_one_element_list() {
        let venues = venue_list(Some(RelatedVenues::One(field_a())));
        assert_eq!(venues, vec![field_a()]);
    }

    #[test]
    fn a_one_element_array_stays_the_same_list() {
        let from_object = venue_list(Some(RelatedVenues::One(field_a())));
        let from_array = venue_list(Some(RelatedVenues::Many(vec![field_a()])));
        assert_eq!(from_array, from_object);
    }

    #[test]
    fn absent_or_empty_relations_become_an_empty_list() {
        assert!(venue_list(None).is_empty());
        assert!(venue_list(Some(RelatedVenues::Many(Vec::new()))).is_empty());
    }

    #[test]
    fn every_shape_produces_identical_details() {
        let one = event_details(record(Some(RelatedVenues::One(field_a()))));
        let many = event_details(record(Some(RelatedVenues::Many(vec![field_a()]))));
        assert_eq!(one.venues, many.venues);
        assert_eq!(one.venues.len(), 1);
        assert_eq!(one.venues[0].capacity, 500);
    }

    #[test]
    fn missing_columns_fall_back_to_display_defaults() {
        let bare = EventRecord {
            id: Uuid::new_v4(),
            name: None,
            sport_type: None,
            description: None,
            event_date: None,
            venues: Some(RelatedVenues::One(RawVenue::default())),
        };
        let details = event_details(bare);

        assert_eq!(details.name, "");
        assert_eq!(details.sport_type, UNKNOWN_SPORT);
        assert_eq!(details.description, "");
        assert_eq!(details.event_date, None);
        assert_eq!(details.venues[0].capacity, DEFAULT_CAPACITY);
        assert_eq!(details.venues[0].name, "");
    }

    #[test]
    fn timestamps_and_garbage_dates_are_tolerated() {
        let mut with_time = record(None);
        with_time.event_date = Some("2025-05-01T18:30:00+00:00".into());
        assert_eq!(
            event_details(with_time).event_date,
            NaiveDate::from_ymd_opt(2025, 5, 1)
        );

        let mut garbage = record(None);
        garbage.event_date = Some("soon".into());
        assert_eq!(event_details(garbage).event_date, None);
    }

    #[test]
    fn edit_form_keeps_one_blank_venue_row_and_a_known_sport() {
        let mut legacy = record(None);
        legacy.sport_type = Some("Quidditch".into());
        let form = edit_form(legacy);

        assert_eq!(form.sport_type, SportType::Football);
        assert_eq!(form.event_date, "2025-05-01");
        assert_eq!(form.venues.len(), 1);
        assert_eq!(form.venues[0].capacity, DEFAULT_CAPACITY);
        assert_eq!(form.venues[0].name, "");
    }
}
