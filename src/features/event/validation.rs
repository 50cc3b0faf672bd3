use std::borrow::Cow;

use chrono::NaiveDate;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use super::model::{CapacityInput, EventForm, SportType, ValidEvent, ValidVenue, VenueForm};
use crate::common::error::{AppError, FieldError, FieldErrors};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Checks an event form and turns it into the typed record, or reports one
/// message per offending field.
pub fn validate_event(form: EventForm) -> Result<ValidEvent, AppError> {
    form.validate()
        .map_err(|errors| AppError::validation(collect_field_errors(&errors)))?;

    let sport_type = form
        .sport_type
        .parse::<SportType>()
        .map_err(|_| AppError::invalid_field("sport_type", "Unknown sport type"))?;
    let event_date = parse_date(&form.event_date)
        .ok_or_else(|| AppError::invalid_field("event_date", "Event date must be YYYY-MM-DD"))?;

    let venues = form
        .venues
        .into_iter()
        .map(into_valid_venue)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidEvent {
        name: form.name,
        sport_type,
        description: form.description.filter(|text| !text.trim().is_empty()),
        event_date,
        venues,
    })
}

pub fn validate_venue(form: VenueForm) -> Result<ValidVenue, AppError> {
    form.validate()
        .map_err(|errors| AppError::validation(collect_field_errors(&errors)))?;
    into_valid_venue(form)
}

fn into_valid_venue(form: VenueForm) -> Result<ValidVenue, AppError> {
    let capacity = form
        .capacity
        .coerce()
        .map_err(|message| AppError::invalid_field("capacity", message))?;

    Ok(ValidVenue {
        name: form.name,
        address: form.address,
        city: form.city,
        state: form.state,
        capacity,
    })
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Flattens validator output into `field` / `venues[1].city` paths, keeping
/// the first message per field.
pub fn collect_field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut collected = Vec::new();
    flatten_into("", errors, &mut collected);
    FieldErrors(collected)
}

fn flatten_into(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|(left, _), (right, _)| left.to_string().cmp(&right.to_string()));

    for (field, kind) in fields {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(first) = list.first() {
                    let message = first
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| first.code.to_string());
                    out.push(FieldError {
                        field: path,
                        message,
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten_into(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten_into(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub(crate) fn validate_sport_type(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(failure("required", "Sport type is required"));
    }
    value
        .parse::<SportType>()
        .map(|_| ())
        .map_err(|_| failure("sport_type", "Unknown sport type"))
}

pub(crate) fn validate_event_date(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(failure("required", "Event date is required"));
    }
    parse_date(value)
        .map(|_| ())
        .ok_or_else(|| failure("date", "Event date must be YYYY-MM-DD"))
}

pub(crate) fn validate_capacity(value: &CapacityInput) -> Result<(), ValidationError> {
    value
        .coerce()
        .map(|_| ())
        .map_err(|message| failure("capacity", message))
}
