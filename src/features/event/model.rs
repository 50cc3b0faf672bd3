use std::str::FromStr;

use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validation::{validate_capacity, validate_event_date, validate_sport_type};
use crate::common::outcome::Completed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum SportType {
    Football,
    Basketball,
    Soccer,
    Tennis,
    Baseball,
    Hockey,
    Golf,
    Volleyball,
}

impl SportType {
    pub const ALL: [SportType; 8] = [
        SportType::Football,
        SportType::Basketball,
        SportType::Soccer,
        SportType::Tennis,
        SportType::Baseball,
        SportType::Hockey,
        SportType::Golf,
        SportType::Volleyball,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SportType::Football => "Football",
            SportType::Basketball => "Basketball",
            SportType::Soccer => "Soccer",
            SportType::Tennis => "Tennis",
            SportType::Baseball => "Baseball",
            SportType::Hockey => "Hockey",
            SportType::Golf => "Golf",
            SportType::Volleyball => "Volleyball",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("unknown sport type {:?}", _0)]
pub struct UnknownSportType(pub String);

impl FromStr for SportType {
    type Err = UnknownSportType;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        SportType::ALL
            .into_iter()
            .find(|sport| sport.as_str() == raw)
            .ok_or_else(|| UnknownSportType(raw.to_string()))
    }
}

/// Capacity as typed into a form: either already a number or still text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapacityInput {
    Number(f64),
    Text(String),
}

impl Default for CapacityInput {
    fn default() -> Self {
        CapacityInput::Text(String::new())
    }
}

impl From<u32> for CapacityInput {
    fn from(value: u32) -> Self {
        CapacityInput::Number(f64::from(value))
    }
}

impl From<&str> for CapacityInput {
    fn from(value: &str) -> Self {
        CapacityInput::Text(value.to_string())
    }
}

impl CapacityInput {
    /// Coerces the input to a whole number of seats, at least one.
    pub fn coerce(&self) -> Result<u32, &'static str> {
        let number = match self {
            CapacityInput::Number(number) => *number,
            CapacityInput::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err("Capacity is required");
                }
                text.parse::<f64>().map_err(|_| "Capacity must be a number")?
            }
        };

        if !number.is_finite() {
            return Err("Capacity must be a number");
        }
        if number < 1.0 {
            return Err("Capacity must be at least 1");
        }
        if number.fract() != 0.0 {
            return Err("Capacity must be a whole number");
        }
        if number > f64::from(u32::MAX) {
            return Err("Capacity is too large");
        }
        Ok(number as u32)
    }
}

/// Untrusted venue input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct VenueForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Venue name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[serde(default)]
    #[validate(custom(function = "validate_capacity"))]
    pub capacity: CapacityInput,
}

/// Untrusted event input, exactly as a form submits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct EventForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Event name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_sport_type"))]
    pub sport_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_event_date"))]
    pub event_date: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one venue is required"), nested)]
    pub venues: Vec<VenueForm>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidVenue {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEvent {
    pub name: String,
    pub sport_type: SportType,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub venues: Vec<ValidVenue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VenueDetails {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub capacity: i64,
}

/// An event as shown to a reader, with display defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub id: Uuid,
    pub name: String,
    pub sport_type: String,
    pub description: String,
    pub event_date: Option<NaiveDate>,
    pub venues: Vec<VenueDetails>,
}

/// Prefill for the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEditForm {
    pub id: Uuid,
    pub name: String,
    pub sport_type: SportType,
    pub description: String,
    pub event_date: String,
    pub venues: Vec<VenueDetails>,
}

/// Dashboard filter as submitted; blank values mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sport: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedEvent {
    pub success: bool,
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venues_warning: Option<bool>,
}

impl From<Completed<Uuid>> for CreatedEvent {
    fn from(completed: Completed<Uuid>) -> Self {
        CreatedEvent {
            success: true,
            id: completed.value,
            venues_warning: completed.venues_not_saved().then_some(true),
        }
    }
}
