use serde::Serialize;
use uuid::Uuid;

use crate::backend::VenueRow;

/// A venue that belongs to no event and can be reused when building one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateVenue {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub capacity: i64,
}

impl From<VenueRow> for TemplateVenue {
    fn from(row: VenueRow) -> Self {
        TemplateVenue {
            id: row.id,
            name: row.name,
            address: row.address,
            city: row.city,
            state: row.state,
            capacity: row.capacity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreatedVenue {
    pub id: Uuid,
}
