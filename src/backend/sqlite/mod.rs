//! SQLite implementation of the backend ports.
//!
//! The hosted backend enforces row-level policies on every statement; this
//! store reproduces them from the viewer it is scoped to:
//! - events are readable by anyone, inserted only for the viewer as owner,
//!   and updated or deleted only by their owner (otherwise zero rows);
//! - event venues are inserted only under existing events the viewer owns,
//!   and removed only from those (otherwise zero rows);
//! - `venues.event_id` carries no foreign key, so an event whose venue
//!   cleanup failed can still be deleted and its venues stay orphaned;
//! - template venues need an authenticated viewer.

mod auth;
mod events;
mod venues;

pub use auth::SqliteAuth;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{
    BackendError, EventChanges, EventOwnerRow, EventQuery, EventRecord, EventRow, EventStore,
    NewEventRow, NewVenueRow, VenueFields, VenueRow,
};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    viewer: Option<Uuid>,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool, viewer: None }
    }

    /// Scopes the store to the given caller for row-level checks.
    pub fn acting_as(mut self, viewer: Option<Uuid>) -> Self {
        self.viewer = viewer;
        self
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn insert_event(&self, row: NewEventRow) -> Result<Uuid, BackendError> {
        events::insert(&self.pool, self.viewer, row).await
    }

    async fn find_event_owner(
        &self,
        event_id: Uuid,
    ) -> Result<Option<EventOwnerRow>, BackendError> {
        events::find_owner(&self.pool, event_id).await
    }

    async fn fetch_event(&self, event_id: Uuid) -> Result<Option<EventRecord>, BackendError> {
        events::fetch_with_venues(&self.pool, event_id).await
    }

    async fn query_events(&self, query: &EventQuery) -> Result<Vec<EventRecord>, BackendError> {
        events::query_with_venues(&self.pool, query).await
    }

    async fn update_event(
        &self,
        event_id: Uuid,
        changes: EventChanges,
    ) -> Result<u64, BackendError> {
        events::update(&self.pool, self.viewer, event_id, changes).await
    }

    async fn delete_event(&self, event_id: Uuid) -> Result<Vec<EventRow>, BackendError> {
        events::delete(&self.pool, self.viewer, event_id).await
    }

    async fn insert_venues(&self, rows: Vec<NewVenueRow>) -> Result<Vec<Uuid>, BackendError> {
        venues::insert_batch(&self.pool, self.viewer, rows).await
    }

    async fn delete_event_venues(&self, event_id: Uuid) -> Result<u64, BackendError> {
        venues::delete_for_event(&self.pool, self.viewer, event_id).await
    }

    async fn list_template_venues(&self) -> Result<Vec<VenueRow>, BackendError> {
        venues::list_templates(&self.pool).await
    }

    async fn update_template_venue(
        &self,
        venue_id: Uuid,
        fields: VenueFields,
    ) -> Result<u64, BackendError> {
        venues::update_template(&self.pool, self.viewer, venue_id, fields).await
    }

    async fn delete_template_venue(&self, venue_id: Uuid) -> Result<u64, BackendError> {
        venues::delete_template(&self.pool, self.viewer, venue_id).await
    }
}

fn row_level_violation(table: &str) -> BackendError {
    BackendError::new(format!(
        "new row violates row-level security policy for table \"{table}\""
    ))
}

fn uuid_column(row: &SqliteRow, column: &str) -> Result<Uuid, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn optional_uuid_column(row: &SqliteRow, column: &str) -> Result<Option<Uuid>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|raw| {
        Uuid::parse_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
    })
    .transpose()
}
