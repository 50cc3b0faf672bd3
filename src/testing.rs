//! Fixtures shared by the unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::sqlite::SqliteStore;
use crate::backend::{
    AuthUser, BackendClient, BackendError, EventChanges, EventOwnerRow, EventQuery, EventRecord,
    EventRow, EventStore, NewEventRow, NewVenueRow, VenueFields, VenueRow,
};
use crate::config::sqlite;

/// Cheapest cost bcrypt accepts.
pub const TEST_COST: u32 = 4;

pub async fn memory_pool() -> SqlitePool {
    let pool = sqlite::connect_in_memory().await.unwrap();
    sqlite::init(&pool).await.unwrap();
    pool
}

pub fn user() -> AuthUser {
    let id = Uuid::new_v4();
    AuthUser {
        id,
        email: format!("{}@example.com", id.simple()),
    }
}

pub fn client(pool: &SqlitePool, user: Option<AuthUser>) -> BackendClient {
    let store = SqliteStore::new(pool.clone()).acting_as(user.as_ref().map(|u| u.id));
    BackendClient::new(user, Arc::new(store))
}

pub async fn count_events(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn count_venues(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM venues")
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Which backend calls a [`FaultyStore`] sabotages.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    /// `insert_venues` fails like a row-level policy rejection.
    pub venue_insert: bool,
    /// `delete_event_venues` fails.
    pub venue_delete: bool,
    /// `delete_event` deletes nothing and reports no error.
    pub silent_event_delete: bool,
}

/// A SQLite store with injectable failures.
pub struct FaultyStore {
    inner: SqliteStore,
    faults: Faults,
}

impl FaultyStore {
    pub fn client(pool: &SqlitePool, user: Option<AuthUser>, faults: Faults) -> BackendClient {
        let inner = SqliteStore::new(pool.clone()).acting_as(user.as_ref().map(|u| u.id));
        BackendClient::new(user, Arc::new(FaultyStore { inner, faults }))
    }
}

#[async_trait]
impl EventStore for FaultyStore {
    async fn insert_event(&self, row: NewEventRow) -> Result<Uuid, BackendError> {
        self.inner.insert_event(row).await
    }

    async fn find_event_owner(
        &self,
        event_id: Uuid,
    ) -> Result<Option<EventOwnerRow>, BackendError> {
        self.inner.find_event_owner(event_id).await
    }

    async fn fetch_event(&self, event_id: Uuid) -> Result<Option<EventRecord>, BackendError> {
        self.inner.fetch_event(event_id).await
    }

    async fn query_events(&self, query: &EventQuery) -> Result<Vec<EventRecord>, BackendError> {
        self.inner.query_events(query).await
    }

    async fn update_event(
        &self,
        event_id: Uuid,
        changes: EventChanges,
    ) -> Result<u64, BackendError> {
        self.inner.update_event(event_id, changes).await
    }

    async fn delete_event(&self, event_id: Uuid) -> Result<Vec<EventRow>, BackendError> {
        if self.faults.silent_event_delete {
            return Ok(Vec::new());
        }
        self.inner.delete_event(event_id).await
    }

    async fn insert_venues(&self, rows: Vec<NewVenueRow>) -> Result<Vec<Uuid>, BackendError> {
        if self.faults.venue_insert {
            return Err(BackendError::new(
                "new row violates row-level security policy for table \"venues\"",
            ));
        }
        self.inner.insert_venues(rows).await
    }

    async fn delete_event_venues(&self, event_id: Uuid) -> Result<u64, BackendError> {
        if self.faults.venue_delete {
            return Err(BackendError::new("permission denied for table venues"));
        }
        self.inner.delete_event_venues(event_id).await
    }

    async fn list_template_venues(&self) -> Result<Vec<VenueRow>, BackendError> {
        self.inner.list_template_venues().await
    }

    async fn update_template_venue(
        &self,
        venue_id: Uuid,
        fields: VenueFields,
    ) -> Result<u64, BackendError> {
        self.inner.update_template_venue(venue_id, fields).await
    }

    async fn delete_template_venue(&self, venue_id: Uuid) -> Result<u64, BackendError> {
        self.inner.delete_template_venue(venue_id).await
    }
}
