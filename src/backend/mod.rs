//! Ports to the hosted backend: the row store holding `events` and `venues`,
//! and the authentication service. Protocol code only talks to these traits
//! through a [`BackendClient`] built per request.

pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::error::AppError;

/// Failure reported by the backend, carrying its own message text.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{}", message)]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        BackendError {
            message: message.into(),
        }
    }
}

impl std::error::Error for BackendError {}

#[macro_export]
macro_rules! backend_error {
    ($target:ty : $($other:path), *) => {
        $(
            impl From<$other> for $target {
                fn from(other: $other) -> Self {
                    Self { message: other.to_string() }
                }
            }
        )*
    }
}

backend_error!(
    BackendError: sqlx::Error, serde_json::Error, bcrypt::BcryptError
);

#[derive(Debug, Clone)]
pub struct NewEventRow {
    pub owner_id: Uuid,
    pub name: String,
    pub sport_type: String,
    pub description: Option<String>,
    pub event_date: String,
}

#[derive(Debug, Clone)]
pub struct EventChanges {
    pub name: String,
    pub sport_type: String,
    pub description: Option<String>,
    pub event_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub sport_type: String,
    pub description: Option<String>,
    pub event_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventOwnerRow {
    pub owner_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewVenueRow {
    pub event_id: Option<Uuid>,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub capacity: i64,
}

#[derive(Debug, Clone)]
pub struct VenueFields {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub capacity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueRow {
    pub id: Uuid,
    pub event_id: Option<Uuid>,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub capacity: i64,
}

/// A venue as embedded in a joined event read. Every column may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawVenue {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
}

/// The related-venues column of a joined read. Depending on how the
/// relation is resolved the backend hands back either a list or a bare
/// object; an absent relation is `None` on the record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RelatedVenues {
    Many(Vec<RawVenue>),
    One(RawVenue),
}

/// An event row joined with its venues.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sport_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub venues: Option<RelatedVenues>,
}

/// Read filter over `events`; `None` means no predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub name_contains: Option<String>,
    pub sport_type: Option<String>,
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_event(&self, row: NewEventRow) -> Result<Uuid, BackendError>;
    async fn find_event_owner(&self, event_id: Uuid)
        -> Result<Option<EventOwnerRow>, BackendError>;
    async fn fetch_event(&self, event_id: Uuid) -> Result<Option<EventRecord>, BackendError>;
    async fn query_events(&self, query: &EventQuery) -> Result<Vec<EventRecord>, BackendError>;
    /// Returns the number of rows the backend reports as updated.
    async fn update_event(&self, event_id: Uuid, changes: EventChanges)
        -> Result<u64, BackendError>;
    /// Returns the rows actually deleted, which may be none.
    async fn delete_event(&self, event_id: Uuid) -> Result<Vec<EventRow>, BackendError>;
    /// Inserts the whole batch or nothing.
    async fn insert_venues(&self, rows: Vec<NewVenueRow>) -> Result<Vec<Uuid>, BackendError>;
    async fn delete_event_venues(&self, event_id: Uuid) -> Result<u64, BackendError>;
    async fn list_template_venues(&self) -> Result<Vec<VenueRow>, BackendError>;
    async fn update_template_venue(&self, venue_id: Uuid, fields: VenueFields)
        -> Result<u64, BackendError>;
    async fn delete_template_venue(&self, venue_id: Uuid) -> Result<u64, BackendError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Display)]
pub enum AuthFailure {
    #[display("Invalid login credentials")]
    InvalidCredentials,
    #[display("Token is invalid or has expired")]
    InvalidToken,
    #[display("{}", message)]
    Rejected { field: &'static str, message: String },
    #[display("{}", _0)]
    Backend(BackendError),
}

impl std::error::Error for AuthFailure {}

impl From<BackendError> for AuthFailure {
    fn from(error: BackendError) -> Self {
        AuthFailure::Backend(error)
    }
}

impl From<sqlx::Error> for AuthFailure {
    fn from(error: sqlx::Error) -> Self {
        AuthFailure::Backend(error.into())
    }
}

impl From<bcrypt::BcryptError> for AuthFailure {
    fn from(error: bcrypt::BcryptError) -> Self {
        AuthFailure::Backend(error.into())
    }
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_up(&self, credentials: Credentials) -> Result<AuthUser, AuthFailure>;
    async fn sign_in(&self, credentials: Credentials) -> Result<Session, AuthFailure>;
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthFailure>;
    /// Issues a recovery token when the address belongs to an account.
    async fn request_password_reset(&self, email: &str) -> Result<Option<String>, AuthFailure>;
    async fn redeem_recovery_token(&self, token: &str) -> Result<Session, AuthFailure>;
    async fn update_password(&self, user_id: Uuid, password: &str) -> Result<(), AuthFailure>;
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthFailure>;
}

/// Request-scoped handle on the backend: who is calling, and the store as
/// that caller sees it.
#[derive(Clone)]
pub struct BackendClient {
    user: Option<AuthUser>,
    store: Arc<dyn EventStore>,
}

impl BackendClient {
    pub fn new(user: Option<AuthUser>, store: Arc<dyn EventStore>) -> Self {
        BackendClient { user, store }
    }

    pub fn authenticated_user(&self) -> Result<&AuthUser, AppError> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::unauthorized("please log in"))
    }

    pub fn store(&self) -> &dyn EventStore {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn related_venues_decode_from_every_shape() {
        let many: EventRecord = serde_json::from_str(
            r#"{"id":"7f1c2a52-5f7e-4c1b-9a55-0c1f3c2b9d10","venues":[{"name":"Field A","capacity":500}]}"#,
        )
        .unwrap();
        assert!(matches!(many.venues, Some(RelatedVenues::Many(ref v)) if v.len() == 1));

        let one: EventRecord = serde_json::from_str(
            r#"{"id":"7f1c2a52-5f7e-4c1b-9a55-0c1f3c2b9d10","venues":{"name":"Field A","capacity":500}}"#,
        )
        .unwrap();
        assert!(matches!(one.venues, Some(RelatedVenues::One(ref v)) if v.capacity == Some(500)));

        let absent: EventRecord =
            serde_json::from_str(r#"{"id":"7f1c2a52-5f7e-4c1b-9a55-0c1f3c2b9d10","venues":null}"#)
                .unwrap();
        assert_eq!(absent.venues, None);
    }

    #[test]
    fn anonymous_clients_are_told_to_log_in() {
        let client = BackendClient::new(None, Arc::new(NullStore));
        let error = client.authenticated_user().unwrap_err();
        assert!(matches!(error, AppError::Unauthorized { .. }));
    }

    struct NullStore;

    #[async_trait]
    impl EventStore for NullStore {
        async fn insert_event(&self, _: NewEventRow) -> Result<Uuid, BackendError> {
            Err(BackendError::new("unavailable"))
        }
        async fn find_event_owner(&self, _: Uuid) -> Result<Option<EventOwnerRow>, BackendError> {
            Ok(None)
        }
        async fn fetch_event(&self, _: Uuid) -> Result<Option<EventRecord>, BackendError> {
            Ok(None)
        }
        async fn query_events(&self, _: &EventQuery) -> Result<Vec<EventRecord>, BackendError> {
            Ok(Vec::new())
        }
        async fn update_event(&self, _: Uuid, _: EventChanges) -> Result<u64, BackendError> {
            Ok(0)
        }
        async fn delete_event(&self, _: Uuid) -> Result<Vec<EventRow>, BackendError> {
            Ok(Vec::new())
        }
        async fn insert_venues(&self, _: Vec<NewVenueRow>) -> Result<Vec<Uuid>, BackendError> {
            Ok(Vec::new())
        }
        async fn delete_event_venues(&self, _: Uuid) -> Result<u64, BackendError> {
            Ok(0)
        }
        async fn list_template_venues(&self) -> Result<Vec<VenueRow>, BackendError> {
            Ok(Vec::new())
        }
        async fn update_template_venue(&self, _: Uuid, _: VenueFields) -> Result<u64, BackendError> {
            Ok(0)
        }
        async fn delete_template_venue(&self, _: Uuid) -> Result<u64, BackendError> {
            Ok(0)
        }
    }
}
