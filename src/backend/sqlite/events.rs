use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use super::{row_level_violation, uuid_column};
use crate::backend::{
    BackendError, EventChanges, EventOwnerRow, EventQuery, EventRecord, EventRow, NewEventRow,
    RelatedVenues,
};

/// Event columns plus the related venues folded into one JSON column.
const EVENT_WITH_VENUES: &str = r#"
    SELECT e.id, e.name, e.sport_type, e.description, e.event_date,
           (SELECT json_group_array(json_object(
                       'id', v.id, 'name', v.name, 'address', v.address,
                       'city', v.city, 'state', v.state, 'capacity', v.capacity))
              FROM venues AS v
             WHERE v.event_id = e.id) AS venues
      FROM events AS e
"#;

impl sqlx::FromRow<'_, SqliteRow> for EventRecord {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let venues: Option<String> = row.try_get("venues")?;
        let venues = venues
            .map(|raw| serde_json::from_str::<RelatedVenues>(&raw))
            .transpose()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "venues".to_string(),
                source: Box::new(e),
            })?;

        Ok(EventRecord {
            id: uuid_column(row, "id")?,
            name: row.try_get("name")?,
            sport_type: row.try_get("sport_type")?,
            description: row.try_get("description")?,
            event_date: row.try_get("event_date")?,
            venues,
        })
    }
}

impl sqlx::FromRow<'_, SqliteRow> for EventRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(EventRow {
            id: uuid_column(row, "id")?,
            owner_id: uuid_column(row, "owner_id")?,
            name: row.try_get("name")?,
            sport_type: row.try_get("sport_type")?,
            description: row.try_get("description")?,
            event_date: row.try_get("event_date")?,
        })
    }
}

pub(super) async fn insert(
    pool: &SqlitePool,
    viewer: Option<Uuid>,
    row: NewEventRow,
) -> Result<Uuid, BackendError> {
    if viewer != Some(row.owner_id) {
        return Err(row_level_violation("events"));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO events (id, owner_id, name, sport_type, description, event_date, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(id.to_string())
    .bind(row.owner_id.to_string())
    .bind(&row.name)
    .bind(&row.sport_type)
    .bind(&row.description)
    .bind(&row.event_date)
    .bind(Utc::now().timestamp_micros())
    .execute(pool)
    .await?;

    Ok(id)
}

pub(super) async fn find_owner(
    pool: &SqlitePool,
    event_id: Uuid,
) -> Result<Option<EventOwnerRow>, BackendError> {
    let row = sqlx::query("SELECT owner_id FROM events WHERE id = $1")
        .bind(event_id.to_string())
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    Ok(Some(EventOwnerRow {
        owner_id: uuid_column(&row, "owner_id")?,
    }))
}

pub(super) async fn fetch_with_venues(
    pool: &SqlitePool,
    event_id: Uuid,
) -> Result<Option<EventRecord>, BackendError> {
    let sql = format!("{EVENT_WITH_VENUES} WHERE e.id = $1");
    let record = sqlx::query_as::<_, EventRecord>(&sql)
        .bind(event_id.to_string())
        .fetch_optional(pool)
        .await?;

    Ok(record)
}

/// Sport is matched in SQL. The name is matched afterwards because SQLite's
/// `lower()` folds ASCII only; both sides get the same Unicode folding here.
pub(super) async fn query_with_venues(
    pool: &SqlitePool,
    query: &EventQuery,
) -> Result<Vec<EventRecord>, BackendError> {
    let mut builder = QueryBuilder::<Sqlite>::new(EVENT_WITH_VENUES);
    if let Some(sport_type) = &query.sport_type {
        builder.push(" WHERE e.sport_type = ").push_bind(sport_type.clone());
    }
    builder.push(" ORDER BY e.event_date ASC, e.created_at ASC");

    let mut records = builder
        .build_query_as::<EventRecord>()
        .fetch_all(pool)
        .await?;

    if let Some(name) = &query.name_contains {
        let needle = name.to_lowercase();
        records.retain(|record| {
            record
                .name
                .as_deref()
                .is_some_and(|candidate| candidate.to_lowercase().contains(&needle))
        });
    }

    Ok(records)
}

pub(super) async fn update(
    pool: &SqlitePool,
    viewer: Option<Uuid>,
    event_id: Uuid,
    changes: EventChanges,
) -> Result<u64, BackendError> {
    let result = sqlx::query(
        "UPDATE events SET name = $1, sport_type = $2, description = $3, event_date = $4 WHERE id = $5 AND owner_id = $6",
    )
    .bind(&changes.name)
    .bind(&changes.sport_type)
    .bind(&changes.description)
    .bind(&changes.event_date)
    .bind(event_id.to_string())
    .bind(viewer.map(|id| id.to_string()))
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub(super) async fn delete(
    pool: &SqlitePool,
    viewer: Option<Uuid>,
    event_id: Uuid,
) -> Result<Vec<EventRow>, BackendError> {
    let rows = sqlx::query_as::<_, EventRow>(
        "DELETE FROM events WHERE id = $1 AND owner_id = $2 RETURNING id, owner_id, name, sport_type, description, event_date",
    )
    .bind(event_id.to_string())
    .bind(viewer.map(|id| id.to_string()))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
