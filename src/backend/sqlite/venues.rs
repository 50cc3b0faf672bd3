use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{optional_uuid_column, row_level_violation, uuid_column};
use crate::backend::{BackendError, NewVenueRow, VenueFields, VenueRow};

impl sqlx::FromRow<'_, SqliteRow> for VenueRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(VenueRow {
            id: uuid_column(row, "id")?,
            event_id: optional_uuid_column(row, "event_id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            capacity: row.try_get("capacity")?,
        })
    }
}

/// Inserts every row in one transaction; any rejected row rolls back the batch.
pub(super) async fn insert_batch(
    pool: &SqlitePool,
    viewer: Option<Uuid>,
    rows: Vec<NewVenueRow>,
) -> Result<Vec<Uuid>, BackendError> {
    let Some(viewer) = viewer else {
        return Err(row_level_violation("venues"));
    };

    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(rows.len());

    for row in rows {
        if let Some(event_id) = row.event_id {
            let owner: Option<String> =
                sqlx::query_scalar("SELECT owner_id FROM events WHERE id = $1")
                    .bind(event_id.to_string())
                    .fetch_optional(&mut *tx)
                    .await?;
            if owner != Some(viewer.to_string()) {
                return Err(row_level_violation("venues"));
            }
        }

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO venues (id, event_id, name, address, city, state, capacity) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id.to_string())
        .bind(row.event_id.map(|id| id.to_string()))
        .bind(&row.name)
        .bind(&row.address)
        .bind(&row.city)
        .bind(&row.state)
        .bind(row.capacity)
        .execute(&mut *tx)
        .await?;
        ids.push(id);
    }

    tx.commit().await?;
    Ok(ids)
}

pub(super) async fn delete_for_event(
    pool: &SqlitePool,
    viewer: Option<Uuid>,
    event_id: Uuid,
) -> Result<u64, BackendError> {
    let result = sqlx::query(
        "DELETE FROM venues WHERE event_id = $1 AND event_id IN (SELECT id FROM events WHERE owner_id = $2)",
    )
    .bind(event_id.to_string())
    .bind(viewer.map(|id| id.to_string()))
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub(super) async fn list_templates(pool: &SqlitePool) -> Result<Vec<VenueRow>, BackendError> {
    let rows = sqlx::query_as::<_, VenueRow>(
        "SELECT id, event_id, name, address, city, state, capacity FROM venues WHERE event_id IS NULL ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub(super) async fn update_template(
    pool: &SqlitePool,
    viewer: Option<Uuid>,
    venue_id: Uuid,
    fields: VenueFields,
) -> Result<u64, BackendError> {
    if viewer.is_none() {
        return Ok(0);
    }

    let result = sqlx::query(
        "UPDATE venues SET name = $1, address = $2, city = $3, state = $4, capacity = $5 WHERE id = $6 AND event_id IS NULL",
    )
    .bind(&fields.name)
    .bind(&fields.address)
    .bind(&fields.city)
    .bind(&fields.state)
    .bind(fields.capacity)
    .bind(venue_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub(super) async fn delete_template(
    pool: &SqlitePool,
    viewer: Option<Uuid>,
    venue_id: Uuid,
) -> Result<u64, BackendError> {
    if viewer.is_none() {
        return Ok(0);
    }

    let result = sqlx::query("DELETE FROM venues WHERE id = $1 AND event_id IS NULL")
        .bind(venue_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
