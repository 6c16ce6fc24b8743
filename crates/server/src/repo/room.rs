use shared_types::{AppError, Room, RoomAvailability};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    location_city: String,
    rent_amount: f64,
    security_deposit: Option<f64>,
    availability: String,
}

fn to_room(row: RoomRow) -> Room {
    Room {
        id: row.id,
        owner_id: row.owner_id,
        title: row.title,
        location_city: row.location_city,
        rent_amount: row.rent_amount,
        security_deposit: row.security_deposit,
        availability: RoomAvailability::from_str_or_default(&row.availability),
    }
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Room>, AppError> {
    let row = sqlx::query_as::<_, RoomRow>(
        r#"SELECT id, owner_id, title, location_city, rent_amount,
                  security_deposit, availability
           FROM rooms
           WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row.map(to_room))
}

pub async fn list_for_owner(pool: &Pool<Postgres>, owner_id: Uuid) -> Result<Vec<Room>, AppError> {
    let rows = sqlx::query_as::<_, RoomRow>(
        r#"SELECT id, owner_id, title, location_city, rent_amount,
                  security_deposit, availability
           FROM rooms
           WHERE owner_id = $1
           ORDER BY created_at DESC"#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows.into_iter().map(to_room).collect())
}
