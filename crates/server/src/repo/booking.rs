use chrono::{DateTime, NaiveDate, Utc};
use shared_types::{AppError, Booking, BookingStatus, NewBooking};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

const COLUMNS: &str = "id, room_id, tenant_id, owner_id, monthly_rent, security_deposit, \
                       start_date, end_date, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    room_id: Uuid,
    tenant_id: Uuid,
    owner_id: Uuid,
    monthly_rent: f64,
    security_deposit: f64,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn to_booking(row: BookingRow) -> Result<Booking, AppError> {
    let status = BookingStatus::parse(&row.status)
        .ok_or_else(|| AppError::internal(format!("unknown booking status '{}'", row.status)))?;
    Ok(Booking {
        id: row.id,
        room_id: row.room_id,
        tenant_id: row.tenant_id,
        owner_id: row.owner_id,
        monthly_rent: row.monthly_rent,
        security_deposit: row.security_deposit,
        start_date: row.start_date,
        end_date: row.end_date,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn to_bookings(rows: Vec<BookingRow>) -> Result<Vec<Booking>, AppError> {
    rows.into_iter().map(to_booking).collect()
}

/// Insert a pending booking.
pub async fn insert(pool: &Pool<Postgres>, new: NewBooking) -> Result<Booking, AppError> {
    let row = sqlx::query_as::<_, BookingRow>(&format!(
        r#"INSERT INTO bookings
               (room_id, tenant_id, owner_id, monthly_rent, security_deposit, start_date, status)
           VALUES ($1, $2, $3, $4, $5, $6, 'pending')
           RETURNING {COLUMNS}"#
    ))
    .bind(new.room_id)
    .bind(new.tenant_id)
    .bind(new.owner_id)
    .bind(new.monthly_rent)
    .bind(new.security_deposit)
    .bind(new.start_date)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    to_booking(row)
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Booking>, AppError> {
    sqlx::query_as::<_, BookingRow>(&format!("SELECT {COLUMNS} FROM bookings WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?
        .map(to_booking)
        .transpose()
}

pub async fn list_for_tenant(
    pool: &Pool<Postgres>,
    tenant_id: Uuid,
) -> Result<Vec<Booking>, AppError> {
    let rows = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {COLUMNS} FROM bookings WHERE tenant_id = $1 ORDER BY created_at DESC"
    ))
    .bind(tenant_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    to_bookings(rows)
}

pub async fn list_for_owner(
    pool: &Pool<Postgres>,
    owner_id: Uuid,
) -> Result<Vec<Booking>, AppError> {
    let rows = sqlx::query_as::<_, BookingRow>(&format!(
        "SELECT {COLUMNS} FROM bookings WHERE owner_id = $1 ORDER BY created_at DESC"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    to_bookings(rows)
}

/// Conditional status update. Yields `None` if the row was not in `from`.
pub async fn update_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    from: BookingStatus,
    to: BookingStatus,
) -> Result<Option<Booking>, AppError> {
    sqlx::query_as::<_, BookingRow>(&format!(
        r#"UPDATE bookings
           SET status = $3, updated_at = NOW()
           WHERE id = $1 AND status = $2
           RETURNING {COLUMNS}"#
    ))
    .bind(id)
    .bind(from.as_str())
    .bind(to.as_str())
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?
    .map(to_booking)
    .transpose()
}
