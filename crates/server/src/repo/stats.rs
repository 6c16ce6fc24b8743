use shared_types::{AppError, PlatformStats};
use sqlx::{Pool, Postgres};

use crate::error_convert::SqlxErrorExt;

async fn count(pool: &Pool<Postgres>, sql: &str) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, Option<i64>>(sql)
        .fetch_one(pool)
        .await
        .map(|n| n.unwrap_or(0))
        .map_err(SqlxErrorExt::into_app_error)
}

/// Counts behind the admin console overview.
#[tracing::instrument(skip(pool))]
pub async fn platform(pool: &Pool<Postgres>) -> Result<PlatformStats, AppError> {
    Ok(PlatformStats {
        total_listings: count(pool, "SELECT COUNT(*) FROM rooms").await?,
        active_listings: count(
            pool,
            "SELECT COUNT(*) FROM rooms WHERE availability = 'available'",
        )
        .await?,
        total_bookings: count(pool, "SELECT COUNT(*) FROM bookings").await?,
        pending_bookings: count(pool, "SELECT COUNT(*) FROM bookings WHERE status = 'pending'")
            .await?,
        total_users: count(pool, "SELECT COUNT(*) FROM profiles").await?,
    })
}
