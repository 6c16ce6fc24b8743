use shared_types::{AppError, Profile};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
        }
    }
}

/// Case-insensitive lookup by email.
pub async fn find_by_email(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Option<Profile>, AppError> {
    let row = sqlx::query_as::<_, ProfileRow>(
        "SELECT id, full_name, email, phone FROM profiles WHERE LOWER(email) = LOWER($1)",
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row.map(Profile::from))
}

pub async fn list_by_ids(pool: &Pool<Postgres>, ids: &[Uuid]) -> Result<Vec<Profile>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, ProfileRow>(
        "SELECT id, full_name, email, phone FROM profiles WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows.into_iter().map(Profile::from).collect())
}
