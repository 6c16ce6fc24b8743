use shared_types::{AppError, AppRole, UserRoleAssignment};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;
use crate::store::StoredUserRole;

/// All application role rows for a user, oldest first.
pub async fn list_for_user(
    pool: &Pool<Postgres>,
    user_id: Uuid,
) -> Result<Vec<StoredUserRole>, AppError> {
    sqlx::query_as::<_, StoredUserRole>(
        r#"SELECT user_id, role, created_at
           FROM user_roles
           WHERE user_id = $1
           ORDER BY created_at ASC, id ASC"#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Record the role chosen at signup if the user has no role row yet.
///
/// A transaction-scoped advisory lock keyed on the user serializes
/// concurrent claims, so the existence check and the insert see the same
/// state. Returns `None` when a row already exists.
pub async fn insert_first(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    role: AppRole,
) -> Result<Option<UserRoleAssignment>, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    let row = sqlx::query_as::<_, StoredUserRole>(
        r#"INSERT INTO user_roles (user_id, role)
           SELECT $1, $2
           WHERE NOT EXISTS (SELECT 1 FROM user_roles WHERE user_id = $1)
           RETURNING user_id, role, created_at"#,
    )
    .bind(user_id)
    .bind(role.as_str())
    .fetch_optional(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;

    Ok(row.map(|row| UserRoleAssignment {
        user_id: row.user_id,
        role,
        created_at: row.created_at,
    }))
}
