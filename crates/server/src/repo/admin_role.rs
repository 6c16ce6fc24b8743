use shared_types::{AdminRoleAssignment, AppError, NewAdminRole};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;
use crate::store::StoredAdminRole;

const COLUMNS: &str = "id, user_id, admin_role, assigned_city, created_at";

/// Admin role rows held by one user.
pub async fn list_for_user(
    pool: &Pool<Postgres>,
    user_id: Uuid,
) -> Result<Vec<StoredAdminRole>, AppError> {
    sqlx::query_as::<_, StoredAdminRole>(&format!(
        "SELECT {COLUMNS} FROM admin_roles WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Every admin role row, newest first.
pub async fn list_all(pool: &Pool<Postgres>) -> Result<Vec<StoredAdminRole>, AppError> {
    sqlx::query_as::<_, StoredAdminRole>(&format!(
        "SELECT {COLUMNS} FROM admin_roles ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<StoredAdminRole>, AppError> {
    sqlx::query_as::<_, StoredAdminRole>(&format!(
        "SELECT {COLUMNS} FROM admin_roles WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn insert(
    pool: &Pool<Postgres>,
    new: NewAdminRole,
) -> Result<AdminRoleAssignment, AppError> {
    let row = sqlx::query_as::<_, StoredAdminRole>(&format!(
        r#"INSERT INTO admin_roles (user_id, admin_role, assigned_city)
           VALUES ($1, $2, $3)
           RETURNING {COLUMNS}"#
    ))
    .bind(new.user_id)
    .bind(new.admin_role.as_str())
    .bind(new.assigned_city.as_deref())
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    row.parse()
        .ok_or_else(|| AppError::internal(format!("unknown admin role '{}'", row.admin_role)))
}

/// Delete an admin role row. `super_admin` rows are never deleted here.
pub async fn delete(pool: &Pool<Postgres>, id: Uuid) -> Result<bool, AppError> {
    let result =
        sqlx::query("DELETE FROM admin_roles WHERE id = $1 AND admin_role <> 'super_admin'")
            .bind(id)
            .execute(pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected() > 0)
}
