use chrono::{DateTime, Utc};
use shared_types::{AdminNotification, AdminRole, AppError, NewNotification, NotificationType};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

const COLUMNS: &str =
    "id, type AS notification_type, title, message, data, target_role, is_read, read_at, created_at";

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    notification_type: String,
    title: String,
    message: String,
    data: serde_json::Value,
    target_role: String,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

fn to_notification(row: NotificationRow) -> Result<AdminNotification, AppError> {
    let notification_type = NotificationType::parse(&row.notification_type).ok_or_else(|| {
        AppError::internal(format!("unknown notification type '{}'", row.notification_type))
    })?;
    let target_role = AdminRole::parse(&row.target_role)
        .ok_or_else(|| AppError::internal(format!("unknown target role '{}'", row.target_role)))?;
    Ok(AdminNotification {
        id: row.id,
        notification_type,
        title: row.title,
        message: row.message,
        data: row.data,
        target_role,
        is_read: row.is_read,
        read_at: row.read_at,
        created_at: row.created_at,
    })
}

fn role_names(targets: &[AdminRole]) -> Vec<String> {
    targets.iter().map(|r| r.as_str().to_string()).collect()
}

pub async fn insert(
    pool: &Pool<Postgres>,
    new: NewNotification,
) -> Result<AdminNotification, AppError> {
    let row = sqlx::query_as::<_, NotificationRow>(&format!(
        r#"INSERT INTO admin_notifications (type, title, message, data, target_role)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING {COLUMNS}"#
    ))
    .bind(new.notification_type.as_str())
    .bind(&new.title)
    .bind(&new.message)
    .bind(&new.data)
    .bind(new.target_role.as_str())
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    to_notification(row)
}

/// Latest notifications targeted at any of `targets`, newest first.
pub async fn list_latest(
    pool: &Pool<Postgres>,
    targets: &[AdminRole],
    limit: i64,
) -> Result<Vec<AdminNotification>, AppError> {
    let rows = sqlx::query_as::<_, NotificationRow>(&format!(
        r#"SELECT {COLUMNS}
           FROM admin_notifications
           WHERE target_role = ANY($1)
           ORDER BY created_at DESC, id DESC
           LIMIT $2"#
    ))
    .bind(role_names(targets))
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    rows.into_iter().map(to_notification).collect()
}

pub async fn find_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<AdminNotification>, AppError> {
    sqlx::query_as::<_, NotificationRow>(&format!(
        "SELECT {COLUMNS} FROM admin_notifications WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?
    .map(to_notification)
    .transpose()
}

/// Mark one notification read. `read_at` is only set the first time.
pub async fn mark_read(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<AdminNotification>, AppError> {
    sqlx::query_as::<_, NotificationRow>(&format!(
        r#"UPDATE admin_notifications
           SET is_read = TRUE, read_at = COALESCE(read_at, NOW())
           WHERE id = $1
           RETURNING {COLUMNS}"#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?
    .map(to_notification)
    .transpose()
}

/// Mark every unread notification targeted at any of `targets`.
pub async fn mark_all_read(pool: &Pool<Postgres>, targets: &[AdminRole]) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"UPDATE admin_notifications
           SET is_read = TRUE, read_at = NOW()
           WHERE is_read = FALSE AND target_role = ANY($1)"#,
    )
    .bind(role_names(targets))
    .execute(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected())
}
