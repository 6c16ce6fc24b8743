use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared_types::{
    AddAdminRequest, AdminNotification, AdminRoleAssignment, AdminRoleStats, AdminUserEntry,
    AppError, MarkAllReadResponse, NotificationFeedResponse, PlatformStats,
};

use crate::admin;
use crate::auth::extractors::{AnyAdmin, RoleManager};
use crate::config;
use crate::store::Store;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AdminSearchParams {
    /// Case-insensitive match against name, email, and role.
    pub q: Option<String>,
}

// ---------------------------------------------------------------------------
// Role management
// ---------------------------------------------------------------------------

/// GET /api/admin/roles
#[utoipa::path(
    get,
    path = "/api/admin/roles",
    params(AdminSearchParams),
    responses(
        (status = 200, description = "Admin role holders, newest first", body = Vec<AdminUserEntry>),
        (status = 401, description = "Not authenticated", body = AppError),
        (status = 403, description = "Not an admin", body = AppError)
    ),
    tag = "admin"
)]
pub async fn list_admin_roles(
    State(store): State<Arc<dyn Store>>,
    auth: AnyAdmin,
    Query(params): Query<AdminSearchParams>,
) -> Result<Json<Vec<AdminUserEntry>>, AppError> {
    let entries = admin::list_admins(store.as_ref(), &auth.admin, params.q.as_deref()).await?;
    Ok(Json(entries))
}

/// GET /api/admin/roles/stats
#[utoipa::path(
    get,
    path = "/api/admin/roles/stats",
    responses(
        (status = 200, description = "Role counts", body = AdminRoleStats),
        (status = 403, description = "Not an admin", body = AppError)
    ),
    tag = "admin"
)]
pub async fn admin_role_stats(
    State(store): State<Arc<dyn Store>>,
    _auth: AnyAdmin,
) -> Result<Json<AdminRoleStats>, AppError> {
    Ok(Json(admin::admin_stats(store.as_ref()).await?))
}

/// GET /api/admin/stats
///
/// Listing, booking and user counts for the console overview.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Platform counts", body = PlatformStats),
        (status = 401, description = "Not authenticated", body = AppError),
        (status = 403, description = "Not an admin", body = AppError)
    ),
    tag = "admin"
)]
pub async fn platform_stats(
    State(store): State<Arc<dyn Store>>,
    _auth: AnyAdmin,
) -> Result<Json<PlatformStats>, AppError> {
    Ok(Json(admin::platform_stats(store.as_ref()).await?))
}

/// POST /api/admin/roles
#[utoipa::path(
    post,
    path = "/api/admin/roles",
    request_body = AddAdminRequest,
    responses(
        (status = 201, description = "Admin role granted", body = AdminRoleAssignment),
        (status = 403, description = "Cannot manage roles", body = AppError),
        (status = 404, description = "No user with that email", body = AppError),
        (status = 409, description = "User already has an admin role", body = AppError),
        (status = 422, description = "Invalid email", body = AppError)
    ),
    tag = "admin"
)]
pub async fn add_admin_role(
    State(store): State<Arc<dyn Store>>,
    auth: RoleManager,
    Json(body): Json<AddAdminRequest>,
) -> Result<(StatusCode, Json<AdminRoleAssignment>), AppError> {
    let assignment = admin::add_admin(store.as_ref(), &auth.admin, body).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// DELETE /api/admin/roles/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/roles/{id}",
    params(("id" = Uuid, Path, description = "Admin role assignment UUID")),
    responses(
        (status = 204, description = "Admin role removed"),
        (status = 403, description = "Cannot manage roles or target is a super admin", body = AppError),
        (status = 404, description = "Assignment not found", body = AppError)
    ),
    tag = "admin"
)]
pub async fn remove_admin_role(
    State(store): State<Arc<dyn Store>>,
    auth: RoleManager,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    admin::remove_admin(store.as_ref(), &auth.admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Notification feed
// ---------------------------------------------------------------------------

/// GET /api/admin/notifications
#[utoipa::path(
    get,
    path = "/api/admin/notifications",
    responses(
        (status = 200, description = "Latest visible notifications", body = NotificationFeedResponse),
        (status = 403, description = "Not an admin", body = AppError)
    ),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(store): State<Arc<dyn Store>>,
    auth: AnyAdmin,
) -> Result<Json<NotificationFeedResponse>, AppError> {
    let limit = config::notification_settings().feed_limit;
    Ok(Json(admin::notification_feed(store.as_ref(), &auth.admin, limit).await?))
}

/// POST /api/admin/notifications/{id}/read
#[utoipa::path(
    post,
    path = "/api/admin/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification UUID")),
    responses(
        (status = 200, description = "Notification marked read", body = AdminNotification),
        (status = 403, description = "Not an admin", body = AppError),
        (status = 404, description = "Notification not found", body = AppError)
    ),
    tag = "notifications"
)]
pub async fn mark_notification_read(
    State(store): State<Arc<dyn Store>>,
    auth: AnyAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminNotification>, AppError> {
    Ok(Json(admin::mark_notification_read(store.as_ref(), &auth.admin, id).await?))
}

/// POST /api/admin/notifications/read-all
#[utoipa::path(
    post,
    path = "/api/admin/notifications/read-all",
    responses(
        (status = 200, description = "Unread notifications marked read", body = MarkAllReadResponse),
        (status = 403, description = "Not an admin", body = AppError)
    ),
    tag = "notifications"
)]
pub async fn mark_all_notifications_read(
    State(store): State<Arc<dyn Store>>,
    auth: AnyAdmin,
) -> Result<Json<MarkAllReadResponse>, AppError> {
    let updated = admin::mark_all_notifications_read(store.as_ref(), &auth.admin).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
