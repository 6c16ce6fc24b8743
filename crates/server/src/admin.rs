//! Admin console: role management and the notification feed.

use std::collections::HashMap;

use uuid::Uuid;

use shared_types::{
    filter_admins, AddAdminRequest, AdminNotification, AdminRole, AdminRoleAssignment,
    AdminRoleResolution, AdminRoleStats, AdminUserEntry, AppError, NewAdminRole,
    NotificationFeed, NotificationFeedResponse, PlatformStats, Profile,
};

use crate::error_convert::ValidateRequest;
use crate::store::Store;

fn require_role_manager(viewer: &AdminRoleResolution) -> Result<AdminRole, AppError> {
    match viewer.admin_role() {
        Some(role) if viewer.can_manage_roles() => Ok(role),
        _ => Err(AppError::forbidden(
            "Only super admins and platform admins can manage roles",
        )),
    }
}

async fn typed_admin_rows<S>(store: &S) -> Result<Vec<AdminRoleAssignment>, AppError>
where
    S: Store + ?Sized,
{
    let rows = store.list_admin_roles().await?;
    Ok(rows
        .iter()
        .filter_map(|row| {
            let parsed = row.parse();
            if parsed.is_none() {
                tracing::warn!(assignment_id = %row.id, role = %row.admin_role, "skipping unrecognized admin role");
            }
            parsed
        })
        .collect())
}

/// Every admin row joined with its profile, newest first, filtered by `query`.
pub async fn list_admins<S>(
    store: &S,
    viewer: &AdminRoleResolution,
    query: Option<&str>,
) -> Result<Vec<AdminUserEntry>, AppError>
where
    S: Store + ?Sized,
{
    let rows = typed_admin_rows(store).await?;
    let mut ids: Vec<Uuid> = rows.iter().map(|r| r.user_id).collect();
    ids.sort();
    ids.dedup();

    let profiles: HashMap<Uuid, Profile> = store
        .profiles_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let entries = rows
        .into_iter()
        .map(|row| {
            let profile = profiles.get(&row.user_id);
            AdminUserEntry::new(row, profile, viewer)
        })
        .collect();

    Ok(filter_admins(entries, query))
}

pub async fn admin_stats<S>(store: &S) -> Result<AdminRoleStats, AppError>
where
    S: Store + ?Sized,
{
    let rows = typed_admin_rows(store).await?;
    Ok(AdminRoleStats::from_assignments(&rows))
}

pub async fn platform_stats<S>(store: &S) -> Result<PlatformStats, AppError>
where
    S: Store + ?Sized,
{
    store.platform_stats().await
}

/// Grant an admin role to the profile registered under `req.email`.
pub async fn add_admin<S>(
    store: &S,
    granter: &AdminRoleResolution,
    req: AddAdminRequest,
) -> Result<AdminRoleAssignment, AppError>
where
    S: Store + ?Sized,
{
    let granter_role = require_role_manager(granter)?;
    req.validate_request()?;

    if !granter_role.satisfies(req.admin_role) {
        return Err(AppError::forbidden(format!(
            "A {} cannot grant the {} role",
            granter_role.label(),
            req.admin_role.label()
        )));
    }

    let profile = store
        .find_profile_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::not_found("No user found with that email address"))?;

    if !store.admin_roles_for(profile.id).await?.is_empty() {
        return Err(AppError::conflict("This user already has an admin role"));
    }

    let assignment = store
        .insert_admin_role(NewAdminRole {
            user_id: profile.id,
            admin_role: req.admin_role,
            assigned_city: req.effective_city(),
        })
        .await?;

    tracing::info!(
        assignment_id = %assignment.id,
        user_id = %assignment.user_id,
        role = %assignment.admin_role,
        granted_by = %granter_role,
        "admin role granted"
    );
    Ok(assignment)
}

/// Revoke an admin role. Super admin rows cannot be removed.
pub async fn remove_admin<S>(
    store: &S,
    granter: &AdminRoleResolution,
    assignment_id: Uuid,
) -> Result<(), AppError>
where
    S: Store + ?Sized,
{
    require_role_manager(granter)?;

    let row = store
        .find_admin_role(assignment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Admin role not found"))?;

    if AdminRole::parse(&row.admin_role) == Some(AdminRole::SuperAdmin) {
        return Err(AppError::forbidden("Super admin roles cannot be removed"));
    }

    if !store.delete_admin_role(assignment_id).await? {
        return Err(AppError::not_found("Admin role not found"));
    }

    tracing::info!(%assignment_id, role = %row.admin_role, "admin role removed");
    Ok(())
}

/// Target roles a viewer may read: everything at or below their own rank.
pub fn visible_targets(viewer: AdminRole) -> Vec<AdminRole> {
    AdminRole::ALL
        .into_iter()
        .filter(|target| viewer.satisfies(*target))
        .collect()
}

fn require_admin(viewer: &AdminRoleResolution) -> Result<AdminRole, AppError> {
    viewer
        .admin_role()
        .ok_or_else(|| AppError::forbidden("Admin access required"))
}

/// Latest notifications visible to the viewer, newest first.
pub async fn notification_feed<S>(
    store: &S,
    viewer: &AdminRoleResolution,
    limit: i64,
) -> Result<NotificationFeedResponse, AppError>
where
    S: Store + ?Sized,
{
    let role = require_admin(viewer)?;
    let limit = limit.max(1);
    let items = store
        .list_notifications(&visible_targets(role), limit)
        .await?;
    Ok(NotificationFeed::from_items(limit as usize, items).into())
}

pub async fn mark_notification_read<S>(
    store: &S,
    viewer: &AdminRoleResolution,
    id: Uuid,
) -> Result<AdminNotification, AppError>
where
    S: Store + ?Sized,
{
    let role = require_admin(viewer)?;
    let not_found = || AppError::not_found("Notification not found");

    let existing = store.find_notification(id).await?.ok_or_else(not_found)?;
    if !existing.visible_to(Some(role)) {
        return Err(not_found());
    }

    store.mark_notification_read(id).await?.ok_or_else(not_found)
}

/// Mark every visible unread notification. Zero unread rows is not an error.
pub async fn mark_all_notifications_read<S>(
    store: &S,
    viewer: &AdminRoleResolution,
) -> Result<u64, AppError>
where
    S: Store + ?Sized,
{
    let role = require_admin(viewer)?;
    let updated = store
        .mark_all_notifications_read(&visible_targets(role))
        .await?;
    tracing::debug!(updated, "notifications marked read");
    Ok(updated)
}
