use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "validation")]
use validator::Validate;

use crate::roles::{AdminRole, AdminRoleAssignment, AdminRoleResolution};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// One row of the role management table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminUserEntry {
    pub assignment: AdminRoleAssignment,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub label: String,
    /// Whether the viewer is offered the remove action for this row.
    pub can_remove: bool,
}

impl AdminUserEntry {
    pub fn new(
        assignment: AdminRoleAssignment,
        profile: Option<&Profile>,
        viewer: &AdminRoleResolution,
    ) -> Self {
        let can_remove = viewer.can_manage_roles() && assignment.admin_role != AdminRole::SuperAdmin;
        Self {
            label: assignment.admin_role.label().to_string(),
            full_name: profile.and_then(|p| p.full_name.clone()),
            email: profile.and_then(|p| p.email.clone()),
            assignment,
            can_remove,
        }
    }

    fn matches(&self, needle: &str) -> bool {
        let contains = |s: Option<&str>| s.is_some_and(|v| v.to_lowercase().contains(needle));
        contains(self.full_name.as_deref())
            || contains(self.email.as_deref())
            || contains(Some(self.assignment.admin_role.as_str()))
            || contains(Some(self.label.as_str()))
    }
}

/// Case-insensitive search over name, email and role. A blank query keeps
/// everything.
pub fn filter_admins(entries: Vec<AdminUserEntry>, query: Option<&str>) -> Vec<AdminUserEntry> {
    let needle = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();
    if needle.is_empty() {
        return entries;
    }
    entries.into_iter().filter(|e| e.matches(&needle)).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct AddAdminRequest {
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Please enter an email address"))
    )]
    pub email: String,
    pub admin_role: AdminRole,
    #[serde(default)]
    pub assigned_city: Option<String>,
}

impl AddAdminRequest {
    /// City to store: only kept for city admins, blank values dropped.
    pub fn effective_city(&self) -> Option<String> {
        if !self.admin_role.uses_assigned_city() {
            return None;
        }
        self.assigned_city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}

/// Values for an admin role insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAdminRole {
    pub user_id: Uuid,
    pub admin_role: AdminRole,
    pub assigned_city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RoleCount {
    pub role: AdminRole,
    pub label: String,
    pub description: String,
    pub count: usize,
}

/// Summary cards over the first four roles of the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminRoleStats {
    pub total: usize,
    pub by_role: Vec<RoleCount>,
}

impl AdminRoleStats {
    pub fn from_assignments(rows: &[AdminRoleAssignment]) -> Self {
        let by_role = AdminRole::ALL
            .iter()
            .take(4)
            .map(|role| RoleCount {
                role: *role,
                label: role.label().to_string(),
                description: role.description().to_string(),
                count: rows.iter().filter(|r| r.admin_role == *role).count(),
            })
            .collect();
        Self {
            total: rows.len(),
            by_role,
        }
    }
}

/// Platform-wide counts for the admin console overview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PlatformStats {
    pub total_listings: i64,
    /// Listings whose availability is `available`.
    pub active_listings: i64,
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub total_users: i64,
}
