use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Application-level role stored in `user_roles`.
///
/// - `Tenant`: default for every account; can request bookings.
/// - `PropertyOwner`: can list rooms and act on booking requests.
/// - `Admin`: legacy marketplace admin; treated as an owner for dashboards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    Admin,
    PropertyOwner,
    #[default]
    Tenant,
}

impl AppRole {
    /// Parse the stored role string. Unknown values return `None` so callers
    /// can tell a corrupt row apart from a missing one.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(AppRole::Admin),
            "property_owner" => Some(AppRole::PropertyOwner),
            "tenant" => Some(AppRole::Tenant),
            _ => None,
        }
    }

    /// Lowercase string for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppRole::Admin => "admin",
            AppRole::PropertyOwner => "property_owner",
            AppRole::Tenant => "tenant",
        }
    }

    pub fn is_property_owner(&self) -> bool {
        matches!(self, AppRole::PropertyOwner | AppRole::Admin)
    }

    pub fn is_tenant(&self) -> bool {
        *self == AppRole::Tenant
    }

    pub fn is_admin(&self) -> bool {
        *self == AppRole::Admin
    }

    /// Role granted at signup. Only tenant and property owner are selectable;
    /// anything else falls back to tenant.
    pub fn signup_choice(requested: Option<AppRole>) -> AppRole {
        match requested {
            Some(AppRole::PropertyOwner) => AppRole::PropertyOwner,
            _ => AppRole::Tenant,
        }
    }
}

impl fmt::Display for AppRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranked admin role stored in `admin_roles`.
///
/// The hierarchy is strictly linear: a role satisfies every requirement at or
/// below its own rank. `FinanceAdmin` therefore holds every capability of
/// `CommunityModerator` even though the names suggest unrelated domains.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    PlatformAdmin,
    FinanceAdmin,
    VerificationAdmin,
    CityAdmin,
    ServiceMarketplaceAdmin,
    CommunityModerator,
    SupportAdmin,
}

impl AdminRole {
    /// Every admin role, highest rank first.
    pub const ALL: [AdminRole; 8] = [
        AdminRole::SuperAdmin,
        AdminRole::PlatformAdmin,
        AdminRole::FinanceAdmin,
        AdminRole::VerificationAdmin,
        AdminRole::CityAdmin,
        AdminRole::ServiceMarketplaceAdmin,
        AdminRole::CommunityModerator,
        AdminRole::SupportAdmin,
    ];

    /// Numeric rank, higher is more privileged.
    pub fn rank(&self) -> u8 {
        match self {
            AdminRole::SuperAdmin => 8,
            AdminRole::PlatformAdmin => 7,
            AdminRole::FinanceAdmin => 6,
            AdminRole::VerificationAdmin => 5,
            AdminRole::CityAdmin => 4,
            AdminRole::ServiceMarketplaceAdmin => 3,
            AdminRole::CommunityModerator => 2,
            AdminRole::SupportAdmin => 1,
        }
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        AdminRole::ALL.into_iter().find(|r| r.rank() == rank)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "super_admin" => Some(AdminRole::SuperAdmin),
            "platform_admin" => Some(AdminRole::PlatformAdmin),
            "finance_admin" => Some(AdminRole::FinanceAdmin),
            "verification_admin" => Some(AdminRole::VerificationAdmin),
            "city_admin" => Some(AdminRole::CityAdmin),
            "service_marketplace_admin" => Some(AdminRole::ServiceMarketplaceAdmin),
            "community_moderator" => Some(AdminRole::CommunityModerator),
            "support_admin" => Some(AdminRole::SupportAdmin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::PlatformAdmin => "platform_admin",
            AdminRole::FinanceAdmin => "finance_admin",
            AdminRole::VerificationAdmin => "verification_admin",
            AdminRole::CityAdmin => "city_admin",
            AdminRole::ServiceMarketplaceAdmin => "service_marketplace_admin",
            AdminRole::CommunityModerator => "community_moderator",
            AdminRole::SupportAdmin => "support_admin",
        }
    }

    /// Short label shown in the role management console.
    pub fn label(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "Super Admin",
            AdminRole::PlatformAdmin => "Platform Admin",
            AdminRole::FinanceAdmin => "Finance Admin",
            AdminRole::VerificationAdmin => "Verification Admin",
            AdminRole::CityAdmin => "City Admin",
            AdminRole::ServiceMarketplaceAdmin => "Service Admin",
            AdminRole::CommunityModerator => "Community Mod",
            AdminRole::SupportAdmin => "Support Admin",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "Full platform access",
            AdminRole::PlatformAdmin => "Operations management",
            AdminRole::FinanceAdmin => "Payments & invoicing",
            AdminRole::VerificationAdmin => "Trust & safety",
            AdminRole::CityAdmin => "Regional management",
            AdminRole::ServiceMarketplaceAdmin => "Vendor onboarding",
            AdminRole::CommunityModerator => "Content moderation",
            AdminRole::SupportAdmin => "User tickets",
        }
    }

    /// Whether `assigned_city` carries meaning for this role.
    pub fn uses_assigned_city(&self) -> bool {
        *self == AdminRole::CityAdmin
    }

    /// Returns true if this role satisfies the `required` role.
    pub fn satisfies(&self, required: AdminRole) -> bool {
        self.rank() >= required.rank()
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an effective admin role satisfies `required`. No role never does.
pub fn has_permission(effective: Option<AdminRole>, required: AdminRole) -> bool {
    effective.map(|role| role.satisfies(required)).unwrap_or(false)
}

/// A row of `user_roles`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserRoleAssignment {
    pub user_id: Uuid,
    pub role: AppRole,
    pub created_at: DateTime<Utc>,
}

/// A row of `admin_roles`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminRoleAssignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub admin_role: AdminRole,
    pub assigned_city: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Pick the effective admin row: highest rank, then earliest `created_at`,
/// then smallest id.
pub fn select_effective_admin(rows: &[AdminRoleAssignment]) -> Option<&AdminRoleAssignment> {
    rows.iter().min_by(|a, b| {
        b.admin_role
            .rank()
            .cmp(&a.admin_role.rank())
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    })
}

/// Pick the effective application role row: the earliest one.
pub fn select_app_role(rows: &[UserRoleAssignment]) -> Option<&UserRoleAssignment> {
    rows.iter().min_by_key(|r| r.created_at)
}

/// How a role lookup concluded. `NoRows` and `LookupFailed` currently map to
/// the same defaults but are kept apart so the policy can diverge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum LookupOutcome {
    Found,
    NoRows,
    LookupFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppRoleResolution {
    pub role: AppRole,
    pub outcome: LookupOutcome,
}

impl AppRoleResolution {
    pub fn found(role: AppRole) -> Self {
        Self {
            role,
            outcome: LookupOutcome::Found,
        }
    }

    /// Safe default used for both missing rows and failed lookups.
    pub fn defaulted(outcome: LookupOutcome) -> Self {
        Self {
            role: AppRole::Tenant,
            outcome,
        }
    }
}

/// The admin row that won resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminGrant {
    pub assignment_id: Uuid,
    pub role: AdminRole,
    pub assigned_city: Option<String>,
}

impl From<&AdminRoleAssignment> for AdminGrant {
    fn from(row: &AdminRoleAssignment) -> Self {
        Self {
            assignment_id: row.id,
            role: row.admin_role,
            assigned_city: row.assigned_city.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminRoleResolution {
    pub grant: Option<AdminGrant>,
    pub outcome: LookupOutcome,
}

impl AdminRoleResolution {
    pub fn granted(grant: AdminGrant) -> Self {
        Self {
            grant: Some(grant),
            outcome: LookupOutcome::Found,
        }
    }

    /// Not an admin. Errors land here too: a failed lookup never grants.
    pub fn none(outcome: LookupOutcome) -> Self {
        Self {
            grant: None,
            outcome,
        }
    }

    pub fn admin_role(&self) -> Option<AdminRole> {
        self.grant.as_ref().map(|g| g.role)
    }

    pub fn assigned_city(&self) -> Option<&str> {
        self.grant.as_ref().and_then(|g| g.assigned_city.as_deref())
    }

    pub fn is_admin(&self) -> bool {
        self.grant.is_some()
    }

    pub fn has_permission(&self, required: AdminRole) -> bool {
        has_permission(self.admin_role(), required)
    }

    /// Exact match on the top rank.
    pub fn is_super_admin(&self) -> bool {
        self.admin_role() == Some(AdminRole::SuperAdmin)
    }

    pub fn is_platform_admin(&self) -> bool {
        self.has_permission(AdminRole::PlatformAdmin)
    }

    pub fn is_finance_admin(&self) -> bool {
        self.has_permission(AdminRole::FinanceAdmin)
    }

    pub fn is_verification_admin(&self) -> bool {
        self.has_permission(AdminRole::VerificationAdmin)
    }

    pub fn is_city_admin(&self) -> bool {
        self.has_permission(AdminRole::CityAdmin)
    }

    pub fn is_service_marketplace_admin(&self) -> bool {
        self.has_permission(AdminRole::ServiceMarketplaceAdmin)
    }

    pub fn is_community_moderator(&self) -> bool {
        self.has_permission(AdminRole::CommunityModerator)
    }

    pub fn is_support_admin(&self) -> bool {
        self.has_permission(AdminRole::SupportAdmin)
    }

    /// Adding and removing admins takes platform admin or above.
    pub fn can_manage_roles(&self) -> bool {
        self.is_platform_admin()
    }

    pub fn permissions(&self) -> AdminPermissions {
        AdminPermissions {
            is_super_admin: self.is_super_admin(),
            is_platform_admin: self.is_platform_admin(),
            is_finance_admin: self.is_finance_admin(),
            is_verification_admin: self.is_verification_admin(),
            is_city_admin: self.is_city_admin(),
            is_service_marketplace_admin: self.is_service_marketplace_admin(),
            is_community_moderator: self.is_community_moderator(),
            is_support_admin: self.is_support_admin(),
        }
    }
}

/// Flattened convenience predicates for clients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminPermissions {
    pub is_super_admin: bool,
    pub is_platform_admin: bool,
    pub is_finance_admin: bool,
    pub is_verification_admin: bool,
    pub is_city_admin: bool,
    pub is_service_marketplace_admin: bool,
    pub is_community_moderator: bool,
    pub is_support_admin: bool,
}

/// Both resolutions for one session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EffectiveRoles {
    pub app: AppRoleResolution,
    pub admin: AdminRoleResolution,
}

/// Which dashboard `/dashboard` renders for a role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DashboardKind {
    Owner,
    Tenant,
}

pub fn dashboard_for(role: AppRole) -> DashboardKind {
    if role.is_property_owner() {
        DashboardKind::Owner
    } else {
        DashboardKind::Tenant
    }
}

/// Response body for `GET /api/me/roles`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RolesResponse {
    pub user_id: Uuid,
    pub app_role: AppRole,
    pub is_property_owner: bool,
    pub is_tenant: bool,
    /// The application role is `admin`.
    pub is_admin: bool,
    /// At least one admin role row resolved.
    pub has_admin_role: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_role: Option<AdminRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_city: Option<String>,
    pub permissions: AdminPermissions,
    pub dashboard: DashboardKind,
}

impl RolesResponse {
    pub fn from_effective(user_id: Uuid, roles: &EffectiveRoles) -> Self {
        let app_role = roles.app.role;
        Self {
            user_id,
            app_role,
            is_property_owner: app_role.is_property_owner(),
            is_tenant: app_role.is_tenant(),
            is_admin: app_role.is_admin(),
            has_admin_role: roles.admin.is_admin(),
            admin_role: roles.admin.admin_role(),
            assigned_city: roles.admin.assigned_city().map(str::to_string),
            permissions: roles.admin.permissions(),
            dashboard: dashboard_for(app_role),
        }
    }
}

/// Request body for assigning the signup role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AssignSignupRoleRequest {
    #[serde(default)]
    pub role: Option<AppRole>,
}
