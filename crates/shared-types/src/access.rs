use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::{AdminRole, EffectiveRoles};

/// The signed-in user a request or view acts for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
}

/// Pages that sit behind the access gate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum ProtectedView {
    Dashboard,
    OwnerDashboard,
    TenantDashboard,
    AdminConsole,
    RoleManagement,
    /// The add and remove controls on the role management page.
    ManageRoles,
    AdminNotifications,
}

impl ProtectedView {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dashboard" => Some(ProtectedView::Dashboard),
            "owner-dashboard" => Some(ProtectedView::OwnerDashboard),
            "tenant-dashboard" => Some(ProtectedView::TenantDashboard),
            "admin-console" => Some(ProtectedView::AdminConsole),
            "role-management" => Some(ProtectedView::RoleManagement),
            "manage-roles" => Some(ProtectedView::ManageRoles),
            "admin-notifications" => Some(ProtectedView::AdminNotifications),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtectedView::Dashboard => "dashboard",
            ProtectedView::OwnerDashboard => "owner-dashboard",
            ProtectedView::TenantDashboard => "tenant-dashboard",
            ProtectedView::AdminConsole => "admin-console",
            ProtectedView::RoleManagement => "role-management",
            ProtectedView::ManageRoles => "manage-roles",
            ProtectedView::AdminNotifications => "admin-notifications",
        }
    }

    pub fn requirement(&self) -> ViewRequirement {
        match self {
            ProtectedView::Dashboard | ProtectedView::TenantDashboard => {
                ViewRequirement::Authenticated
            }
            ProtectedView::OwnerDashboard => ViewRequirement::PropertyOwner,
            ProtectedView::AdminConsole
            | ProtectedView::RoleManagement
            | ProtectedView::AdminNotifications => ViewRequirement::AnyAdmin,
            ProtectedView::ManageRoles => ViewRequirement::AdminRank(AdminRole::PlatformAdmin),
        }
    }
}

/// What a session must hold to see a view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "kind", content = "role", rename_all = "snake_case")]
pub enum ViewRequirement {
    Authenticated,
    PropertyOwner,
    AnyAdmin,
    AdminRank(AdminRole),
}

impl ViewRequirement {
    pub fn is_met(&self, roles: &EffectiveRoles) -> bool {
        match self {
            ViewRequirement::Authenticated => true,
            ViewRequirement::PropertyOwner => roles.app.role.is_property_owner(),
            ViewRequirement::AnyAdmin => roles.admin.is_admin(),
            ViewRequirement::AdminRank(required) => roles.admin.has_permission(*required),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// Roles are still being looked up. Nothing protected is shown.
    Resolving,
    Allowed,
    RedirectUnauthenticated,
    RedirectUnauthorized,
}

impl GateState {
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            GateState::RedirectUnauthenticated => Some("/auth"),
            GateState::RedirectUnauthorized => Some("/dashboard"),
            GateState::Resolving | GateState::Allowed => None,
        }
    }

    pub fn shows_content(&self) -> bool {
        *self == GateState::Allowed
    }
}

/// Decision for a view given what is known so far. `roles` is `None` while
/// the lookup for a present session is still in flight.
pub fn decide(
    view: ProtectedView,
    session: Option<&Session>,
    roles: Option<&EffectiveRoles>,
) -> GateState {
    match (session, roles) {
        (None, _) => GateState::RedirectUnauthenticated,
        (Some(_), None) => GateState::Resolving,
        (Some(_), Some(roles)) if view.requirement().is_met(roles) => GateState::Allowed,
        (Some(_), Some(_)) => GateState::RedirectUnauthorized,
    }
}

/// Per-view gate that tracks the session it is resolving for.
///
/// Each session change bumps the generation. A lookup that completes with an
/// older generation was superseded and its result is dropped, so a slow
/// lookup for a previous user can never unlock the view for the current one.
#[derive(Debug, Clone)]
pub struct AccessGate {
    view: ProtectedView,
    session: Option<Session>,
    generation: u64,
    state: GateState,
}

impl AccessGate {
    pub fn new(view: ProtectedView) -> Self {
        Self {
            view,
            session: None,
            generation: 0,
            state: GateState::Resolving,
        }
    }

    pub fn view(&self) -> ProtectedView {
        self.view
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Restart resolution for a new session. A signed-out session redirects
    /// straight away since there is nothing to look up.
    pub fn session_changed(&mut self, session: Option<Session>) -> u64 {
        self.generation += 1;
        self.state = decide(self.view, session.as_ref(), None);
        self.session = session;
        self.generation
    }

    /// Apply a finished role lookup. Returns `false` when the result was
    /// stale and ignored.
    pub fn complete(&mut self, generation: u64, roles: &EffectiveRoles) -> bool {
        if generation != self.generation || self.state != GateState::Resolving {
            return false;
        }
        self.state = decide(self.view, self.session.as_ref(), Some(roles));
        true
    }
}

/// Response body for `GET /api/access/{view}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AccessDecision {
    pub view: ProtectedView,
    pub state: GateState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl AccessDecision {
    pub fn new(view: ProtectedView, state: GateState) -> Self {
        Self {
            view,
            state,
            redirect_to: state.redirect_path().map(str::to_string),
        }
    }
}
