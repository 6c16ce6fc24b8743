use axum::Router;
use shared_types::{
    // Errors
    AppError, AppErrorKind,
    // Roles
    AdminGrant, AdminPermissions, AdminRole, AdminRoleAssignment, AdminRoleResolution, AppRole,
    AppRoleResolution, AssignSignupRoleRequest, DashboardKind, EffectiveRoles, LookupOutcome,
    RolesResponse, UserRoleAssignment,
    // Access
    AccessDecision, GateState, ProtectedView, Session, ViewRequirement,
    // Bookings
    AuxiliaryOutcome, Booking, BookingAction, BookingCreatedResponse, BookingStatus,
    CreateBookingRequest, OwnerBookingStats, Room, RoomAvailability,
    // Notifications
    AdminNotification, BookingNotificationRequest, DispatchResponse, MarkAllReadResponse,
    NotificationFeedResponse, NotificationType,
    // Admin console
    AddAdminRequest, AdminRoleStats, AdminUserEntry, PlatformStats, Profile, RoleCount,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::db::AppState;
use crate::health;
use crate::rest;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        // Roles
        rest::me::my_roles,
        rest::me::assign_signup_role,
        rest::access::check_access,
        // Bookings
        rest::bookings::create_booking,
        rest::bookings::my_bookings,
        rest::bookings::owner_bookings,
        rest::bookings::owner_stats,
        rest::bookings::accept_booking,
        rest::bookings::decline_booking,
        rest::bookings::complete_booking,
        // Notifications
        rest::notifications::dispatch_booking_notification,
        rest::admin::list_notifications,
        rest::admin::mark_notification_read,
        rest::admin::mark_all_notifications_read,
        // Admin console
        rest::admin::platform_stats,
        rest::admin::list_admin_roles,
        rest::admin::admin_role_stats,
        rest::admin::add_admin_role,
        rest::admin::remove_admin_role,
    ),
    components(schemas(
        health::HealthResponse,
        AppError, AppErrorKind,
        AdminGrant, AdminPermissions, AdminRole, AdminRoleAssignment, AdminRoleResolution,
        AppRole, AppRoleResolution, AssignSignupRoleRequest, DashboardKind, EffectiveRoles,
        LookupOutcome, RolesResponse, UserRoleAssignment,
        AccessDecision, GateState, ProtectedView, Session, ViewRequirement,
        AuxiliaryOutcome, Booking, BookingAction, BookingCreatedResponse, BookingStatus,
        CreateBookingRequest, OwnerBookingStats, Room, RoomAvailability,
        AdminNotification, BookingNotificationRequest, DispatchResponse, MarkAllReadResponse,
        NotificationFeedResponse, NotificationType,
        AddAdminRequest, AdminRoleStats, AdminUserEntry, PlatformStats, Profile, RoleCount,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "roles", description = "Role resolution and view access"),
        (name = "bookings", description = "Room booking requests"),
        (name = "notifications", description = "Admin notifications"),
        (name = "admin", description = "Admin console and role management"),
    ),
    info(
        title = "Stazy API",
        description = "Room rental authorization and booking service",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

/// Build an Axum router that serves the API docs at `/docs`
/// and the REST API at `/api/*`.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .merge(rest::api_router())
        .route("/health", axum::routing::get(health::health_check))
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
}
