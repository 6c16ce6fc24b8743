pub mod access;
pub mod admin;
pub mod bookings;
pub mod me;
pub mod notifications;

use axum::{routing::{delete, get, post}, Router};
use crate::db::AppState;

/// Build the REST API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Roles
        .route("/api/me/roles", get(me::my_roles))
        .route("/api/users/role", post(me::assign_signup_role))
        .route("/api/access/{view}", get(access::check_access))
        // Bookings
        .route("/api/bookings", post(bookings::create_booking))
        .route("/api/bookings/mine", get(bookings::my_bookings))
        .route("/api/bookings/owner", get(bookings::owner_bookings))
        .route("/api/bookings/owner/stats", get(bookings::owner_stats))
        .route("/api/bookings/{id}/accept", post(bookings::accept_booking))
        .route("/api/bookings/{id}/decline", post(bookings::decline_booking))
        .route("/api/bookings/{id}/complete", post(bookings::complete_booking))
        // Notifications
        .route("/api/notifications/booking", post(notifications::dispatch_booking_notification))
        .route("/api/admin/notifications", get(admin::list_notifications))
        .route("/api/admin/notifications/read-all", post(admin::mark_all_notifications_read))
        .route("/api/admin/notifications/{id}/read", post(admin::mark_notification_read))
        // Admin console
        .route("/api/admin/stats", get(admin::platform_stats))
        .route("/api/admin/roles", get(admin::list_admin_roles).post(admin::add_admin_role))
        .route("/api/admin/roles/stats", get(admin::admin_role_stats))
        .route("/api/admin/roles/{id}", delete(admin::remove_admin_role))
}
