//! Persistence seams.
//!
//! Every service takes one of these traits instead of a pool so the
//! authorization rules can run against Postgres in production and an
//! in-memory store in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use shared_types::{
    AdminNotification, AdminRole, AdminRoleAssignment, AppError, AppRole, Booking, BookingStatus,
    NewAdminRole, NewBooking, NewNotification, PlatformStats, Profile, Room, UserRoleAssignment,
};

/// A `user_roles` row as stored. The role is left as text so the resolver
/// decides what an unrecognized value means.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredUserRole {
    pub user_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// An `admin_roles` row as stored.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredAdminRole {
    pub id: Uuid,
    pub user_id: Uuid,
    pub admin_role: String,
    pub assigned_city: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StoredAdminRole {
    /// Typed view of the row, `None` when the role string is unknown.
    pub fn parse(&self) -> Option<AdminRoleAssignment> {
        AdminRole::parse(&self.admin_role).map(|admin_role| AdminRoleAssignment {
            id: self.id,
            user_id: self.user_id,
            admin_role,
            assigned_city: self.assigned_city.clone(),
            created_at: self.created_at,
        })
    }
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Application role rows for a user, oldest first.
    async fn user_roles(&self, user_id: Uuid) -> Result<Vec<StoredUserRole>, AppError>;

    /// Record the signup role unless the user already holds a role row.
    /// Returns `None` when a row exists; concurrent claims for one user
    /// leave exactly one row.
    async fn claim_signup_role(
        &self,
        user_id: Uuid,
        role: AppRole,
    ) -> Result<Option<UserRoleAssignment>, AppError>;

    /// Admin rows held by one user.
    async fn admin_roles_for(&self, user_id: Uuid) -> Result<Vec<StoredAdminRole>, AppError>;

    /// Every admin row, newest first.
    async fn list_admin_roles(&self) -> Result<Vec<StoredAdminRole>, AppError>;

    async fn find_admin_role(&self, id: Uuid) -> Result<Option<StoredAdminRole>, AppError>;

    async fn insert_admin_role(&self, new: NewAdminRole) -> Result<AdminRoleAssignment, AppError>;

    /// Returns `false` when no row matched.
    async fn delete_admin_role(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, AppError>;

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>, AppError>;
}

#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn find_room(&self, id: Uuid) -> Result<Option<Room>, AppError>;

    /// Rooms listed by an owner, newest first.
    async fn rooms_for_owner(&self, owner_id: Uuid) -> Result<Vec<Room>, AppError>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert_booking(&self, new: NewBooking) -> Result<Booking, AppError>;

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, AppError>;

    /// Bookings requested by a tenant, newest first.
    async fn bookings_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Booking>, AppError>;

    /// Bookings on an owner's rooms, newest first.
    async fn bookings_for_owner(&self, owner_id: Uuid) -> Result<Vec<Booking>, AppError>;

    /// Move a booking from `from` to `to`. Returns `None` when the booking is
    /// no longer in `from`.
    async fn update_booking_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, AppError>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, new: NewNotification)
        -> Result<AdminNotification, AppError>;

    /// Latest notifications whose target role is in `targets`, newest first.
    async fn list_notifications(
        &self,
        targets: &[AdminRole],
        limit: i64,
    ) -> Result<Vec<AdminNotification>, AppError>;

    async fn find_notification(&self, id: Uuid) -> Result<Option<AdminNotification>, AppError>;

    /// Mark one notification read. An already-read row keeps its `read_at`.
    async fn mark_notification_read(&self, id: Uuid)
        -> Result<Option<AdminNotification>, AppError>;

    /// Mark every unread notification whose target role is in `targets`.
    /// Returns the number of rows changed.
    async fn mark_all_notifications_read(&self, targets: &[AdminRole]) -> Result<u64, AppError>;
}

#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn platform_stats(&self) -> Result<PlatformStats, AppError>;
}

#[async_trait]
pub trait HealthStore: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;
}

/// Everything the HTTP layer needs from persistence.
pub trait Store:
    RoleStore + ProfileStore + RoomStore + BookingStore + NotificationStore + StatsStore + HealthStore
{
}

impl<T> Store for T where
    T: RoleStore
        + ProfileStore
        + RoomStore
        + BookingStore
        + NotificationStore
        + StatsStore
        + HealthStore
{
}

/// Outbound email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError>;
}
