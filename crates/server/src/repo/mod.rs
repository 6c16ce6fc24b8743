//! Postgres implementations of the store traits.

pub mod admin_role;
pub mod booking;
pub mod notification;
pub mod profile;
pub mod room;
pub mod stats;
pub mod user_role;

use async_trait::async_trait;
use shared_types::{
    AdminNotification, AdminRole, AdminRoleAssignment, AppError, AppRole, Booking, BookingStatus,
    NewAdminRole, NewBooking, NewNotification, PlatformStats, Profile, Room, UserRoleAssignment,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;
use crate::store::{
    BookingStore, HealthStore, NotificationStore, ProfileStore, RoleStore, RoomStore,
    StatsStore, StoredAdminRole, StoredUserRole,
};

/// Store backed by a Postgres pool.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl RoleStore for PgStore {
    async fn user_roles(&self, user_id: Uuid) -> Result<Vec<StoredUserRole>, AppError> {
        user_role::list_for_user(&self.pool, user_id).await
    }

    async fn claim_signup_role(
        &self,
        user_id: Uuid,
        role: AppRole,
    ) -> Result<Option<UserRoleAssignment>, AppError> {
        user_role::insert_first(&self.pool, user_id, role).await
    }

    async fn admin_roles_for(&self, user_id: Uuid) -> Result<Vec<StoredAdminRole>, AppError> {
        admin_role::list_for_user(&self.pool, user_id).await
    }

    async fn list_admin_roles(&self) -> Result<Vec<StoredAdminRole>, AppError> {
        admin_role::list_all(&self.pool).await
    }

    async fn find_admin_role(&self, id: Uuid) -> Result<Option<StoredAdminRole>, AppError> {
        admin_role::find_by_id(&self.pool, id).await
    }

    async fn insert_admin_role(&self, new: NewAdminRole) -> Result<AdminRoleAssignment, AppError> {
        admin_role::insert(&self.pool, new).await
    }

    async fn delete_admin_role(&self, id: Uuid) -> Result<bool, AppError> {
        admin_role::delete(&self.pool, id).await
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        profile::find_by_email(&self.pool, email).await
    }

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Profile>, AppError> {
        profile::list_by_ids(&self.pool, ids).await
    }
}

#[async_trait]
impl RoomStore for PgStore {
    async fn find_room(&self, id: Uuid) -> Result<Option<Room>, AppError> {
        room::find_by_id(&self.pool, id).await
    }

    async fn rooms_for_owner(&self, owner_id: Uuid) -> Result<Vec<Room>, AppError> {
        room::list_for_owner(&self.pool, owner_id).await
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn insert_booking(&self, new: NewBooking) -> Result<Booking, AppError> {
        booking::insert(&self.pool, new).await
    }

    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        booking::find_by_id(&self.pool, id).await
    }

    async fn bookings_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Booking>, AppError> {
        booking::list_for_tenant(&self.pool, tenant_id).await
    }

    async fn bookings_for_owner(&self, owner_id: Uuid) -> Result<Vec<Booking>, AppError> {
        booking::list_for_owner(&self.pool, owner_id).await
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, AppError> {
        booking::update_status(&self.pool, id, from, to).await
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn insert_notification(
        &self,
        new: NewNotification,
    ) -> Result<AdminNotification, AppError> {
        notification::insert(&self.pool, new).await
    }

    async fn list_notifications(
        &self,
        targets: &[AdminRole],
        limit: i64,
    ) -> Result<Vec<AdminNotification>, AppError> {
        notification::list_latest(&self.pool, targets, limit).await
    }

    async fn find_notification(&self, id: Uuid) -> Result<Option<AdminNotification>, AppError> {
        notification::find_by_id(&self.pool, id).await
    }

    async fn mark_notification_read(
        &self,
        id: Uuid,
    ) -> Result<Option<AdminNotification>, AppError> {
        notification::mark_read(&self.pool, id).await
    }

    async fn mark_all_notifications_read(&self, targets: &[AdminRole]) -> Result<u64, AppError> {
        notification::mark_all_read(&self.pool, targets).await
    }
}

#[async_trait]
impl StatsStore for PgStore {
    async fn platform_stats(&self) -> Result<PlatformStats, AppError> {
        stats::platform(&self.pool).await
    }
}

#[async_trait]
impl HealthStore for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(SqlxErrorExt::into_app_error)
    }
}
