//! Booking requests and the admin fan-out that follows them.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use shared_types::{
    AdminNotification, AdminRole, AppError, AppRole, AuxiliaryOutcome, Booking, BookingAction,
    BookingCreatedResponse, BookingNotificationRequest, BookingStatus, NewBooking,
    OwnerBookingStats, Session,
};

use crate::auth::roles::resolve_effective_roles;
use crate::mailgun::{booking_request_body, booking_request_subject};
use crate::store::{Mailer, Store};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("You cannot book your own room")]
    ForbiddenSelfBooking,

    #[error("Room not found")]
    RoomNotFound,

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Only the room owner or a platform admin can {0} this booking")]
    NotPermitted(&'static str),

    #[error("Cannot {action} a booking that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: &'static str,
    },

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::ForbiddenSelfBooking | BookingError::NotPermitted(_) => {
                AppError::forbidden(err.to_string())
            }
            BookingError::RoomNotFound | BookingError::BookingNotFound => {
                AppError::not_found(err.to_string())
            }
            BookingError::InvalidTransition { .. } => AppError::conflict(err.to_string()),
            BookingError::Store(inner) => inner,
        }
    }
}

/// What `notify_admins` did.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub notification: AdminNotification,
    pub email: AuxiliaryOutcome,
}

/// Create a pending booking for `room_id` on behalf of `tenant`.
///
/// The admin notification runs after the booking is written and cannot fail
/// it; its result is reported alongside the booking.
#[tracing::instrument(skip(store, mailer, tenant), fields(tenant_id = %tenant.user_id))]
pub async fn create_booking<S>(
    store: &S,
    mailer: Option<Arc<dyn Mailer>>,
    tenant: &Session,
    room_id: Uuid,
) -> Result<BookingCreatedResponse, BookingError>
where
    S: Store + ?Sized,
{
    let room = store
        .find_room(room_id)
        .await?
        .ok_or(BookingError::RoomNotFound)?;

    if room.owner_id == tenant.user_id {
        return Err(BookingError::ForbiddenSelfBooking);
    }

    let today = chrono::Utc::now().date_naive();
    let booking = store
        .insert_booking(NewBooking::for_room(&room, tenant.user_id, today))
        .await?;
    tracing::info!(booking_id = %booking.id, "booking created");

    let request = BookingNotificationRequest {
        booking_id: Some(booking.id),
        room_id: room.id,
        room_title: room.title.clone(),
        tenant_name: tenant_display_name(store, tenant).await,
        tenant_email: tenant.email.clone(),
        start_date: booking.start_date,
        monthly_rent: booking.monthly_rent,
    };

    let notification = match notify_admins(store, mailer, &request).await {
        Ok(_) => AuxiliaryOutcome::Delivered,
        Err(e) => {
            tracing::error!(booking_id = %booking.id, error = %e, "admin notification failed");
            AuxiliaryOutcome::Failed(e.message)
        }
    };

    Ok(BookingCreatedResponse {
        booking,
        notification,
    })
}

async fn tenant_display_name<S>(store: &S, tenant: &Session) -> String
where
    S: Store + ?Sized,
{
    match store.profiles_by_ids(&[tenant.user_id]).await {
        Ok(profiles) => profiles
            .into_iter()
            .find_map(|p| p.full_name.filter(|n| !n.trim().is_empty()))
            .unwrap_or_else(|| tenant.email.clone()),
        Err(e) => {
            tracing::warn!(error = %e, "tenant profile lookup failed, using email");
            tenant.email.clone()
        }
    }
}

/// Record an in-app notification for platform admins and email every admin
/// ranked platform admin or above.
///
/// The in-app insert is authoritative and its failure is returned. Email is
/// best effort: recipients are resolved here, delivery runs on a spawned
/// task so a slow mail channel never holds up the caller.
pub async fn notify_admins<S>(
    store: &S,
    mailer: Option<Arc<dyn Mailer>>,
    request: &BookingNotificationRequest,
) -> Result<DispatchReport, AppError>
where
    S: Store + ?Sized,
{
    let notification = store.insert_notification(request.to_notification()).await?;

    let email = match mailer {
        Some(mailer) => queue_admin_emails(store, mailer, request).await,
        None => AuxiliaryOutcome::Skipped,
    };

    Ok(DispatchReport {
        notification,
        email,
    })
}

/// Email recipients: profile emails of every admin at platform admin or above.
async fn admin_recipients<S>(store: &S) -> Result<Vec<String>, AppError>
where
    S: Store + ?Sized,
{
    let mut user_ids: Vec<Uuid> = store
        .list_admin_roles()
        .await?
        .iter()
        .filter_map(|row| row.parse())
        .filter(|row| row.admin_role.satisfies(AdminRole::PlatformAdmin))
        .map(|row| row.user_id)
        .collect();
    user_ids.sort();
    user_ids.dedup();

    let profiles = store.profiles_by_ids(&user_ids).await?;
    let mut emails: Vec<String> = profiles
        .into_iter()
        .filter_map(|p| p.email)
        .filter(|e| !e.trim().is_empty())
        .collect();
    emails.sort();
    emails.dedup();
    Ok(emails)
}

async fn queue_admin_emails<S>(
    store: &S,
    mailer: Arc<dyn Mailer>,
    request: &BookingNotificationRequest,
) -> AuxiliaryOutcome
where
    S: Store + ?Sized,
{
    let recipients = match admin_recipients(store).await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "admin recipient lookup failed");
            return AuxiliaryOutcome::Failed(e.message);
        }
    };
    if recipients.is_empty() {
        return AuxiliaryOutcome::Skipped;
    }

    let subject = booking_request_subject(request);
    let body = booking_request_body(request);
    let queued = recipients.len();

    // Fire-and-forget: failures are logged only
    tokio::spawn(async move {
        for to in &recipients {
            if let Err(e) = mailer.send(to, &subject, &body).await {
                tracing::error!(error = %e, to = %to, "failed to send booking email");
            }
        }
    });

    AuxiliaryOutcome::Queued(queued)
}

/// Apply an owner action to a booking.
///
/// Allowed for the room owner, an `admin` app role, or an admin ranked
/// platform admin or above.
pub async fn transition_booking<S>(
    store: &S,
    actor: &Session,
    booking_id: Uuid,
    action: BookingAction,
) -> Result<Booking, BookingError>
where
    S: Store + ?Sized,
{
    let booking = store
        .find_booking(booking_id)
        .await?
        .ok_or(BookingError::BookingNotFound)?;

    if booking.owner_id != actor.user_id {
        let roles = resolve_effective_roles(store, actor).await;
        let privileged = roles.app.role == AppRole::Admin
            || roles.admin.has_permission(AdminRole::PlatformAdmin);
        if !privileged {
            return Err(BookingError::NotPermitted(action.as_str()));
        }
    }

    let invalid = |status: BookingStatus| BookingError::InvalidTransition {
        action: action.as_str(),
        status: status.as_str(),
    };
    let next = booking
        .status
        .apply(action)
        .ok_or_else(|| invalid(booking.status))?;

    let updated = store
        .update_booking_status(booking.id, booking.status, next)
        .await?
        .ok_or_else(|| invalid(booking.status))?;

    tracing::info!(
        booking_id = %updated.id,
        from = booking.status.as_str(),
        to = updated.status.as_str(),
        "booking status changed"
    );
    Ok(updated)
}

pub async fn tenant_bookings<S>(store: &S, tenant: &Session) -> Result<Vec<Booking>, AppError>
where
    S: Store + ?Sized,
{
    store.bookings_for_tenant(tenant.user_id).await
}

pub async fn owner_bookings<S>(store: &S, owner: &Session) -> Result<Vec<Booking>, AppError>
where
    S: Store + ?Sized,
{
    store.bookings_for_owner(owner.user_id).await
}

pub async fn owner_stats<S>(store: &S, owner: &Session) -> Result<OwnerBookingStats, AppError>
where
    S: Store + ?Sized,
{
    let rooms = store.rooms_for_owner(owner.user_id).await?;
    let bookings = store.bookings_for_owner(owner.user_id).await?;
    Ok(OwnerBookingStats::compute(&rooms, &bookings))
}
