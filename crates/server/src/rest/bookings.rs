use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_types::{
    AppError, Booking, BookingAction, BookingCreatedResponse, CreateBookingRequest,
    OwnerBookingStats,
};

use crate::auth::extractors::AuthRequired;
use crate::booking;
use crate::store::{Mailer, Store};

/// POST /api/bookings
///
/// Request a room. The booking is created even if the admin notification
/// fails; the response reports the notification outcome separately.
#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingCreatedResponse),
        (status = 401, description = "Not authenticated", body = AppError),
        (status = 403, description = "Own room", body = AppError),
        (status = 404, description = "Room not found", body = AppError)
    ),
    tag = "bookings"
)]
pub async fn create_booking(
    State(store): State<Arc<dyn Store>>,
    State(mailer): State<Option<Arc<dyn Mailer>>>,
    AuthRequired(session): AuthRequired,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingCreatedResponse>), AppError> {
    let created =
        booking::create_booking(store.as_ref(), mailer, &session, body.room_id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/bookings/mine
#[utoipa::path(
    get,
    path = "/api/bookings/mine",
    responses(
        (status = 200, description = "Caller's booking requests", body = Vec<Booking>),
        (status = 401, description = "Not authenticated", body = AppError)
    ),
    tag = "bookings"
)]
pub async fn my_bookings(
    State(store): State<Arc<dyn Store>>,
    AuthRequired(session): AuthRequired,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(booking::tenant_bookings(store.as_ref(), &session).await?))
}

/// GET /api/bookings/owner
#[utoipa::path(
    get,
    path = "/api/bookings/owner",
    responses(
        (status = 200, description = "Requests on the caller's rooms", body = Vec<Booking>),
        (status = 401, description = "Not authenticated", body = AppError)
    ),
    tag = "bookings"
)]
pub async fn owner_bookings(
    State(store): State<Arc<dyn Store>>,
    AuthRequired(session): AuthRequired,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(booking::owner_bookings(store.as_ref(), &session).await?))
}

/// GET /api/bookings/owner/stats
#[utoipa::path(
    get,
    path = "/api/bookings/owner/stats",
    responses(
        (status = 200, description = "Owner dashboard figures", body = OwnerBookingStats),
        (status = 401, description = "Not authenticated", body = AppError)
    ),
    tag = "bookings"
)]
pub async fn owner_stats(
    State(store): State<Arc<dyn Store>>,
    AuthRequired(session): AuthRequired,
) -> Result<Json<OwnerBookingStats>, AppError> {
    Ok(Json(booking::owner_stats(store.as_ref(), &session).await?))
}

async fn apply(
    store: Arc<dyn Store>,
    session: shared_types::Session,
    id: Uuid,
    action: BookingAction,
) -> Result<Json<Booking>, AppError> {
    let updated = booking::transition_booking(store.as_ref(), &session, id, action).await?;
    Ok(Json(updated))
}

/// POST /api/bookings/{id}/accept
#[utoipa::path(
    post,
    path = "/api/bookings/{id}/accept",
    params(("id" = Uuid, Path, description = "Booking UUID")),
    responses(
        (status = 200, description = "Booking confirmed", body = Booking),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Booking not found", body = AppError),
        (status = 409, description = "Not pending", body = AppError)
    ),
    tag = "bookings"
)]
pub async fn accept_booking(
    State(store): State<Arc<dyn Store>>,
    AuthRequired(session): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    apply(store, session, id, BookingAction::Accept).await
}

/// POST /api/bookings/{id}/decline
#[utoipa::path(
    post,
    path = "/api/bookings/{id}/decline",
    params(("id" = Uuid, Path, description = "Booking UUID")),
    responses(
        (status = 200, description = "Booking cancelled", body = Booking),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Booking not found", body = AppError),
        (status = 409, description = "Not pending", body = AppError)
    ),
    tag = "bookings"
)]
pub async fn decline_booking(
    State(store): State<Arc<dyn Store>>,
    AuthRequired(session): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    apply(store, session, id, BookingAction::Decline).await
}

/// POST /api/bookings/{id}/complete
#[utoipa::path(
    post,
    path = "/api/bookings/{id}/complete",
    params(("id" = Uuid, Path, description = "Booking UUID")),
    responses(
        (status = 200, description = "Booking completed", body = Booking),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Booking not found", body = AppError),
        (status = 409, description = "Not confirmed", body = AppError)
    ),
    tag = "bookings"
)]
pub async fn complete_booking(
    State(store): State<Arc<dyn Store>>,
    AuthRequired(session): AuthRequired,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    apply(store, session, id, BookingAction::Complete).await
}
