use std::sync::Arc;

use axum::{extract::State, Json};

use shared_types::{AppError, BookingNotificationRequest, DispatchResponse};

use crate::auth::extractors::AuthRequired;
use crate::booking::notify_admins;
use crate::error_convert::ValidateRequest;
use crate::store::{Mailer, Store};

/// POST /api/notifications/booking
///
/// Notify admins of a booking request. Fails only when the in-app
/// notification cannot be stored; email problems are logged.
#[utoipa::path(
    post,
    path = "/api/notifications/booking",
    request_body = BookingNotificationRequest,
    responses(
        (status = 200, description = "Notification recorded", body = DispatchResponse),
        (status = 401, description = "Not authenticated", body = AppError),
        (status = 422, description = "Invalid body", body = AppError),
        (status = 500, description = "Notification could not be stored", body = AppError)
    ),
    tag = "notifications"
)]
pub async fn dispatch_booking_notification(
    State(store): State<Arc<dyn Store>>,
    State(mailer): State<Option<Arc<dyn Mailer>>>,
    AuthRequired(session): AuthRequired,
    Json(body): Json<BookingNotificationRequest>,
) -> Result<Json<DispatchResponse>, AppError> {
    body.validate_request()?;

    let report = notify_admins(store.as_ref(), mailer, &body).await?;
    tracing::info!(
        notification_id = %report.notification.id,
        requested_by = %session.user_id,
        email = ?report.email,
        "booking notification dispatched"
    );

    Ok(Json(DispatchResponse {
        success: true,
        message: "Notification sent successfully".to_string(),
    }))
}
