use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Listing availability as stored in `rooms.availability`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RoomAvailability {
    #[default]
    Available,
    Occupied,
    Maintenance,
}

impl RoomAvailability {
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "occupied" => RoomAvailability::Occupied,
            "maintenance" => RoomAvailability::Maintenance,
            _ => RoomAvailability::Available,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomAvailability::Available => "available",
            RoomAvailability::Occupied => "occupied",
            RoomAvailability::Maintenance => "maintenance",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Room {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub location_city: String,
    pub rent_amount: f64,
    pub security_deposit: Option<f64>,
    pub availability: RoomAvailability,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    /// Counts toward owner earnings.
    pub fn is_earning(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Completed)
    }

    /// Status reached by applying `action`, or `None` if the move is illegal.
    pub fn apply(&self, action: BookingAction) -> Option<BookingStatus> {
        match (self, action) {
            (BookingStatus::Pending, BookingAction::Accept) => Some(BookingStatus::Confirmed),
            (BookingStatus::Pending, BookingAction::Decline) => Some(BookingStatus::Cancelled),
            (BookingStatus::Confirmed, BookingAction::Complete) => Some(BookingStatus::Completed),
            _ => None,
        }
    }
}

/// Owner action on a booking request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    Accept,
    Decline,
    Complete,
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Accept => "accept",
            BookingAction::Decline => "decline",
            BookingAction::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Booking {
    pub id: Uuid,
    pub room_id: Uuid,
    pub tenant_id: Uuid,
    pub owner_id: Uuid,
    pub monthly_rent: f64,
    pub security_deposit: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a booking insert. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub room_id: Uuid,
    pub tenant_id: Uuid,
    pub owner_id: Uuid,
    pub monthly_rent: f64,
    pub security_deposit: f64,
    pub start_date: NaiveDate,
}

impl NewBooking {
    /// Pending request by `tenant_id` for `room`, starting `start_date`.
    pub fn for_room(room: &Room, tenant_id: Uuid, start_date: NaiveDate) -> Self {
        Self {
            room_id: room.id,
            tenant_id,
            owner_id: room.owner_id,
            monthly_rent: room.rent_amount,
            security_deposit: room.security_deposit.unwrap_or(0.0),
            start_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateBookingRequest {
    pub room_id: Uuid,
}

/// Result of best-effort work attached to a primary operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum AuxiliaryOutcome {
    Delivered,
    /// Handed to a background task; carries the number of recipients.
    Queued(usize),
    Skipped,
    Failed(String),
}

impl AuxiliaryOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, AuxiliaryOutcome::Failed(_))
    }
}

/// Response body for `POST /api/bookings`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingCreatedResponse {
    pub booking: Booking,
    pub notification: AuxiliaryOutcome,
}

/// Owner dashboard figures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OwnerBookingStats {
    pub total: usize,
    pub pending: usize,
    pub earnings: f64,
    pub total_rooms: usize,
    pub available_rooms: usize,
}

impl OwnerBookingStats {
    /// Figures over an owner's rooms and the bookings made on them.
    pub fn compute(rooms: &[Room], bookings: &[Booking]) -> Self {
        let base = Self {
            total_rooms: rooms.len(),
            available_rooms: rooms
                .iter()
                .filter(|r| r.availability == RoomAvailability::Available)
                .count(),
            ..Self::default()
        };
        bookings.iter().fold(base, |mut stats, b| {
            stats.total += 1;
            if b.status == BookingStatus::Pending {
                stats.pending += 1;
            }
            if b.status.is_earning() {
                stats.earnings += b.monthly_rent;
            }
            stats
        })
    }
}
