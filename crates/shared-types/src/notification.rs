use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "validation")]
use validator::Validate;

use crate::roles::{has_permission, AdminRole};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    BookingRequest,
    ListingVerification,
    PaymentAlert,
    UserReport,
    ServiceRequest,
    SystemAlert,
}

impl NotificationType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "booking_request" => Some(NotificationType::BookingRequest),
            "listing_verification" => Some(NotificationType::ListingVerification),
            "payment_alert" => Some(NotificationType::PaymentAlert),
            "user_report" => Some(NotificationType::UserReport),
            "service_request" => Some(NotificationType::ServiceRequest),
            "system_alert" => Some(NotificationType::SystemAlert),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::BookingRequest => "booking_request",
            NotificationType::ListingVerification => "listing_verification",
            NotificationType::PaymentAlert => "payment_alert",
            NotificationType::UserReport => "user_report",
            NotificationType::ServiceRequest => "service_request",
            NotificationType::SystemAlert => "system_alert",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminNotification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    /// Lowest admin role allowed to see this notification.
    pub target_role: AdminRole,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AdminNotification {
    pub fn visible_to(&self, viewer: Option<AdminRole>) -> bool {
        has_permission(viewer, self.target_role)
    }
}

/// Values for a notification insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub target_role: AdminRole,
}

/// Body of the booking notification dispatch function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
#[serde(rename_all = "camelCase")]
pub struct BookingNotificationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    pub room_id: Uuid,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Room title is required"))
    )]
    pub room_title: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Tenant name is required"))
    )]
    pub tenant_name: String,
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Tenant email must be a valid email address"))
    )]
    pub tenant_email: String,
    pub start_date: NaiveDate,
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 0.0, message = "Monthly rent must be non-negative"))
    )]
    pub monthly_rent: f64,
}

impl BookingNotificationRequest {
    pub fn title(&self) -> &'static str {
        "New Booking Request"
    }

    pub fn message(&self) -> String {
        format!(
            "{} has requested to book \"{}\" starting {}",
            self.tenant_name, self.room_title, self.start_date
        )
    }

    /// Payload stored in `admin_notifications.data`.
    pub fn data(&self) -> serde_json::Value {
        serde_json::json!({
            "booking_id": self.booking_id,
            "room_id": self.room_id,
            "room_title": self.room_title,
            "tenant_name": self.tenant_name,
            "tenant_email": self.tenant_email,
            "start_date": self.start_date,
            "monthly_rent": self.monthly_rent,
        })
    }

    pub fn to_notification(&self) -> NewNotification {
        NewNotification {
            notification_type: NotificationType::BookingRequest,
            title: self.title().to_string(),
            message: self.message(),
            data: self.data(),
            target_role: AdminRole::PlatformAdmin,
        }
    }
}

/// Response body of the dispatch function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DispatchResponse {
    pub success: bool,
    pub message: String,
}

/// Admin feed with realtime merging.
///
/// Items stay sorted newest first and capped at `limit`. Merging is keyed by
/// id, so a duplicate or late delivery converges on the same list, and a row
/// that was read locally stays read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationFeed {
    items: Vec<AdminNotification>,
    limit: usize,
}

impl NotificationFeed {
    pub fn new(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            limit,
        }
    }

    pub fn from_items(limit: usize, items: Vec<AdminNotification>) -> Self {
        let mut feed = Self::new(limit);
        for item in items {
            feed.merge(item);
        }
        feed
    }

    pub fn items(&self) -> &[AdminNotification] {
        &self.items
    }

    pub fn into_items(self) -> Vec<AdminNotification> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }

    pub fn merge(&mut self, incoming: AdminNotification) {
        match self.items.iter_mut().find(|n| n.id == incoming.id) {
            Some(existing) => {
                let was_read = existing.is_read;
                let read_at = existing.read_at;
                *existing = incoming;
                if was_read {
                    existing.is_read = true;
                    existing.read_at = read_at.or(existing.read_at);
                }
            }
            None => self.items.push(incoming),
        }
        self.items
            .sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        self.items.truncate(self.limit);
    }

    /// Returns `true` if the item exists. An already-read item keeps its
    /// original `read_at`.
    pub fn mark_read(&mut self, id: Uuid, at: DateTime<Utc>) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(item) => {
                if !item.is_read {
                    item.is_read = true;
                    item.read_at = Some(at);
                }
                true
            }
            None => false,
        }
    }

    /// Marks every unread item, returning how many changed.
    pub fn mark_all_read(&mut self, at: DateTime<Utc>) -> usize {
        let mut changed = 0;
        for item in self.items.iter_mut().filter(|n| !n.is_read) {
            item.is_read = true;
            item.read_at = Some(at);
            changed += 1;
        }
        changed
    }
}

/// Response body for `GET /api/admin/notifications`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotificationFeedResponse {
    pub notifications: Vec<AdminNotification>,
    pub unread_count: usize,
}

impl From<NotificationFeed> for NotificationFeedResponse {
    fn from(feed: NotificationFeed) -> Self {
        let unread_count = feed.unread_count();
        Self {
            notifications: feed.into_items(),
            unread_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MarkAllReadResponse {
    pub updated: u64,
}
