use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a booking. `Temporary` is the state of every public
/// submission; only the explicit confirm operation may move a booking to
/// `Confirmed` so that account activation and notification always fire
/// together. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Temporary,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Temporary => "temporary",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "temporary" => Some(BookingStatus::Temporary),
            "confirmed" => Some(BookingStatus::Confirmed),
            "in_progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Cancellation is restricted to non-terminal states.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "partial" => Some(PaymentStatus::Partial),
            "paid" => Some(PaymentStatus::Paid),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booking joined with its package, traveler, optional agent and
/// confirming admin. Every read path returns this record; the bare row
/// shape never leaves the store layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingWithRelations {
    pub booking_id: Uuid,
    pub package_id: Uuid,
    pub traveler_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub no_of_travelers: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_amount: Option<f64>,
    pub booking_date: DateTime<Utc>,
    pub confirmation_date: Option<DateTime<Utc>>,
    pub confirmed_by: Option<Uuid>,
    pub confirmed_by_name: Option<String>,
    pub admin_notes: Option<String>,
    pub traveler_notes: Option<String>,
    pub package_title: String,
    pub package_days: i32,
    pub traveler_name: String,
    pub traveler_email: String,
    pub traveler_contact: String,
    pub agent_name: Option<String>,
    pub agent_email: Option<String>,
}

/// Slim row for list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSummary {
    pub booking_id: Uuid,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub no_of_travelers: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_amount: Option<f64>,
    pub booking_date: DateTime<Utc>,
    pub confirmation_date: Option<DateTime<Utc>>,
    pub package_title: String,
    pub traveler_name: String,
    pub traveler_email: String,
    pub agent_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub package_id: Uuid,
    pub traveler_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub no_of_travelers: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_amount: Option<f64>,
    pub traveler_notes: Option<String>,
}

/// Partial update applied by the admin edit endpoint. `traveler_id` and
/// `package_id` are deliberately absent: both are immutable after
/// creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingUpdate {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub no_of_travelers: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_amount: Option<f64>,
    pub agent_id: Option<Uuid>,
    pub admin_notes: Option<String>,
    pub traveler_notes: Option<String>,
}

impl BookingUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.payment_status.is_none()
            && self.no_of_travelers.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.total_amount.is_none()
            && self.agent_id.is_none()
            && self.admin_notes.is_none()
            && self.traveler_notes.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub traveler_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub package_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingStats {
    pub total_bookings: i64,
    pub temporary_bookings: i64,
    pub confirmed_bookings: i64,
    pub completed_bookings: i64,
    pub cancelled_bookings: i64,
    pub total_revenue: f64,
    pub paid_revenue: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_block_cancellation() {
        assert!(BookingStatus::Temporary.can_cancel());
        assert!(BookingStatus::Confirmed.can_cancel());
        assert!(BookingStatus::InProgress.can_cancel());
        assert!(!BookingStatus::Completed.can_cancel());
        assert!(!BookingStatus::Cancelled.can_cancel());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            BookingStatus::Temporary,
            BookingStatus::Confirmed,
            BookingStatus::InProgress,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("expired"), None);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&BookingStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let back: BookingStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, BookingStatus::Cancelled);
    }

    #[test]
    fn payment_status_parse_rejects_unknown() {
        assert_eq!(PaymentStatus::parse("paid"), Some(PaymentStatus::Paid));
        assert_eq!(PaymentStatus::parse("chargeback"), None);
    }
}
