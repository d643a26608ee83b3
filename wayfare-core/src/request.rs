use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Custom-package request lifecycle: pending → reviewing →
/// approved/rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Reviewing,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Reviewing => "reviewing",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RequestStatus::Pending),
            "reviewing" => Some(RequestStatus::Reviewing),
            "approved" => Some(RequestStatus::Approved),
            "rejected" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRequest {
    pub request_id: Uuid,
    pub traveler_id: Uuid,
    pub title: String,
    pub description: String,
    pub no_of_days: i32,
    pub no_of_travelers: i32,
    pub preferred_start_date: Option<NaiveDate>,
    pub budget_range: Option<String>,
    pub special_requirements: Option<String>,
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_by_name: Option<String>,
    pub created_package_id: Option<Uuid>,
    pub created_package_title: Option<String>,
    pub traveler_name: String,
    pub traveler_email: String,
    pub traveler_contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPackageRequest {
    pub traveler_id: Uuid,
    pub title: String,
    pub description: String,
    pub no_of_days: i32,
    pub no_of_travelers: i32,
    pub preferred_start_date: Option<NaiveDate>,
    pub budget_range: Option<String>,
    pub special_requirements: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub traveler_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestStats {
    pub total_requests: i64,
    pub pending_requests: i64,
    pub reviewing_requests: i64,
    pub approved_requests: i64,
    pub rejected_requests: i64,
}
