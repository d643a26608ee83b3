use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publish lifecycle of a package. Only `Published` packages are
/// bookable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    Draft,
    Published,
}

impl PackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageStatus::Draft => "draft",
            PackageStatus::Published => "published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(PackageStatus::Draft),
            "published" => Some(PackageStatus::Published),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub package_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub no_of_days: i32,
    pub is_template: bool,
    pub status: PackageStatus,
    pub is_active: bool,
    pub base_price: Option<f64>,
    pub created_by: Option<Uuid>,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Package {
    /// Eligibility check used by the submission workflow.
    pub fn is_bookable(&self) -> bool {
        self.status == PackageStatus::Published
    }
}

/// One itinerary stop: a location visited on a given day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryStop {
    pub id: Uuid,
    pub visit_order: i32,
    pub notes: Option<String>,
    pub location: ItineraryLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryLocation {
    pub location_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location_type: String,
    pub location_url: Option<String>,
    pub image_url: Option<String>,
}

/// Itinerary keyed by day number, each day ordered by visit order.
pub type Itinerary = BTreeMap<i32, Vec<ItineraryStop>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageWithItinerary {
    #[serde(flatten)]
    pub package: Package,
    pub itinerary: Itinerary,
}

#[derive(Debug, Clone)]
pub struct NewPackage {
    pub title: String,
    pub description: Option<String>,
    pub no_of_days: i32,
    pub is_template: bool,
    pub base_price: Option<f64>,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub no_of_days: Option<i32>,
    pub is_template: Option<bool>,
    pub status: Option<PackageStatus>,
    pub is_active: Option<bool>,
    pub base_price: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    pub status: Option<PackageStatus>,
    pub is_template: Option<bool>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

/// Replacement itinerary entry, as submitted by the admin editor.
#[derive(Debug, Clone, Deserialize)]
pub struct ItineraryItem {
    pub location_id: Uuid,
    pub day_number: i32,
    #[serde(default)]
    pub visit_order: i32,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_published_packages_are_bookable() {
        let mut pkg = Package {
            package_id: Uuid::new_v4(),
            title: "Hill Country Loop".into(),
            description: None,
            no_of_days: 5,
            is_template: false,
            status: PackageStatus::Draft,
            is_active: true,
            base_price: None,
            created_by: None,
            created_by_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!pkg.is_bookable());
        pkg.status = PackageStatus::Published;
        assert!(pkg.is_bookable());
    }
}
