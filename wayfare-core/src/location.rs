use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Attraction,
    Hotel,
    Restaurant,
    Activity,
    Other,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Attraction => "attraction",
            LocationType::Hotel => "hotel",
            LocationType::Restaurant => "restaurant",
            LocationType::Activity => "activity",
            LocationType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "attraction" => Some(LocationType::Attraction),
            "hotel" => Some(LocationType::Hotel),
            "restaurant" => Some(LocationType::Restaurant),
            "activity" => Some(LocationType::Activity),
            "other" => Some(LocationType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub location_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location_type: LocationType,
    pub location_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// First image, when the caller asked for the thumbnail join.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationImage {
    pub image_id: Uuid,
    pub location_id: Uuid,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub display_order: i32,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationWithImages {
    #[serde(flatten)]
    pub location: Location,
    pub images: Vec<LocationImage>,
}

#[derive(Debug, Clone)]
pub struct NewLocation {
    pub name: String,
    pub description: Option<String>,
    pub location_type: LocationType,
    pub location_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location_type: Option<LocationType>,
    pub location_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct LocationFilter {
    pub is_active: Option<bool>,
    pub location_type: Option<LocationType>,
    pub search: Option<String>,
}

/// Image URL registration payload. Upload plumbing is out of scope; the
/// platform stores references to already-hosted assets.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLocationImage {
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub display_order: Option<i32>,
}
