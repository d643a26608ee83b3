use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of a traveler. The password hash never appears here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Traveler {
    pub traveler_id: Uuid,
    pub email: String,
    pub name: String,
    pub contact: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Credential-bearing view, fetched by the login, change-password and
/// traveler-resolution paths.
#[derive(Debug, Clone)]
pub struct TravelerAccount {
    pub traveler_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub contact: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl TravelerAccount {
    /// Strip the credential for callers that must not see the hash.
    pub fn into_public(self) -> Traveler {
        Traveler {
            traveler_id: self.traveler_id,
            email: self.email,
            name: self.name,
            contact: self.contact,
            is_active: self.is_active,
            created_at: self.created_at,
            last_login: self.last_login,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTraveler {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub contact: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TravelerUpdate {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct TravelerFilter {
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

/// Outcome of resolving a submitted email to a traveler identity.
/// `generated_password` is populated exactly once, for a freshly
/// provisioned account, and is never persisted in plaintext.
#[derive(Debug)]
pub struct TravelerResolution {
    pub traveler: Traveler,
    pub is_new_account: bool,
    pub generated_password: Option<String>,
}
