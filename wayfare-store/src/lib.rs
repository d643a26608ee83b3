pub mod admin_repo;
pub mod agent_repo;
pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod location_repo;
pub mod package_repo;
pub mod request_repo;
pub mod traveler_repo;

pub use admin_repo::PgAdminStore;
pub use agent_repo::PgAgentStore;
pub use booking_repo::PgBookingStore;
pub use database::DbClient;
pub use location_repo::PgLocationStore;
pub use package_repo::PgPackageStore;
pub use request_repo::PgRequestStore;
pub use traveler_repo::PgTravelerStore;

use wayfare_core::StoreError;

/// Shorthand used by every repository in this crate.
pub(crate) fn backend(err: sqlx::Error) -> StoreError {
    StoreError::backend(err)
}
