use std::sync::Arc;

use wayfare_booking::BookingWorkflow;
use wayfare_core::notify::Notifier;
use wayfare_core::repository::{
    AdminStore, AgentStore, BookingStore, LocationStore, PackageStore, RequestStore, TravelerStore,
};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub admins: Arc<dyn AdminStore>,
    pub travelers: Arc<dyn TravelerStore>,
    pub agents: Arc<dyn AgentStore>,
    pub locations: Arc<dyn LocationStore>,
    pub packages: Arc<dyn PackageStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub requests: Arc<dyn RequestStore>,
    pub workflow: Arc<BookingWorkflow>,
    pub mailer: Arc<dyn Notifier>,
    pub auth: AuthConfig,
}
