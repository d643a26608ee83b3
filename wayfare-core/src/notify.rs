use async_trait::async_trait;

use crate::booking::BookingWithRelations;
use crate::request::PackageRequest;
use crate::NotifyError;

/// Credentials issued for a freshly provisioned traveler account,
/// carried into the confirmation email and then dropped.
#[derive(Debug, Clone)]
pub struct IssuedCredentials {
    pub email: String,
    pub password: String,
}

/// Outbound email seam. Delivery is best-effort everywhere: callers log
/// failures and continue, and no state change ever waits on or rolls
/// back because of this trait.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_booking_confirmation(
        &self,
        to: &str,
        booking: &BookingWithRelations,
        credentials: Option<&IssuedCredentials>,
    ) -> Result<(), NotifyError>;

    async fn send_request_acknowledgment(
        &self,
        to: &str,
        request: &PackageRequest,
    ) -> Result<(), NotifyError>;

    async fn send_password_change_notice(&self, to: &str, name: &str) -> Result<(), NotifyError>;
}
