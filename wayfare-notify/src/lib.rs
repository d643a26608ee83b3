mod templates;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use wayfare_core::booking::BookingWithRelations;
use wayfare_core::notify::{IssuedCredentials, Notifier};
use wayfare_core::request::PackageRequest;
use wayfare_core::NotifyError;

/// SMTP-backed mailer. A transport is built per send to avoid pooled
/// connections going stale between infrequent emails; the blocking send
/// runs on the blocking thread pool.
#[derive(Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    credentials: Credentials,
    from_address: String,
    from_name: String,
    frontend_url: String,
}

impl SmtpMailer {
    pub fn new(
        host: String,
        port: u16,
        user: String,
        password: String,
        from_address: String,
        from_name: String,
        frontend_url: String,
    ) -> Self {
        Self {
            host,
            port,
            credentials: Credentials::new(user, password),
            from_address,
            from_name,
            frontend_url,
        }
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_address)
    }

    fn build_transport(&self) -> Result<SmtpTransport, NotifyError> {
        Ok(SmtpTransport::relay(&self.host)
            .map_err(|e| NotifyError::Transport(format!("smtp relay error: {e}")))?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build())
    }

    async fn send(&self, to: &str, subject: &str, html: String) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| NotifyError::Address(format!("invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| NotifyError::Address(format!("invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| NotifyError::Message(e.to_string()))?;

        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| NotifyError::Transport(e.to_string()))
        })
        .await
        .map_err(|e| NotifyError::Transport(format!("send task failed: {e}")))??;

        info!(to, subject, "email sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpMailer {
    async fn send_booking_confirmation(
        &self,
        to: &str,
        booking: &BookingWithRelations,
        credentials: Option<&IssuedCredentials>,
    ) -> Result<(), NotifyError> {
        let subject = format!("Booking Confirmed - {}", booking.package_title);
        let html = templates::booking_confirmation(booking, credentials, &self.frontend_url);
        self.send(to, &subject, html).await
    }

    async fn send_request_acknowledgment(
        &self,
        to: &str,
        request: &PackageRequest,
    ) -> Result<(), NotifyError> {
        let html = templates::request_acknowledgment(request);
        self.send(to, "Package Request Received", html).await
    }

    async fn send_password_change_notice(&self, to: &str, name: &str) -> Result<(), NotifyError> {
        let html = templates::password_change_notice(name);
        self.send(to, "Password Changed Successfully", html).await
    }
}
