use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use wayfare_core::booking::{BookingStatus, BookingWithRelations, NewBooking};
use wayfare_core::credentials;
use wayfare_core::notify::{IssuedCredentials, Notifier};
use wayfare_core::repository::{BookingStore, PackageStore, TravelerStore};
use wayfare_core::traveler::{NewTraveler, TravelerResolution};
use wayfare_core::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Package not found")]
    PackageNotFound,
    #[error("Package is not available for booking")]
    PackageNotBookable,
    #[error("Booking not found")]
    BookingNotFound,
    #[error("Traveler not found")]
    TravelerNotFound,
    #[error("Booking is already confirmed")]
    AlreadyConfirmed,
    #[error("Booking in status '{0}' cannot be cancelled")]
    CancellationNotAllowed(BookingStatus),
    #[error("{0}")]
    Validation(String),
    #[error("credential hashing failed: {0}")]
    Credential(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Public booking submission, as received on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingSubmission {
    pub package_id: Uuid,
    pub traveler: TravelerDetails,
    pub no_of_travelers: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub agent_id: Option<Uuid>,
    pub traveler_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TravelerDetails {
    pub name: String,
    pub email: String,
    pub contact: String,
}

#[derive(Debug)]
pub struct SubmissionOutcome {
    pub booking: BookingWithRelations,
    pub is_new_account: bool,
}

/// Orchestrates the booking lifecycle: traveler resolution, submission,
/// guarded confirmation with account activation, and cancellation.
///
/// Every collaborator is injected, so the orchestration logic carries no
/// knowledge of SQL or SMTP. Sub-steps within one call run strictly in
/// order; nothing here provides cross-request ordering beyond the
/// conditional confirm update.
pub struct BookingWorkflow {
    packages: Arc<dyn PackageStore>,
    travelers: Arc<dyn TravelerStore>,
    bookings: Arc<dyn BookingStore>,
    notifier: Arc<dyn Notifier>,
    password_length: usize,
}

impl BookingWorkflow {
    pub fn new(
        packages: Arc<dyn PackageStore>,
        travelers: Arc<dyn TravelerStore>,
        bookings: Arc<dyn BookingStore>,
        notifier: Arc<dyn Notifier>,
        password_length: usize,
    ) -> Self {
        Self {
            packages,
            travelers,
            bookings,
            notifier,
            password_length,
        }
    }

    /// Resolve a submitted email to a traveler identity. Existing
    /// accounts are reused untouched; unknown emails get a fresh
    /// account with `is_active = false` and a generated temporary
    /// password that is hashed immediately and surfaced exactly once in
    /// the returned resolution.
    pub async fn resolve_traveler(
        &self,
        details: &TravelerDetails,
    ) -> Result<TravelerResolution, WorkflowError> {
        if let Some(existing) = self.travelers.find_account_by_email(&details.email).await? {
            return Ok(TravelerResolution {
                traveler: existing.into_public(),
                is_new_account: false,
                generated_password: None,
            });
        }

        let password = credentials::generate_temp_password(self.password_length);
        let password_hash = credentials::hash_password(&password)
            .map_err(|e| WorkflowError::Credential(e.to_string()))?;

        let traveler = self
            .travelers
            .create(&NewTraveler {
                email: details.email.clone(),
                password_hash,
                name: details.name.clone(),
                contact: details.contact.clone(),
                is_active: false,
            })
            .await?;

        info!(traveler_id = %traveler.traveler_id, "provisioned traveler account for booking");

        Ok(TravelerResolution {
            traveler,
            is_new_account: true,
            generated_password: Some(password),
        })
    }

    /// Submit a public booking against a published package.
    ///
    /// The traveler insert always completes before the booking insert,
    /// so a booking can never reference a traveler that does not exist.
    pub async fn submit(
        &self,
        submission: BookingSubmission,
    ) -> Result<SubmissionOutcome, WorkflowError> {
        validate_submission(&submission)?;

        let package = self
            .packages
            .find_by_id(submission.package_id)
            .await?
            .ok_or(WorkflowError::PackageNotFound)?;

        if !package.is_bookable() {
            return Err(WorkflowError::PackageNotBookable);
        }

        let resolution = self.resolve_traveler(&submission.traveler).await?;
        // The plaintext in the resolution is dropped here on purpose:
        // usable credentials are reissued and mailed when an admin
        // confirms the booking and the account goes active.
        let is_new_account = resolution.is_new_account;

        let booking_id = self
            .bookings
            .create(&NewBooking {
                package_id: submission.package_id,
                traveler_id: resolution.traveler.traveler_id,
                agent_id: submission.agent_id,
                no_of_travelers: submission.no_of_travelers.unwrap_or(1),
                start_date: submission.start_date,
                end_date: submission.end_date,
                total_amount: None,
                traveler_notes: submission.traveler_notes,
            })
            .await?;

        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(WorkflowError::BookingNotFound)?;

        info!(booking_id = %booking_id, is_new_account, "booking submitted");

        Ok(SubmissionOutcome {
            booking,
            is_new_account,
        })
    }

    /// Confirm a booking on behalf of an admin.
    ///
    /// The status change is a conditional update: when the store reports
    /// zero rows changed on an existing booking, someone else confirmed
    /// it first and this call fails with `AlreadyConfirmed`. After the
    /// update the traveler account is activated (reissuing a temporary
    /// password when the account was never active), and the confirmation
    /// email is sent best-effort: a failed send is logged and the
    /// confirmation stands.
    pub async fn confirm(
        &self,
        booking_id: Uuid,
        admin_id: Uuid,
    ) -> Result<BookingWithRelations, WorkflowError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(WorkflowError::BookingNotFound)?;

        if booking.status == BookingStatus::Confirmed {
            return Err(WorkflowError::AlreadyConfirmed);
        }

        if !self.bookings.confirm(booking_id, admin_id).await? {
            // Lost the race against a concurrent confirm.
            return Err(WorkflowError::AlreadyConfirmed);
        }

        let issued = self.activate_traveler(booking.traveler_id).await?;

        let confirmed = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(WorkflowError::BookingNotFound)?;

        if let Err(err) = self
            .notifier
            .send_booking_confirmation(&confirmed.traveler_email, &confirmed, issued.as_ref())
            .await
        {
            warn!(booking_id = %booking_id, error = %err, "confirmation email failed; booking stays confirmed");
        }

        info!(booking_id = %booking_id, admin_id = %admin_id, "booking confirmed");

        Ok(confirmed)
    }

    /// Cancel a booking. Terminal bookings (completed, cancelled) are
    /// refused; ownership checks are the caller's responsibility.
    pub async fn cancel(&self, booking_id: Uuid) -> Result<BookingWithRelations, WorkflowError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(WorkflowError::BookingNotFound)?;

        if !booking.status.can_cancel() {
            return Err(WorkflowError::CancellationNotAllowed(booking.status));
        }

        self.bookings
            .set_status(booking_id, BookingStatus::Cancelled)
            .await?;

        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(WorkflowError::BookingNotFound)
    }

    /// Administrative status correction. Sets any enumerated status with
    /// no side effects; the confirm side effects only ever fire through
    /// [`BookingWorkflow::confirm`].
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<BookingWithRelations, WorkflowError> {
        if self.bookings.find_by_id(booking_id).await?.is_none() {
            return Err(WorkflowError::BookingNotFound);
        }

        self.bookings.set_status(booking_id, status).await?;

        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(WorkflowError::BookingNotFound)
    }

    /// Activate the traveler behind a confirmed booking. A never-active
    /// account gets a fresh temporary password so the confirmation email
    /// can carry credentials the traveler can actually use; the plaintext
    /// generated at submission was hashed and dropped.
    async fn activate_traveler(
        &self,
        traveler_id: Uuid,
    ) -> Result<Option<IssuedCredentials>, WorkflowError> {
        let traveler = self
            .travelers
            .find_by_id(traveler_id)
            .await?
            .ok_or(WorkflowError::TravelerNotFound)?;

        let issued = if traveler.is_active {
            None
        } else {
            let password = credentials::generate_temp_password(self.password_length);
            let hash = credentials::hash_password(&password)
                .map_err(|e| WorkflowError::Credential(e.to_string()))?;
            self.travelers.set_password_hash(traveler_id, &hash).await?;
            Some(IssuedCredentials {
                email: traveler.email.clone(),
                password,
            })
        };

        self.travelers.activate(traveler_id).await?;
        Ok(issued)
    }
}

fn validate_submission(submission: &BookingSubmission) -> Result<(), WorkflowError> {
    let traveler = &submission.traveler;
    if traveler.name.trim().is_empty() {
        return Err(WorkflowError::Validation("Traveler name is required".into()));
    }
    if traveler.email.trim().is_empty() || !traveler.email.contains('@') {
        return Err(WorkflowError::Validation(
            "A valid traveler email is required".into(),
        ));
    }
    if traveler.contact.trim().is_empty() {
        return Err(WorkflowError::Validation(
            "Traveler contact is required".into(),
        ));
    }
    if submission.no_of_travelers.is_some_and(|n| n < 1) {
        return Err(WorkflowError::Validation(
            "Number of travelers must be at least 1".into(),
        ));
    }
    if let (Some(start), Some(end)) = (submission.start_date, submission.end_date) {
        if end < start {
            return Err(WorkflowError::Validation(
                "End date cannot be before start date".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use wayfare_core::booking::{
        BookingFilter, BookingStats, BookingSummary, BookingUpdate, PaymentStatus,
    };
    use wayfare_core::package::{
        ItineraryItem, NewPackage, Package, PackageFilter, PackageStatus, PackageUpdate,
        PackageWithItinerary,
    };
    use wayfare_core::pagination::PageRequest;
    use wayfare_core::request::PackageRequest;
    use wayfare_core::traveler::{Traveler, TravelerAccount, TravelerFilter, TravelerUpdate};
    use wayfare_core::{NotifyError, StoreResult};

    fn sample_package(status: PackageStatus) -> Package {
        Package {
            package_id: Uuid::new_v4(),
            title: "South Coast Circuit".into(),
            description: None,
            no_of_days: 5,
            is_template: false,
            status,
            is_active: true,
            base_price: Some(1200.0),
            created_by: None,
            created_by_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    struct FixedPackages {
        package: Option<Package>,
    }

    #[async_trait]
    impl PackageStore for FixedPackages {
        async fn find_by_id(&self, package_id: Uuid) -> StoreResult<Option<Package>> {
            Ok(self
                .package
                .clone()
                .filter(|p| p.package_id == package_id))
        }
        async fn find_with_itinerary(
            &self,
            _package_id: Uuid,
        ) -> StoreResult<Option<PackageWithItinerary>> {
            Ok(None)
        }
        async fn list(
            &self,
            _filter: &PackageFilter,
            _page: PageRequest,
        ) -> StoreResult<(Vec<Package>, i64)> {
            Ok((vec![], 0))
        }
        async fn create(&self, _package: &NewPackage) -> StoreResult<Package> {
            unimplemented!("not exercised")
        }
        async fn update(
            &self,
            _package_id: Uuid,
            _update: &PackageUpdate,
        ) -> StoreResult<Option<Package>> {
            Ok(None)
        }
        async fn replace_itinerary(
            &self,
            _package_id: Uuid,
            _itinerary: &[ItineraryItem],
        ) -> StoreResult<()> {
            Ok(())
        }
        async fn publish(&self, _package_id: Uuid) -> StoreResult<bool> {
            Ok(false)
        }
        async fn unpublish(&self, _package_id: Uuid) -> StoreResult<bool> {
            Ok(false)
        }
        async fn duplicate(
            &self,
            _package_id: Uuid,
            _new_title: Option<&str>,
            _created_by: Uuid,
        ) -> StoreResult<Option<Uuid>> {
            Ok(None)
        }
        async fn delete(&self, _package_id: Uuid) -> StoreResult<bool> {
            Ok(false)
        }
    }

    #[derive(Default)]
    struct MemTravelers {
        accounts: Mutex<HashMap<Uuid, TravelerAccount>>,
    }

    impl MemTravelers {
        fn seed(&self, email: &str, is_active: bool) -> Uuid {
            let id = Uuid::new_v4();
            self.accounts.lock().unwrap().insert(
                id,
                TravelerAccount {
                    traveler_id: id,
                    email: email.to_string(),
                    password_hash: "$2b$10$seeded".into(),
                    name: "Seeded Traveler".into(),
                    contact: "000".into(),
                    is_active,
                    created_at: Utc::now(),
                    last_login: None,
                },
            );
            id
        }

        fn count(&self) -> usize {
            self.accounts.lock().unwrap().len()
        }

        fn get(&self, id: Uuid) -> Option<TravelerAccount> {
            self.accounts.lock().unwrap().get(&id).cloned()
        }
    }

    #[async_trait]
    impl TravelerStore for MemTravelers {
        async fn find_by_id(&self, traveler_id: Uuid) -> StoreResult<Option<Traveler>> {
            Ok(self.get(traveler_id).map(TravelerAccount::into_public))
        }
        async fn find_account_by_email(
            &self,
            email: &str,
        ) -> StoreResult<Option<TravelerAccount>> {
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .values()
                .find(|a| a.email.eq_ignore_ascii_case(email))
                .cloned())
        }
        async fn list(
            &self,
            _filter: &TravelerFilter,
            _page: PageRequest,
        ) -> StoreResult<(Vec<Traveler>, i64)> {
            Ok((vec![], 0))
        }
        async fn create(&self, traveler: &NewTraveler) -> StoreResult<Traveler> {
            let id = Uuid::new_v4();
            let account = TravelerAccount {
                traveler_id: id,
                email: traveler.email.clone(),
                password_hash: traveler.password_hash.clone(),
                name: traveler.name.clone(),
                contact: traveler.contact.clone(),
                is_active: traveler.is_active,
                created_at: Utc::now(),
                last_login: None,
            };
            let public = account.clone().into_public();
            self.accounts.lock().unwrap().insert(id, account);
            Ok(public)
        }
        async fn update(
            &self,
            _traveler_id: Uuid,
            _update: &TravelerUpdate,
        ) -> StoreResult<Option<Traveler>> {
            Ok(None)
        }
        async fn activate(&self, traveler_id: Uuid) -> StoreResult<bool> {
            let mut accounts = self.accounts.lock().unwrap();
            match accounts.get_mut(&traveler_id) {
                Some(account) => {
                    account.is_active = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        async fn set_password_hash(&self, traveler_id: Uuid, hash: &str) -> StoreResult<bool> {
            let mut accounts = self.accounts.lock().unwrap();
            match accounts.get_mut(&traveler_id) {
                Some(account) => {
                    account.password_hash = hash.to_string();
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        async fn touch_last_login(&self, _traveler_id: Uuid) -> StoreResult<()> {
            Ok(())
        }
        async fn delete(&self, _traveler_id: Uuid) -> StoreResult<bool> {
            Ok(false)
        }
    }

    struct MemBookingRecord {
        booking: NewBooking,
        status: BookingStatus,
        confirmed_by: Option<Uuid>,
        confirmation_date: Option<chrono::DateTime<Utc>>,
    }

    #[derive(Default)]
    struct MemBookings {
        rows: Mutex<HashMap<Uuid, MemBookingRecord>>,
    }

    impl MemBookings {
        fn count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        fn status_of(&self, id: Uuid) -> Option<BookingStatus> {
            self.rows.lock().unwrap().get(&id).map(|r| r.status)
        }

        fn with_status(&self, booking: NewBooking, status: BookingStatus) -> Uuid {
            let id = Uuid::new_v4();
            self.rows.lock().unwrap().insert(
                id,
                MemBookingRecord {
                    booking,
                    status,
                    confirmed_by: None,
                    confirmation_date: None,
                },
            );
            id
        }
    }

    #[async_trait]
    impl BookingStore for MemBookings {
        async fn find_by_id(
            &self,
            booking_id: Uuid,
        ) -> StoreResult<Option<BookingWithRelations>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.get(&booking_id).map(|record| BookingWithRelations {
                booking_id,
                package_id: record.booking.package_id,
                traveler_id: record.booking.traveler_id,
                agent_id: record.booking.agent_id,
                status: record.status,
                payment_status: PaymentStatus::Pending,
                no_of_travelers: record.booking.no_of_travelers,
                start_date: record.booking.start_date,
                end_date: record.booking.end_date,
                total_amount: record.booking.total_amount,
                booking_date: Utc::now(),
                confirmation_date: record.confirmation_date,
                confirmed_by: record.confirmed_by,
                confirmed_by_name: None,
                admin_notes: None,
                traveler_notes: record.booking.traveler_notes.clone(),
                package_title: "South Coast Circuit".into(),
                package_days: 5,
                traveler_name: "Traveler".into(),
                traveler_email: "traveler@example.com".into(),
                traveler_contact: "000".into(),
                agent_name: None,
                agent_email: None,
            }))
        }
        async fn list(
            &self,
            _filter: &BookingFilter,
            _page: PageRequest,
        ) -> StoreResult<(Vec<BookingSummary>, i64)> {
            Ok((vec![], 0))
        }
        async fn list_for_traveler(
            &self,
            _traveler_id: Uuid,
        ) -> StoreResult<Vec<BookingSummary>> {
            Ok(vec![])
        }
        async fn create(&self, booking: &NewBooking) -> StoreResult<Uuid> {
            Ok(self.with_status(booking.clone(), BookingStatus::Temporary))
        }
        async fn update(&self, _booking_id: Uuid, _update: &BookingUpdate) -> StoreResult<bool> {
            Ok(false)
        }
        async fn confirm(&self, booking_id: Uuid, admin_id: Uuid) -> StoreResult<bool> {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&booking_id) {
                Some(record) if record.status != BookingStatus::Confirmed => {
                    record.status = BookingStatus::Confirmed;
                    record.confirmed_by = Some(admin_id);
                    record.confirmation_date = Some(Utc::now());
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
        async fn set_status(&self, booking_id: Uuid, status: BookingStatus) -> StoreResult<bool> {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&booking_id) {
                Some(record) => {
                    record.status = status;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        async fn stats(&self) -> StoreResult<BookingStats> {
            Ok(BookingStats {
                total_bookings: 0,
                temporary_bookings: 0,
                confirmed_bookings: 0,
                completed_bookings: 0,
                cancelled_bookings: 0,
                total_revenue: 0.0,
                paid_revenue: 0.0,
            })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        fail: bool,
        confirmations: Mutex<Vec<Option<IssuedCredentials>>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_booking_confirmation(
            &self,
            _to: &str,
            _booking: &BookingWithRelations,
            credentials: Option<&IssuedCredentials>,
        ) -> Result<(), NotifyError> {
            self.confirmations
                .lock()
                .unwrap()
                .push(credentials.cloned());
            if self.fail {
                Err(NotifyError::Transport("connection refused".into()))
            } else {
                Ok(())
            }
        }
        async fn send_request_acknowledgment(
            &self,
            _to: &str,
            _request: &PackageRequest,
        ) -> Result<(), NotifyError> {
            Ok(())
        }
        async fn send_password_change_notice(
            &self,
            _to: &str,
            _name: &str,
        ) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    struct Harness {
        workflow: BookingWorkflow,
        travelers: Arc<MemTravelers>,
        bookings: Arc<MemBookings>,
        notifier: Arc<RecordingNotifier>,
        package: Package,
    }

    fn harness(status: PackageStatus, failing_notifier: bool) -> Harness {
        let package = sample_package(status);
        let packages = Arc::new(FixedPackages {
            package: Some(package.clone()),
        });
        let travelers = Arc::new(MemTravelers::default());
        let bookings = Arc::new(MemBookings::default());
        let notifier = Arc::new(RecordingNotifier {
            fail: failing_notifier,
            confirmations: Mutex::new(vec![]),
        });
        let workflow = BookingWorkflow::new(
            packages,
            travelers.clone(),
            bookings.clone(),
            notifier.clone(),
            12,
        );
        Harness {
            workflow,
            travelers,
            bookings,
            notifier,
            package,
        }
    }

    fn submission(package_id: Uuid, email: &str) -> BookingSubmission {
        BookingSubmission {
            package_id,
            traveler: TravelerDetails {
                name: "Amara Silva".into(),
                email: email.into(),
                contact: "+94 77 123 4567".into(),
            },
            no_of_travelers: Some(2),
            start_date: None,
            end_date: None,
            agent_id: None,
            traveler_notes: None,
        }
    }

    #[tokio::test]
    async fn submit_rejects_unknown_package_without_creating_rows() {
        let h = harness(PackageStatus::Published, false);
        let result = h
            .workflow
            .submit(submission(Uuid::new_v4(), "a@x.com"))
            .await;
        assert!(matches!(result, Err(WorkflowError::PackageNotFound)));
        assert_eq!(h.bookings.count(), 0);
        assert_eq!(h.travelers.count(), 0);
    }

    #[tokio::test]
    async fn submit_rejects_draft_package_without_creating_rows() {
        let h = harness(PackageStatus::Draft, false);
        let result = h
            .workflow
            .submit(submission(h.package.package_id, "a@x.com"))
            .await;
        assert!(matches!(result, Err(WorkflowError::PackageNotBookable)));
        assert_eq!(h.bookings.count(), 0);
        assert_eq!(h.travelers.count(), 0);
    }

    #[tokio::test]
    async fn submit_provisions_inactive_account_for_new_email() {
        let h = harness(PackageStatus::Published, false);
        let outcome = h
            .workflow
            .submit(submission(h.package.package_id, "a@x.com"))
            .await
            .unwrap();

        assert!(outcome.is_new_account);
        assert_eq!(outcome.booking.status, BookingStatus::Temporary);
        assert_eq!(outcome.booking.payment_status, PaymentStatus::Pending);
        assert_eq!(h.travelers.count(), 1);

        let account = h.travelers.get(outcome.booking.traveler_id).unwrap();
        assert!(!account.is_active);
        // bcrypt output, never the plaintext
        assert!(account.password_hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn submit_reuses_existing_account_by_email() {
        let h = harness(PackageStatus::Published, false);
        let seeded = h.travelers.seed("repeat@x.com", true);

        let outcome = h
            .workflow
            .submit(submission(h.package.package_id, "Repeat@X.com"))
            .await
            .unwrap();

        assert!(!outcome.is_new_account);
        assert_eq!(outcome.booking.traveler_id, seeded);
        assert_eq!(h.travelers.count(), 1);
    }

    #[tokio::test]
    async fn submit_validates_traveler_details() {
        let h = harness(PackageStatus::Published, false);
        let mut bad = submission(h.package.package_id, "not-an-email");
        let result = h.workflow.submit(bad.clone()).await;
        assert!(matches!(result, Err(WorkflowError::Validation(_))));

        bad.traveler.email = "a@x.com".into();
        bad.no_of_travelers = Some(0);
        let result = h.workflow.submit(bad).await;
        assert!(matches!(result, Err(WorkflowError::Validation(_))));
        assert_eq!(h.bookings.count(), 0);
    }

    #[tokio::test]
    async fn resolution_surfaces_generated_password_exactly_once() {
        let h = harness(PackageStatus::Published, false);
        let details = TravelerDetails {
            name: "Amara Silva".into(),
            email: "amara@x.com".into(),
            contact: "123".into(),
        };

        let first = h.workflow.resolve_traveler(&details).await.unwrap();
        assert!(first.is_new_account);
        let password = first.generated_password.expect("fresh account gets a password");
        assert_eq!(password.len(), 12);

        let second = h.workflow.resolve_traveler(&details).await.unwrap();
        assert!(!second.is_new_account);
        assert!(second.generated_password.is_none());
        assert_eq!(second.traveler.traveler_id, first.traveler.traveler_id);
    }

    #[tokio::test]
    async fn confirm_is_idempotent_guarded() {
        let h = harness(PackageStatus::Published, false);
        let outcome = h
            .workflow
            .submit(submission(h.package.package_id, "a@x.com"))
            .await
            .unwrap();
        let admin = Uuid::new_v4();

        let confirmed = h
            .workflow
            .confirm(outcome.booking.booking_id, admin)
            .await
            .unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert_eq!(confirmed.confirmed_by, Some(admin));
        assert!(confirmed.confirmation_date.is_some());

        let again = h.workflow.confirm(outcome.booking.booking_id, admin).await;
        assert!(matches!(again, Err(WorkflowError::AlreadyConfirmed)));
    }

    #[tokio::test]
    async fn confirm_activates_traveler_even_when_notifier_fails() {
        let h = harness(PackageStatus::Published, true);
        let outcome = h
            .workflow
            .submit(submission(h.package.package_id, "a@x.com"))
            .await
            .unwrap();

        let confirmed = h
            .workflow
            .confirm(outcome.booking.booking_id, Uuid::new_v4())
            .await
            .expect("notifier failure must not fail confirmation");

        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        let account = h.travelers.get(outcome.booking.traveler_id).unwrap();
        assert!(account.is_active);
        assert_eq!(h.notifier.confirmations.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn confirm_reissues_credentials_only_for_inactive_accounts() {
        let h = harness(PackageStatus::Published, false);
        let outcome = h
            .workflow
            .submit(submission(h.package.package_id, "fresh@x.com"))
            .await
            .unwrap();

        h.workflow
            .confirm(outcome.booking.booking_id, Uuid::new_v4())
            .await
            .unwrap();

        let sent = h.notifier.confirmations.lock().unwrap();
        let credentials = sent[0].as_ref().expect("new account gets credentials");
        assert_eq!(credentials.email, "fresh@x.com");
        assert_eq!(credentials.password.len(), 12);
        drop(sent);

        // Second booking from the now-active traveler confirms without
        // fresh credentials.
        let outcome2 = h
            .workflow
            .submit(submission(h.package.package_id, "fresh@x.com"))
            .await
            .unwrap();
        h.workflow
            .confirm(outcome2.booking.booking_id, Uuid::new_v4())
            .await
            .unwrap();
        let sent = h.notifier.confirmations.lock().unwrap();
        assert!(sent[1].is_none());
    }

    #[tokio::test]
    async fn cancel_refuses_terminal_states() {
        let h = harness(PackageStatus::Published, false);
        let base = NewBooking {
            package_id: h.package.package_id,
            traveler_id: Uuid::new_v4(),
            agent_id: None,
            no_of_travelers: 1,
            start_date: None,
            end_date: None,
            total_amount: None,
            traveler_notes: None,
        };
        let completed = h
            .bookings
            .with_status(base.clone(), BookingStatus::Completed);
        let cancelled = h
            .bookings
            .with_status(base.clone(), BookingStatus::Cancelled);
        let open = h.bookings.with_status(base, BookingStatus::Confirmed);

        assert!(matches!(
            h.workflow.cancel(completed).await,
            Err(WorkflowError::CancellationNotAllowed(
                BookingStatus::Completed
            ))
        ));
        assert!(matches!(
            h.workflow.cancel(cancelled).await,
            Err(WorkflowError::CancellationNotAllowed(
                BookingStatus::Cancelled
            ))
        ));

        let result = h.workflow.cancel(open).await.unwrap();
        assert_eq!(result.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn update_status_patches_without_side_effects() {
        let h = harness(PackageStatus::Published, false);
        let outcome = h
            .workflow
            .submit(submission(h.package.package_id, "a@x.com"))
            .await
            .unwrap();
        let id = outcome.booking.booking_id;

        let updated = h
            .workflow
            .update_status(id, BookingStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::InProgress);
        assert_eq!(h.bookings.status_of(id), Some(BookingStatus::InProgress));
        // No confirmation email fired for a bare status patch.
        assert!(h.notifier.confirmations.lock().unwrap().is_empty());

        let missing = h
            .workflow
            .update_status(Uuid::new_v4(), BookingStatus::Completed)
            .await;
        assert!(matches!(missing, Err(WorkflowError::BookingNotFound)));
    }
}
