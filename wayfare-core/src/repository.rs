use async_trait::async_trait;
use uuid::Uuid;

use crate::admin::{Admin, AdminAccount, AdminUpdate, NewAdmin};
use crate::agent::{Agent, AgentFilter, AgentStats, AgentUpdate, NewAgent};
use crate::booking::{
    BookingFilter, BookingStats, BookingStatus, BookingSummary, BookingUpdate,
    BookingWithRelations, NewBooking,
};
use crate::location::{
    Location, LocationFilter, LocationImage, LocationUpdate, LocationWithImages, NewLocation,
    NewLocationImage,
};
use crate::package::{
    ItineraryItem, NewPackage, Package, PackageFilter, PackageUpdate, PackageWithItinerary,
};
use crate::pagination::PageRequest;
use crate::request::{NewPackageRequest, PackageRequest, RequestFilter, RequestStats, RequestStatus};
use crate::traveler::{NewTraveler, Traveler, TravelerAccount, TravelerFilter, TravelerUpdate};
use crate::StoreResult;

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_by_id(&self, admin_id: Uuid) -> StoreResult<Option<Admin>>;
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<AdminAccount>>;
    async fn list(&self, page: PageRequest) -> StoreResult<(Vec<Admin>, i64)>;
    async fn create(&self, admin: &NewAdmin) -> StoreResult<Admin>;
    async fn update(&self, admin_id: Uuid, update: &AdminUpdate) -> StoreResult<Option<Admin>>;
    async fn set_password_hash(&self, admin_id: Uuid, hash: &str) -> StoreResult<bool>;
    async fn touch_last_login(&self, admin_id: Uuid) -> StoreResult<()>;
    async fn delete(&self, admin_id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait TravelerStore: Send + Sync {
    async fn find_by_id(&self, traveler_id: Uuid) -> StoreResult<Option<Traveler>>;
    /// Email lookup is case-insensitive, following the store collation.
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<TravelerAccount>>;
    async fn list(
        &self,
        filter: &TravelerFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Traveler>, i64)>;
    /// Single insert; no partial creation is possible.
    async fn create(&self, traveler: &NewTraveler) -> StoreResult<Traveler>;
    async fn update(
        &self,
        traveler_id: Uuid,
        update: &TravelerUpdate,
    ) -> StoreResult<Option<Traveler>>;
    /// Flip `is_active` to true. Returns false when the row is missing.
    async fn activate(&self, traveler_id: Uuid) -> StoreResult<bool>;
    async fn set_password_hash(&self, traveler_id: Uuid, hash: &str) -> StoreResult<bool>;
    async fn touch_last_login(&self, traveler_id: Uuid) -> StoreResult<()>;
    async fn delete(&self, traveler_id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait AgentStore: Send + Sync {
    async fn find_by_id(&self, agent_id: Uuid) -> StoreResult<Option<Agent>>;
    async fn list(&self, filter: &AgentFilter, page: PageRequest)
        -> StoreResult<(Vec<Agent>, i64)>;
    async fn create(&self, agent: &NewAgent) -> StoreResult<Agent>;
    async fn update(&self, agent_id: Uuid, update: &AgentUpdate) -> StoreResult<Option<Agent>>;
    async fn stats(&self, agent_id: Uuid) -> StoreResult<AgentStats>;
    async fn delete(&self, agent_id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn find_by_id(&self, location_id: Uuid) -> StoreResult<Option<Location>>;
    async fn find_with_images(&self, location_id: Uuid) -> StoreResult<Option<LocationWithImages>>;
    /// Listing joins each location's first image for card views.
    async fn list(
        &self,
        filter: &LocationFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Location>, i64)>;
    async fn create(&self, location: &NewLocation) -> StoreResult<Location>;
    async fn update(
        &self,
        location_id: Uuid,
        update: &LocationUpdate,
    ) -> StoreResult<Option<Location>>;
    async fn delete(&self, location_id: Uuid) -> StoreResult<bool>;
    async fn add_image(
        &self,
        location_id: Uuid,
        image: &NewLocationImage,
    ) -> StoreResult<LocationImage>;
    async fn delete_image(&self, location_id: Uuid, image_id: Uuid) -> StoreResult<bool>;
    async fn reorder_images(&self, location_id: Uuid, image_ids: &[Uuid]) -> StoreResult<()>;
}

#[async_trait]
pub trait PackageStore: Send + Sync {
    async fn find_by_id(&self, package_id: Uuid) -> StoreResult<Option<Package>>;
    async fn find_with_itinerary(
        &self,
        package_id: Uuid,
    ) -> StoreResult<Option<PackageWithItinerary>>;
    async fn list(
        &self,
        filter: &PackageFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Package>, i64)>;
    async fn create(&self, package: &NewPackage) -> StoreResult<Package>;
    async fn update(
        &self,
        package_id: Uuid,
        update: &PackageUpdate,
    ) -> StoreResult<Option<Package>>;
    /// Transactional replace of the whole itinerary.
    async fn replace_itinerary(
        &self,
        package_id: Uuid,
        itinerary: &[ItineraryItem],
    ) -> StoreResult<()>;
    async fn publish(&self, package_id: Uuid) -> StoreResult<bool>;
    async fn unpublish(&self, package_id: Uuid) -> StoreResult<bool>;
    /// Clone a package and its itinerary under a new title, as a draft.
    async fn duplicate(
        &self,
        package_id: Uuid,
        new_title: Option<&str>,
        created_by: Uuid,
    ) -> StoreResult<Option<Uuid>>;
    async fn delete(&self, package_id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_by_id(&self, booking_id: Uuid) -> StoreResult<Option<BookingWithRelations>>;
    async fn list(
        &self,
        filter: &BookingFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<BookingSummary>, i64)>;
    async fn list_for_traveler(&self, traveler_id: Uuid) -> StoreResult<Vec<BookingSummary>>;
    async fn create(&self, booking: &NewBooking) -> StoreResult<Uuid>;
    async fn update(&self, booking_id: Uuid, update: &BookingUpdate) -> StoreResult<bool>;
    /// Conditional confirm: updates only where status is not already
    /// `confirmed` and reports whether a row was changed. This is the
    /// guard that keeps two concurrent confirmations from both winning.
    async fn confirm(&self, booking_id: Uuid, admin_id: Uuid) -> StoreResult<bool>;
    async fn set_status(&self, booking_id: Uuid, status: BookingStatus) -> StoreResult<bool>;
    async fn stats(&self) -> StoreResult<BookingStats>;
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn find_by_id(&self, request_id: Uuid) -> StoreResult<Option<PackageRequest>>;
    async fn list(
        &self,
        filter: &RequestFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<PackageRequest>, i64)>;
    async fn list_for_traveler(&self, traveler_id: Uuid) -> StoreResult<Vec<PackageRequest>>;
    async fn create(&self, request: &NewPackageRequest) -> StoreResult<Uuid>;
    async fn set_status(
        &self,
        request_id: Uuid,
        status: RequestStatus,
        admin_notes: Option<&str>,
    ) -> StoreResult<bool>;
    async fn approve(
        &self,
        request_id: Uuid,
        admin_id: Uuid,
        package_id: Option<Uuid>,
        admin_notes: Option<&str>,
    ) -> StoreResult<bool>;
    async fn reject(
        &self,
        request_id: Uuid,
        admin_id: Uuid,
        admin_notes: Option<&str>,
    ) -> StoreResult<bool>;
    async fn stats(&self) -> StoreResult<RequestStats>;
}
