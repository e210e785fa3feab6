//! Storage collaborator for the booking engine.
//!
//! The engine never reaches for a global client: every call receives a
//! [`BookingContext`] carrying the tenant and the store to query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;

use super::models::{Booking, BookingStatus, BookingUpdate, NewBooking, Room, Settings};

/// An existing reservation, reduced to what the overlap test needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationSlot {
    pub id: Uuid,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
}

/// Which booking date a [`DateWindow`] applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    CheckIn,
    CheckOut,
}

/// Half-open window `[from, to)` over one booking date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub field: DateField,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Criteria for listing bookings; empty criteria match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    /// Any of these statuses, or any status when empty
    pub statuses: Vec<BookingStatus>,
    pub room_id: Option<Uuid>,
    pub window: Option<DateWindow>,
}

/// Data access used by the booking services.
///
/// Every method is scoped to one organization; implementations must never
/// return rows belonging to another.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Whether the user is an active member of the organization
    async fn is_org_member(&self, organization_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// Reservations of a room in any of `statuses` that overlap `[start, end)`.
    ///
    /// Overlap is strict: `existing.check_in < end AND existing.check_out > start`.
    /// Results are ordered by check-in.
    async fn fetch_overlapping_reservations(
        &self,
        organization_id: Uuid,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        statuses: &[BookingStatus],
    ) -> Result<Vec<ReservationSlot>>;

    async fn get_room(&self, organization_id: Uuid, room_id: Uuid) -> Result<Option<Room>>;

    /// Active rooms of the organization, ordered by name
    async fn list_rooms(&self, organization_id: Uuid) -> Result<Vec<Room>>;

    /// Bookings matching `filter`.
    ///
    /// With a window, results are ordered by the windowed date ascending.
    /// Without one, the latest check-in comes first.
    async fn list_bookings(
        &self,
        organization_id: Uuid,
        filter: &BookingFilter,
    ) -> Result<Vec<Booking>>;

    async fn get_booking(&self, organization_id: Uuid, booking_id: Uuid)
        -> Result<Option<Booking>>;

    async fn insert_booking(&self, organization_id: Uuid, booking: &NewBooking) -> Result<Booking>;

    async fn update_booking(
        &self,
        organization_id: Uuid,
        booking_id: Uuid,
        update: &BookingUpdate,
    ) -> Result<Booking>;

    async fn set_booking_status(
        &self,
        organization_id: Uuid,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking>;

    async fn get_settings(&self, organization_id: Uuid) -> Result<Option<Settings>>;

    /// Insert or replace the organization's settings
    async fn save_settings(&self, settings: &Settings) -> Result<Settings>;
}

/// Tenant plus data store, passed explicitly into every engine call
#[derive(Clone, Copy)]
pub struct BookingContext<'a> {
    pub tenant_id: Uuid,
    pub store: &'a dyn BookingStore,
}

impl<'a> BookingContext<'a> {
    pub fn new(tenant_id: Uuid, store: &'a dyn BookingStore) -> Self {
        Self { tenant_id, store }
    }
}

impl std::fmt::Debug for BookingContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingContext")
            .field("tenant_id", &self.tenant_id)
            .finish_non_exhaustive()
    }
}
