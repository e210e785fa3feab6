//! In-memory `BookingStore` for unit and router tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::models::{
    Booking, BookingSource, BookingStatus, BookingUpdate, DurationType, NewBooking,
    PaymentStatus, Room, RoomStatus, RoomType, Settings,
};
use super::store::{BookingFilter, BookingStore, DateField, ReservationSlot};

pub struct MemoryStore {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    rooms: Mutex<Vec<Room>>,
    bookings: Mutex<Vec<Booking>>,
    settings: Mutex<HashMap<Uuid, Settings>>,
    members: Mutex<Vec<(Uuid, Uuid)>>,
    failing: AtomicBool,
}

impl MemoryStore {
    /// Store with one organization and one member user
    pub fn new() -> Self {
        let organization_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        Self {
            organization_id,
            user_id,
            rooms: Mutex::new(Vec::new()),
            bookings: Mutex::new(Vec::new()),
            settings: Mutex::new(HashMap::new()),
            members: Mutex::new(vec![(organization_id, user_id)]),
            failing: AtomicBool::new(false),
        }
    }

    /// Add an available AC room at 500/hour and 4500/day
    pub fn add_room(&self) -> Uuid {
        self.add_room_with(|_| {})
    }

    pub fn add_room_with(&self, customize: impl FnOnce(&mut Room)) -> Uuid {
        let mut room = Room {
            id: Uuid::new_v4(),
            organization_id: self.organization_id,
            room_name: "Room".to_string(),
            room_type: RoomType::Ac,
            hourly_rate: dec!(500),
            daily_rate: dec!(4500),
            status: RoomStatus::Available,
            is_active: true,
        };
        customize(&mut room);
        let id = room.id;
        self.rooms.lock().unwrap().push(room);
        id
    }

    pub fn add_reservation(
        &self,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        status: BookingStatus,
    ) -> Uuid {
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            organization_id: self.organization_id,
            room_id,
            customer_id: Uuid::new_v4(),
            check_in_date: check_in,
            check_out_date: check_out,
            duration_type: DurationType::Days,
            duration_value: 1,
            room_rate: dec!(4500),
            subtotal: dec!(4500),
            advance_paid: dec!(0),
            balance: dec!(4500),
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            booking_source: BookingSource::Walkin,
            notes: None,
            status,
            created_at: now,
            updated_at: now,
        };
        let id = booking.id;
        self.bookings.lock().unwrap().push(booking);
        id
    }

    pub fn set_settings(&self, settings: Settings) {
        self.settings
            .lock()
            .unwrap()
            .insert(settings.organization_id, settings);
    }

    /// Make every read return an error
    pub fn fail_reads(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn booking_count(&self) -> usize {
        self.bookings.lock().unwrap().len()
    }

    fn check_reads(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Internal("store unavailable".to_string()));
        }
        Ok(())
    }

    fn with_booking(
        &self,
        organization_id: Uuid,
        booking_id: Uuid,
        apply: impl FnOnce(&mut Booking),
    ) -> Result<Booking> {
        let mut bookings = self.bookings.lock().unwrap();
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == booking_id && b.organization_id == organization_id)
            .ok_or(AppError::NotFound)?;
        apply(booking);
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn is_org_member(&self, organization_id: Uuid, user_id: Uuid) -> Result<bool> {
        self.check_reads()?;
        Ok(self
            .members
            .lock()
            .unwrap()
            .contains(&(organization_id, user_id)))
    }

    async fn fetch_overlapping_reservations(
        &self,
        organization_id: Uuid,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        statuses: &[BookingStatus],
    ) -> Result<Vec<ReservationSlot>> {
        self.check_reads()?;
        let mut slots: Vec<ReservationSlot> = self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.organization_id == organization_id && b.room_id == room_id)
            .filter(|b| statuses.contains(&b.status))
            .filter(|b| b.check_in_date < end && b.check_out_date > start)
            .map(|b| ReservationSlot {
                id: b.id,
                check_in: b.check_in_date,
                check_out: b.check_out_date,
            })
            .collect();
        slots.sort_by_key(|s| s.check_in);
        Ok(slots)
    }

    async fn get_room(&self, organization_id: Uuid, room_id: Uuid) -> Result<Option<Room>> {
        self.check_reads()?;
        Ok(self
            .rooms
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == room_id && r.organization_id == organization_id)
            .cloned())
    }

    async fn list_rooms(&self, organization_id: Uuid) -> Result<Vec<Room>> {
        self.check_reads()?;
        let mut rooms: Vec<Room> = self
            .rooms
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.organization_id == organization_id && r.is_active)
            .cloned()
            .collect();
        rooms.sort_by(|a, b| a.room_name.cmp(&b.room_name));
        Ok(rooms)
    }

    async fn list_bookings(
        &self,
        organization_id: Uuid,
        filter: &BookingFilter,
    ) -> Result<Vec<Booking>> {
        self.check_reads()?;
        let date_of = |b: &Booking, field: DateField| match field {
            DateField::CheckIn => b.check_in_date,
            DateField::CheckOut => b.check_out_date,
        };

        let mut bookings: Vec<Booking> = self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.organization_id == organization_id)
            .filter(|b| filter.statuses.is_empty() || filter.statuses.contains(&b.status))
            .filter(|b| filter.room_id.map_or(true, |room| b.room_id == room))
            .filter(|b| {
                filter.window.map_or(true, |w| {
                    let date = date_of(b, w.field);
                    date >= w.from && date < w.to
                })
            })
            .cloned()
            .collect();

        match filter.window {
            Some(w) => bookings.sort_by_key(|b| date_of(b, w.field)),
            None => bookings.sort_by(|a, b| b.check_in_date.cmp(&a.check_in_date)),
        }
        Ok(bookings)
    }

    async fn get_booking(
        &self,
        organization_id: Uuid,
        booking_id: Uuid,
    ) -> Result<Option<Booking>> {
        self.check_reads()?;
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == booking_id && b.organization_id == organization_id)
            .cloned())
    }

    async fn insert_booking(&self, organization_id: Uuid, new: &NewBooking) -> Result<Booking> {
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            organization_id,
            room_id: new.room_id,
            customer_id: new.customer_id,
            check_in_date: new.check_in_date,
            check_out_date: new.check_out_date,
            duration_type: new.duration_type,
            duration_value: new.duration_value,
            room_rate: new.room_rate,
            subtotal: new.subtotal,
            advance_paid: new.advance_paid,
            balance: new.balance,
            payment_status: new.payment_status,
            payment_method: new.payment_method,
            booking_source: new.booking_source,
            notes: new.notes.clone(),
            status: BookingStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.bookings.lock().unwrap().push(booking.clone());
        Ok(booking)
    }

    async fn update_booking(
        &self,
        organization_id: Uuid,
        booking_id: Uuid,
        update: &BookingUpdate,
    ) -> Result<Booking> {
        self.with_booking(organization_id, booking_id, |b| {
            b.check_in_date = update.check_in_date;
            b.check_out_date = update.check_out_date;
            b.duration_type = update.duration_type;
            b.duration_value = update.duration_value;
            b.room_rate = update.room_rate;
            b.subtotal = update.subtotal;
            b.advance_paid = update.advance_paid;
            b.balance = update.balance;
            b.payment_status = update.payment_status;
            b.payment_method = update.payment_method;
            b.notes = update.notes.clone();
        })
    }

    async fn set_booking_status(
        &self,
        organization_id: Uuid,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking> {
        self.with_booking(organization_id, booking_id, |b| b.status = status)
    }

    async fn get_settings(&self, organization_id: Uuid) -> Result<Option<Settings>> {
        self.check_reads()?;
        Ok(self.settings.lock().unwrap().get(&organization_id).cloned())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<Settings> {
        self.set_settings(settings.clone());
        Ok(settings.clone())
    }
}
