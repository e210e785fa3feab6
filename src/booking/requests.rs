//! Request DTOs for booking API endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::models::{BookingSource, BookingStatus, DurationType, PaymentMethod};

/// Request to price a stay without booking it
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub room_id: Uuid,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub duration_type: DurationType,
    /// Computed from the interval when omitted
    #[serde(default)]
    pub duration_value: Option<i64>,
    /// Booking being edited, ignored by the availability check
    #[serde(default)]
    pub exclude_booking_id: Option<Uuid>,
}

/// Query parameters for a room availability check
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    #[serde(default)]
    pub exclude_booking_id: Option<Uuid>,
}

/// Query parameters for a room occupancy report
#[derive(Debug, Deserialize)]
pub struct OccupancyQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Query parameters for listing rooms free over an interval
#[derive(Debug, Deserialize)]
pub struct RoomSearchQuery {
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
}

/// Query parameters for the booking list
#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub room_id: Option<Uuid>,
}

/// Look-ahead for upcoming check-ins and check-outs
#[derive(Debug, Deserialize)]
pub struct LookaheadQuery {
    #[serde(default)]
    pub hours: Option<i64>,
}

/// Query parameters for a revenue report
#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Request to create a booking
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub room_id: Uuid,
    pub customer_id: Uuid,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub duration_type: DurationType,
    pub duration_value: i64,
    #[serde(default, with = "rust_decimal::serde::str")]
    pub advance_paid: Decimal,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default = "default_booking_source")]
    pub booking_source: BookingSource,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_booking_source() -> BookingSource {
    BookingSource::Walkin
}

/// Request to edit an existing booking; omitted fields keep their value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookingRequest {
    #[serde(default)]
    pub check_in_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub check_out_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_type: Option<DurationType>,
    #[serde(default)]
    pub duration_value: Option<i64>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub advance_paid: Option<Decimal>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request to replace the organization's settings
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub business_name: String,
    pub currency: String,
    pub timezone: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub default_ac_hourly_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub default_ac_daily_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub default_nonac_hourly_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub default_nonac_daily_rate: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub tax_percentage: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub service_charge_percentage: Option<Decimal>,
}
