//! Domain models for rooms, bookings and tenant settings.
//!
//! Enum columns are stored as upper-case text by the backend; each enum
//! round-trips through `as_str` / `FromStr` so the rows in `queries` can
//! stay plain `String`s.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error returned when a text column holds an unknown enum value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(
    /// Billing mode: priced per hour or per day
    DurationType, "duration_type" {
        Hours => "HOURS",
        Days => "DAYS",
    }
);

text_enum!(
    RoomType, "room_type" {
        Ac => "AC",
        NonAc => "NON_AC",
    }
);

text_enum!(
    RoomStatus, "room_status" {
        Available => "AVAILABLE",
        Occupied => "OCCUPIED",
        Maintenance => "MAINTENANCE",
        Blocked => "BLOCKED",
    }
);

text_enum!(
    BookingStatus, "booking_status" {
        Active => "ACTIVE",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
);

text_enum!(
    PaymentStatus, "payment_status" {
        Pending => "PENDING",
        Partial => "PARTIAL",
        Paid => "PAID",
    }
);

text_enum!(
    PaymentMethod, "payment_method" {
        Cash => "CASH",
        Bank => "BANK",
        Digital => "DIGITAL",
    }
);

text_enum!(
    BookingSource, "booking_source" {
        Walkin => "WALKIN",
        Phone => "PHONE",
        Online => "ONLINE",
    }
);

/// Room from the rooms table
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub room_name: String,
    pub room_type: RoomType,
    #[serde(with = "rust_decimal::serde::str")]
    pub hourly_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub daily_rate: Decimal,
    pub status: RoomStatus,
    pub is_active: bool,
}

impl Room {
    /// Rate charged per unit for the given billing mode
    pub fn rate_for(&self, mode: DurationType) -> Decimal {
        match mode {
            DurationType::Hours => self.hourly_rate,
            DurationType::Days => self.daily_rate,
        }
    }

    /// Whether new bookings may be placed on this room at all
    pub fn is_bookable(&self) -> bool {
        self.is_active && !matches!(self.status, RoomStatus::Maintenance | RoomStatus::Blocked)
    }
}

/// Booking from the bookings table
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub room_id: Uuid,
    pub customer_id: Uuid,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub duration_type: DurationType,
    pub duration_value: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub room_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub advance_paid: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub booking_source: BookingSource,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a booking about to be inserted
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub room_id: Uuid,
    pub customer_id: Uuid,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub duration_type: DurationType,
    pub duration_value: i64,
    pub room_rate: Decimal,
    pub subtotal: Decimal,
    pub advance_paid: Decimal,
    pub balance: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub booking_source: BookingSource,
    pub notes: Option<String>,
}

/// Mutable fields of an existing booking, written back as a whole
#[derive(Debug, Clone)]
pub struct BookingUpdate {
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub duration_type: DurationType,
    pub duration_value: i64,
    pub room_rate: Decimal,
    pub subtotal: Decimal,
    pub advance_paid: Decimal,
    pub balance: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

/// Per-organization settings
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub organization_id: Uuid,
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
    #[serde(with = "rust_decimal::serde::str_option")]
    pub tax_percentage: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub service_charge_percentage: Option<Decimal>,
}

impl Settings {
    /// Settings used for an organization that has not saved any yet
    pub fn defaults(organization_id: Uuid, currency: &str) -> Self {
        Self {
            organization_id,
            business_name: "My Guesthouse".to_string(),
            currency: currency.to_string(),
            timezone: "Asia/Colombo".to_string(),
            default_ac_hourly_rate: Decimal::ZERO,
            default_ac_daily_rate: Decimal::ZERO,
            default_nonac_hourly_rate: Decimal::ZERO,
            default_nonac_daily_rate: Decimal::ZERO,
            tax_percentage: None,
            service_charge_percentage: None,
        }
    }

    /// Default rate configured for a room type and billing mode
    pub fn default_rate(&self, room_type: RoomType, mode: DurationType) -> Decimal {
        match (room_type, mode) {
            (RoomType::Ac, DurationType::Hours) => self.default_ac_hourly_rate,
            (RoomType::Ac, DurationType::Days) => self.default_ac_daily_rate,
            (RoomType::NonAc, DurationType::Hours) => self.default_nonac_hourly_rate,
            (RoomType::NonAc, DurationType::Days) => self.default_nonac_daily_rate,
        }
    }
}
