//! Booking engine for the guesthouse dashboard.
//!
//! Prices stays, checks room availability and manages the booking
//! lifecycle. Every store access is scoped to one organization through
//! [`BookingContext`].

pub mod availability;
pub mod calculators;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod store;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used items
pub use availability::is_room_available;
pub use calculators::{
    checked_price, compute_duration, compute_price, format_currency, round_money, PriceBreakdown,
};
pub use queries::PgBookingStore;
pub use routes::router;
pub use store::{BookingContext, BookingStore};
pub use validation::{validate_booking, BookingValidationError};
