//! Core booking calculation functions.
//!
//! Pure functions for duration, price and display math - no database access.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;

use super::models::{DurationType, PaymentStatus};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Round to specified decimal places, with midpoints going toward positive infinity.
///
/// This is the rounding the dashboard has always applied to money, so
/// `2.5` becomes `3` while `-2.5` becomes `-2`.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use bimbara_web::booking::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(-2.5), 0), dec!(-2));
/// assert_eq!(round_money(dec!(1.005), 2), dec!(1.01));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    let strategy = if amount.is_sign_negative() {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };
    amount.round_dp_with_strategy(places, strategy)
}

/// Number of billable units between check-in and check-out.
///
/// A partial hour or day is billed as a full one. The caller is responsible
/// for rejecting `check_out <= check_in` beforehand.
pub fn compute_duration(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    mode: DurationType,
) -> i64 {
    let elapsed_ms = check_out
        .signed_duration_since(check_in)
        .num_milliseconds();

    let unit_ms = match mode {
        DurationType::Hours => MILLIS_PER_HOUR,
        DurationType::Days => MILLIS_PER_DAY,
    };

    // Integer division truncates toward zero, which is already the ceiling
    // for negative spans
    let units = elapsed_ms / unit_ms;
    if elapsed_ms % unit_ms > 0 {
        units + 1
    } else {
        units
    }
}

/// Price breakdown for a stay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub service_charge: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
}

/// Calculate a booking price from duration, rate and surcharge percentages.
///
/// Each field is rounded to 2 places on its own, from unrounded
/// intermediates. A missing or zero percentage adds nothing.
pub fn compute_price(
    duration_units: i64,
    rate: Decimal,
    tax_percent: Option<Decimal>,
    service_charge_percent: Option<Decimal>,
) -> PriceBreakdown {
    let base_price = rate * Decimal::from(duration_units);

    let surcharge = |percent: Option<Decimal>| match percent {
        Some(p) if !p.is_zero() => base_price * p / Decimal::ONE_HUNDRED,
        _ => Decimal::ZERO,
    };

    let tax_amount = surcharge(tax_percent);
    let service_charge = surcharge(service_charge_percent);
    let total_price = base_price + tax_amount + service_charge;

    PriceBreakdown {
        base_price: round_money(base_price, 2),
        tax_amount: round_money(tax_amount, 2),
        service_charge: round_money(service_charge, 2),
        total_price: round_money(total_price, 2),
    }
}

/// [`compute_price`] that returns `None` instead of overflowing.
///
/// Rounding matches [`compute_price`] exactly.
pub fn checked_price(
    duration_units: i64,
    rate: Decimal,
    tax_percent: Option<Decimal>,
    service_charge_percent: Option<Decimal>,
) -> Option<PriceBreakdown> {
    let base_price = rate.checked_mul(Decimal::from(duration_units))?;

    let surcharge = |percent: Option<Decimal>| match percent {
        Some(p) if !p.is_zero() => base_price
            .checked_mul(p)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED)),
        _ => Some(Decimal::ZERO),
    };

    let tax_amount = surcharge(tax_percent)?;
    let service_charge = surcharge(service_charge_percent)?;
    let total_price = base_price
        .checked_add(tax_amount)?
        .checked_add(service_charge)?;

    Some(PriceBreakdown {
        base_price: round_money(base_price, 2),
        tax_amount: round_money(tax_amount, 2),
        service_charge: round_money(service_charge, 2),
        total_price: round_money(total_price, 2),
    })
}

/// Payment status implied by how much of the subtotal was paid up front
pub fn payment_status_for(subtotal: Decimal, advance_paid: Decimal) -> PaymentStatus {
    if advance_paid >= subtotal {
        PaymentStatus::Paid
    } else if advance_paid > Decimal::ZERO {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Pending
    }
}

/// Occupancy percentage over a period, rounded to 2 places
pub fn occupancy_rate(booked_days: i64, total_days_in_period: i64) -> Decimal {
    if total_days_in_period == 0 {
        return Decimal::ZERO;
    }
    let rate = Decimal::from(booked_days) / Decimal::from(total_days_in_period)
        * Decimal::ONE_HUNDRED;
    round_money(rate, 2)
}

/// Format a money value for display, e.g. `$1,234.50` or `LKR 1,234.50`.
///
/// Uses en-US digit grouping and always two fraction digits. Codes without
/// a well-known symbol are printed followed by a no-break space.
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let rounded = round_money(amount, 2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let digits = format!("{:.2}", rounded.abs());
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let code = currency.to_uppercase();
    let prefix = match code.as_str() {
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "INR" => "₹".to_string(),
        "JPY" => "¥".to_string(),
        _ => format!("{}\u{a0}", code),
    };

    format!(
        "{}{}{}.{}",
        if negative { "-" } else { "" },
        prefix,
        grouped,
        fraction
    )
}
