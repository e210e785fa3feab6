//! Booking service functions with store access.
//!
//! These combine the pure calculators with the store: every write is
//! preceded by validation, pricing and an availability check.
//!
//! The availability check and the insert are two separate store calls, so
//! two concurrent requests for the same room and dates can both pass.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::{AppError, Result};

use super::availability::is_room_available;
use super::calculators::{
    checked_price, compute_duration, occupancy_rate, payment_status_for, PriceBreakdown,
};
use super::models::{
    Booking, BookingStatus, BookingUpdate, DurationType, NewBooking, Room, Settings,
};
use super::requests::{
    CreateBookingRequest, QuoteRequest, UpdateBookingRequest, UpdateSettingsRequest,
};
use super::store::{BookingContext, BookingFilter, DateField, DateWindow};
use super::validation::{validate_booking_at, validate_schedule, BookingValidationError};

/// Largest default rate a tenant may configure
const MAX_DEFAULT_RATE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Result of a price quote
#[derive(Debug, Clone)]
pub struct QuoteResult {
    pub duration_value: i64,
    pub rate: Decimal,
    pub price: PriceBreakdown,
    pub available: bool,
}

/// Revenue booked over a period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevenueResult {
    pub booking_count: usize,
    pub revenue: Decimal,
}

/// Look-ahead used for upcoming check-ins and check-outs
pub const DEFAULT_LOOKAHEAD_HOURS: i64 = 4;
const MAX_LOOKAHEAD_HOURS: i64 = 7 * 24;

/// Result of an occupancy report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyResult {
    pub booked_days: i64,
    pub total_days: i64,
    pub occupancy_rate: Decimal,
}

/// Rate for a room, falling back to the settings default when the room has none
pub fn resolve_rate(room: &Room, settings: &Settings, mode: DurationType) -> Decimal {
    let rate = room.rate_for(mode);
    if rate.is_zero() {
        settings.default_rate(room.room_type, mode)
    } else {
        rate
    }
}

fn price_for(settings: &Settings, duration_value: i64, rate: Decimal) -> Result<PriceBreakdown> {
    checked_price(
        duration_value,
        rate,
        settings.tax_percentage,
        settings.service_charge_percentage,
    )
    .ok_or_else(|| {
        AppError::BadRequest("Price is outside the supported range".to_string())
    })
}

fn check_advance(advance_paid: Decimal, total_price: Decimal) -> Result<()> {
    if advance_paid < Decimal::ZERO || advance_paid > total_price {
        return Err(AppError::BadRequest(
            "Advance payment must be between 0 and the total price".to_string(),
        ));
    }
    Ok(())
}

fn ensure_active(booking: &Booking) -> Result<()> {
    if booking.status != BookingStatus::Active {
        return Err(AppError::Conflict(format!(
            "Booking is already {}",
            booking.status.as_str().to_lowercase()
        )));
    }
    Ok(())
}

async fn load_room(ctx: BookingContext<'_>, room_id: Uuid) -> Result<Room> {
    ctx.store
        .get_room(ctx.tenant_id, room_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// Fetch one booking of the tenant
pub async fn load_booking(ctx: BookingContext<'_>, booking_id: Uuid) -> Result<Booking> {
    ctx.store
        .get_booking(ctx.tenant_id, booking_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// Price a stay and report whether the room is free for it
pub async fn quote(
    ctx: BookingContext<'_>,
    settings: &Settings,
    req: &QuoteRequest,
) -> Result<QuoteResult> {
    if req.check_out_date <= req.check_in_date {
        return Err(BookingValidationError::InvertedRange.into());
    }

    let duration_value = match req.duration_value {
        Some(value) => {
            validate_schedule(req.check_in_date, req.check_out_date, value, req.duration_type)?;
            value
        }
        None => compute_duration(req.check_in_date, req.check_out_date, req.duration_type),
    };

    let room = load_room(ctx, req.room_id).await?;
    let rate = resolve_rate(&room, settings, req.duration_type);
    let price = price_for(settings, duration_value, rate)?;

    let available = room.is_bookable()
        && is_room_available(
            ctx,
            room.id,
            req.check_in_date,
            req.check_out_date,
            req.exclude_booking_id,
        )
        .await;

    debug!(
        "Quoted room {} for {} {}: total {}",
        room.id, duration_value, req.duration_type, price.total_price
    );

    Ok(QuoteResult {
        duration_value,
        rate,
        price,
        available,
    })
}

/// Validate, price and store a new booking
pub async fn create_booking(
    ctx: BookingContext<'_>,
    settings: &Settings,
    req: &CreateBookingRequest,
    now: DateTime<Utc>,
) -> Result<Booking> {
    validate_booking_at(
        req.check_in_date,
        req.check_out_date,
        req.duration_value,
        req.duration_type,
        now,
    )?;

    let room = load_room(ctx, req.room_id).await?;
    if !room.is_bookable() {
        return Err(AppError::Conflict(format!(
            "Room {} is not open for bookings",
            room.room_name
        )));
    }

    let rate = resolve_rate(&room, settings, req.duration_type);
    let price = price_for(settings, req.duration_value, rate)?;
    check_advance(req.advance_paid, price.total_price)?;

    if !is_room_available(ctx, room.id, req.check_in_date, req.check_out_date, None).await {
        warn!(
            "Rejected booking for room {}: not available {} - {}",
            room.id, req.check_in_date, req.check_out_date
        );
        return Err(AppError::Conflict(
            "Room is not available for the selected dates".to_string(),
        ));
    }

    let new_booking = NewBooking {
        room_id: room.id,
        customer_id: req.customer_id,
        check_in_date: req.check_in_date,
        check_out_date: req.check_out_date,
        duration_type: req.duration_type,
        duration_value: req.duration_value,
        room_rate: rate,
        subtotal: price.total_price,
        advance_paid: req.advance_paid,
        balance: price.total_price - req.advance_paid,
        payment_status: payment_status_for(price.total_price, req.advance_paid),
        payment_method: req.payment_method,
        booking_source: req.booking_source,
        notes: req.notes.clone(),
    };

    let booking = ctx.store.insert_booking(ctx.tenant_id, &new_booking).await?;
    info!(
        "Created booking {} for room {} ({} {}, total {})",
        booking.id, room.id, booking.duration_value, booking.duration_type, booking.subtotal
    );

    Ok(booking)
}

/// Edit an active booking.
///
/// Schedule changes are re-validated, re-priced at the booking's rate and
/// re-checked for availability with the booking itself excluded. The
/// past check-in rule only applies when the check-in moves.
pub async fn update_booking(
    ctx: BookingContext<'_>,
    settings: &Settings,
    booking_id: Uuid,
    req: &UpdateBookingRequest,
    now: DateTime<Utc>,
) -> Result<Booking> {
    let existing = load_booking(ctx, booking_id).await?;
    ensure_active(&existing)?;

    let check_in = req.check_in_date.unwrap_or(existing.check_in_date);
    let check_out = req.check_out_date.unwrap_or(existing.check_out_date);
    let mode = req.duration_type.unwrap_or(existing.duration_type);
    let duration_value = req.duration_value.unwrap_or(existing.duration_value);

    let schedule_changed = check_in != existing.check_in_date
        || check_out != existing.check_out_date
        || mode != existing.duration_type
        || duration_value != existing.duration_value;

    if check_in != existing.check_in_date {
        validate_booking_at(check_in, check_out, duration_value, mode, now)?;
    } else if schedule_changed {
        validate_schedule(check_in, check_out, duration_value, mode)?;
    }

    let (room_rate, subtotal) = if schedule_changed {
        let rate = if mode == existing.duration_type {
            existing.room_rate
        } else {
            let room = load_room(ctx, existing.room_id).await?;
            resolve_rate(&room, settings, mode)
        };
        (rate, price_for(settings, duration_value, rate)?.total_price)
    } else {
        (existing.room_rate, existing.subtotal)
    };

    let advance_paid = req.advance_paid.unwrap_or(existing.advance_paid);
    check_advance(advance_paid, subtotal)?;

    if schedule_changed
        && !is_room_available(ctx, existing.room_id, check_in, check_out, Some(existing.id)).await
    {
        return Err(AppError::Conflict(
            "Room is not available for the selected dates".to_string(),
        ));
    }

    let update = BookingUpdate {
        check_in_date: check_in,
        check_out_date: check_out,
        duration_type: mode,
        duration_value,
        room_rate,
        subtotal,
        advance_paid,
        balance: subtotal - advance_paid,
        payment_status: payment_status_for(subtotal, advance_paid),
        payment_method: req.payment_method.or(existing.payment_method),
        notes: req.notes.clone().or(existing.notes),
    };

    let booking = ctx
        .store
        .update_booking(ctx.tenant_id, booking_id, &update)
        .await?;
    info!("Updated booking {}", booking.id);

    Ok(booking)
}

/// Move an active booking to COMPLETED or CANCELLED
pub async fn close_booking(
    ctx: BookingContext<'_>,
    booking_id: Uuid,
    status: BookingStatus,
) -> Result<Booking> {
    if status == BookingStatus::Active {
        return Err(AppError::BadRequest(
            "Bookings can only be completed or cancelled".to_string(),
        ));
    }

    let existing = load_booking(ctx, booking_id).await?;
    ensure_active(&existing)?;

    let booking = ctx
        .store
        .set_booking_status(ctx.tenant_id, booking_id, status)
        .await?;
    info!("Booking {} marked {}", booking.id, status);

    Ok(booking)
}

/// Share of `[from, to)` a room spent booked, counting active and completed stays
pub async fn room_occupancy(
    ctx: BookingContext<'_>,
    room_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<OccupancyResult> {
    if to <= from {
        return Err(AppError::BadRequest(
            "Report end must be after its start".to_string(),
        ));
    }

    let room = load_room(ctx, room_id).await?;
    let slots = ctx
        .store
        .fetch_overlapping_reservations(
            ctx.tenant_id,
            room.id,
            from,
            to,
            &[BookingStatus::Active, BookingStatus::Completed],
        )
        .await?;

    let total_days = compute_duration(from, to, DurationType::Days);
    let booked_days: i64 = slots
        .iter()
        .map(|slot| {
            compute_duration(
                slot.check_in.max(from),
                slot.check_out.min(to),
                DurationType::Days,
            )
        })
        .sum();
    let booked_days = booked_days.min(total_days);

    Ok(OccupancyResult {
        booked_days,
        total_days,
        occupancy_rate: occupancy_rate(booked_days, total_days),
    })
}

/// Bookable rooms of the tenant with no active stay overlapping the interval.
///
/// A room whose availability cannot be determined is left out.
pub async fn available_rooms(
    ctx: BookingContext<'_>,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> Result<Vec<Room>> {
    if check_out <= check_in {
        return Err(BookingValidationError::InvertedRange.into());
    }

    let rooms = ctx.store.list_rooms(ctx.tenant_id).await?;
    let mut available = Vec::with_capacity(rooms.len());
    for room in rooms.into_iter().filter(Room::is_bookable) {
        if is_room_available(ctx, room.id, check_in, check_out, None).await {
            available.push(room);
        }
    }

    debug!(
        "{} room(s) available {} - {}",
        available.len(),
        check_in,
        check_out
    );
    Ok(available)
}

/// Bookings of the tenant matching `filter`
pub async fn list_bookings(
    ctx: BookingContext<'_>,
    filter: &BookingFilter,
) -> Result<Vec<Booking>> {
    if let Some(window) = filter.window {
        if window.to <= window.from {
            return Err(AppError::BadRequest(
                "Window end must be after its start".to_string(),
            ));
        }
    }
    ctx.store.list_bookings(ctx.tenant_id, filter).await
}

/// Active bookings checking in on the UTC calendar day of `now`
pub async fn todays_bookings(
    ctx: BookingContext<'_>,
    now: DateTime<Utc>,
) -> Result<Vec<Booking>> {
    let today = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let filter = BookingFilter {
        statuses: vec![BookingStatus::Active],
        room_id: None,
        window: Some(DateWindow {
            field: DateField::CheckIn,
            from: today,
            to: today + Duration::days(1),
        }),
    };
    ctx.store.list_bookings(ctx.tenant_id, &filter).await
}

fn upcoming_filter(field: DateField, now: DateTime<Utc>, hours: i64) -> Result<BookingFilter> {
    if !(1..=MAX_LOOKAHEAD_HOURS).contains(&hours) {
        return Err(AppError::BadRequest(format!(
            "hours must be between 1 and {}",
            MAX_LOOKAHEAD_HOURS
        )));
    }
    Ok(BookingFilter {
        statuses: vec![BookingStatus::Active],
        room_id: None,
        window: Some(DateWindow {
            field,
            from: now,
            to: now + Duration::hours(hours),
        }),
    })
}

/// Active bookings checking in within the next `hours`
pub async fn upcoming_check_ins(
    ctx: BookingContext<'_>,
    now: DateTime<Utc>,
    hours: i64,
) -> Result<Vec<Booking>> {
    let filter = upcoming_filter(DateField::CheckIn, now, hours)?;
    ctx.store.list_bookings(ctx.tenant_id, &filter).await
}

/// Active bookings checking out within the next `hours`
pub async fn upcoming_check_outs(
    ctx: BookingContext<'_>,
    now: DateTime<Utc>,
    hours: i64,
) -> Result<Vec<Booking>> {
    let filter = upcoming_filter(DateField::CheckOut, now, hours)?;
    ctx.store.list_bookings(ctx.tenant_id, &filter).await
}

/// Sum of subtotals of active and completed bookings checking in during `[from, to)`
pub async fn revenue_for_range(
    ctx: BookingContext<'_>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<RevenueResult> {
    if to <= from {
        return Err(AppError::BadRequest(
            "Report end must be after its start".to_string(),
        ));
    }

    let filter = BookingFilter {
        statuses: vec![BookingStatus::Active, BookingStatus::Completed],
        room_id: None,
        window: Some(DateWindow {
            field: DateField::CheckIn,
            from,
            to,
        }),
    };
    let bookings = ctx.store.list_bookings(ctx.tenant_id, &filter).await?;

    let revenue = bookings
        .iter()
        .try_fold(Decimal::ZERO, |sum, b| sum.checked_add(b.subtotal))
        .ok_or_else(|| AppError::Internal("Revenue total overflowed".to_string()))?;

    Ok(RevenueResult {
        booking_count: bookings.len(),
        revenue,
    })
}

/// Settings of the tenant, from cache when possible
pub async fn load_settings(
    ctx: BookingContext<'_>,
    cache: &AppCache,
    default_currency: &str,
) -> Result<Arc<Settings>> {
    if let Some(cached) = cache.settings.get(&ctx.tenant_id).await {
        debug!("Cache HIT for settings: {}", ctx.tenant_id);
        return Ok(cached);
    }

    debug!("Cache MISS for settings: {}", ctx.tenant_id);
    let settings = ctx
        .store
        .get_settings(ctx.tenant_id)
        .await?
        .unwrap_or_else(|| Settings::defaults(ctx.tenant_id, default_currency));
    let settings = Arc::new(settings);
    cache
        .settings
        .insert(ctx.tenant_id, Arc::clone(&settings))
        .await;

    Ok(settings)
}

/// Replace the tenant's settings and drop the cached copy
pub async fn update_settings(
    ctx: BookingContext<'_>,
    cache: &AppCache,
    req: &UpdateSettingsRequest,
) -> Result<Settings> {
    let mut errors = Vec::new();

    let currency = req.currency.trim().to_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        errors.push("currency must be a three-letter code".to_string());
    }
    if req.business_name.trim().is_empty() {
        errors.push("business_name is required".to_string());
    }
    for (name, rate) in [
        ("default_ac_hourly_rate", req.default_ac_hourly_rate),
        ("default_ac_daily_rate", req.default_ac_daily_rate),
        ("default_nonac_hourly_rate", req.default_nonac_hourly_rate),
        ("default_nonac_daily_rate", req.default_nonac_daily_rate),
    ] {
        if rate < Decimal::ZERO || rate > MAX_DEFAULT_RATE {
            errors.push(format!("{} must be between 0 and {}", name, MAX_DEFAULT_RATE));
        }
    }
    for (name, percent) in [
        ("tax_percentage", req.tax_percentage),
        ("service_charge_percentage", req.service_charge_percentage),
    ] {
        if let Some(p) = percent {
            if p < Decimal::ZERO || p > Decimal::ONE_HUNDRED {
                errors.push(format!("{} must be between 0 and 100", name));
            }
        }
    }

    if !errors.is_empty() {
        return Err(AppError::BadRequest(errors.join("; ")));
    }

    let settings = Settings {
        organization_id: ctx.tenant_id,
        business_name: req.business_name.trim().to_string(),
        currency,
        timezone: req.timezone.clone(),
        default_ac_hourly_rate: req.default_ac_hourly_rate,
        default_ac_daily_rate: req.default_ac_daily_rate,
        default_nonac_hourly_rate: req.default_nonac_hourly_rate,
        default_nonac_daily_rate: req.default_nonac_daily_rate,
        tax_percentage: req.tax_percentage,
        service_charge_percentage: req.service_charge_percentage,
    };

    let saved = ctx.store.save_settings(&settings).await?;
    cache.invalidate_settings(ctx.tenant_id).await;

    Ok(saved)
}
