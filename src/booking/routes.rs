//! Booking API route handlers

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;
use crate::tenant::TenantContext;
use crate::AppState;

use super::availability::is_room_available;
use super::models::{Booking, BookingStatus, Room, Settings};
use super::requests::{
    AvailabilityQuery, BookingListQuery, CreateBookingRequest, LookaheadQuery, OccupancyQuery,
    QuoteRequest, RevenueQuery, RoomSearchQuery, UpdateBookingRequest, UpdateSettingsRequest,
};
use super::responses::{
    ApiResponse, AvailabilityResponse, MoneyResponse, OccupancyResponse, QuoteResponse,
    RevenueResponse,
};
use super::services;
use super::store::BookingFilter;
use super::validation::BookingValidationError;

/// Router for all booking endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bookings/quote", post(quote))
        .route("/api/bookings", get(list_bookings).post(create_booking))
        .route("/api/bookings/today", get(todays_bookings))
        .route("/api/bookings/upcoming/check-ins", get(upcoming_check_ins))
        .route("/api/bookings/upcoming/check-outs", get(upcoming_check_outs))
        .route("/api/bookings/:id", get(get_booking).put(update_booking))
        .route("/api/bookings/:id/complete", post(complete_booking))
        .route("/api/bookings/:id/cancel", post(cancel_booking))
        .route("/api/rooms/available", get(available_rooms))
        .route("/api/rooms/:room_id/availability", get(room_availability))
        .route("/api/rooms/:room_id/occupancy", get(room_occupancy))
        .route("/api/revenue", get(revenue))
        .route("/api/settings", get(get_settings).put(update_settings))
}

async fn quote(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<ApiResponse<QuoteResponse>>> {
    let ctx = tenant.booking_context(&state);
    let settings = services::load_settings(ctx, &state.cache, &state.config.default_currency).await?;
    let result = services::quote(ctx, &settings, &req).await?;

    let currency = settings.currency.as_str();
    Ok(Json(ApiResponse::ok(QuoteResponse {
        room_id: req.room_id,
        duration_type: req.duration_type,
        duration_value: result.duration_value,
        rate: MoneyResponse::new(result.rate, currency),
        base_price: MoneyResponse::new(result.price.base_price, currency),
        tax_amount: MoneyResponse::new(result.price.tax_amount, currency),
        service_charge: MoneyResponse::new(result.price.service_charge, currency),
        total_price: MoneyResponse::new(result.price.total_price, currency),
        available: result.available,
    })))
}

async fn room_availability(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(room_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ApiResponse<AvailabilityResponse>>> {
    if query.check_out_date <= query.check_in_date {
        return Err(BookingValidationError::InvertedRange.into());
    }

    let available = is_room_available(
        tenant.booking_context(&state),
        room_id,
        query.check_in_date,
        query.check_out_date,
        query.exclude_booking_id,
    )
    .await;

    Ok(Json(ApiResponse::ok(AvailabilityResponse {
        room_id,
        check_in_date: query.check_in_date,
        check_out_date: query.check_out_date,
        available,
    })))
}

async fn room_occupancy(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(room_id): Path<Uuid>,
    Query(query): Query<OccupancyQuery>,
) -> Result<Json<ApiResponse<OccupancyResponse>>> {
    let result =
        services::room_occupancy(tenant.booking_context(&state), room_id, query.from, query.to)
            .await?;

    Ok(Json(ApiResponse::ok(OccupancyResponse {
        room_id,
        from: query.from,
        to: query.to,
        booked_days: result.booked_days,
        total_days: result.total_days,
        occupancy_rate: result.occupancy_rate,
    })))
}

async fn available_rooms(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<RoomSearchQuery>,
) -> Result<Json<ApiResponse<Vec<Room>>>> {
    let rooms = services::available_rooms(
        tenant.booking_context(&state),
        query.check_in_date,
        query.check_out_date,
    )
    .await?;
    Ok(Json(ApiResponse::ok(rooms)))
}

async fn list_bookings(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<ApiResponse<Vec<Booking>>>> {
    let filter = BookingFilter {
        statuses: query.status.into_iter().collect(),
        room_id: query.room_id,
        window: None,
    };
    let bookings = services::list_bookings(tenant.booking_context(&state), &filter).await?;
    Ok(Json(ApiResponse::ok(bookings)))
}

async fn todays_bookings(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> Result<Json<ApiResponse<Vec<Booking>>>> {
    let bookings = services::todays_bookings(tenant.booking_context(&state), Utc::now()).await?;
    Ok(Json(ApiResponse::ok(bookings)))
}

async fn upcoming_check_ins(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<LookaheadQuery>,
) -> Result<Json<ApiResponse<Vec<Booking>>>> {
    let hours = query.hours.unwrap_or(services::DEFAULT_LOOKAHEAD_HOURS);
    let bookings =
        services::upcoming_check_ins(tenant.booking_context(&state), Utc::now(), hours).await?;
    Ok(Json(ApiResponse::ok(bookings)))
}

async fn upcoming_check_outs(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<LookaheadQuery>,
) -> Result<Json<ApiResponse<Vec<Booking>>>> {
    let hours = query.hours.unwrap_or(services::DEFAULT_LOOKAHEAD_HOURS);
    let bookings =
        services::upcoming_check_outs(tenant.booking_context(&state), Utc::now(), hours).await?;
    Ok(Json(ApiResponse::ok(bookings)))
}

async fn revenue(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<RevenueQuery>,
) -> Result<Json<ApiResponse<RevenueResponse>>> {
    let ctx = tenant.booking_context(&state);
    let settings = services::load_settings(ctx, &state.cache, &state.config.default_currency).await?;
    let result = services::revenue_for_range(ctx, query.from, query.to).await?;

    Ok(Json(ApiResponse::ok(RevenueResponse {
        from: query.from,
        to: query.to,
        booking_count: result.booking_count,
        revenue: MoneyResponse::new(result.revenue, &settings.currency),
    })))
}

async fn create_booking(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<Booking>>> {
    let ctx = tenant.booking_context(&state);
    let settings = services::load_settings(ctx, &state.cache, &state.config.default_currency).await?;
    let booking = services::create_booking(ctx, &settings, &req, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

async fn get_booking(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Booking>>> {
    let booking = services::load_booking(tenant.booking_context(&state), id).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

async fn update_booking(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBookingRequest>,
) -> Result<Json<ApiResponse<Booking>>> {
    let ctx = tenant.booking_context(&state);
    let settings = services::load_settings(ctx, &state.cache, &state.config.default_currency).await?;
    let booking = services::update_booking(ctx, &settings, id, &req, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

async fn complete_booking(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Booking>>> {
    let booking =
        services::close_booking(tenant.booking_context(&state), id, BookingStatus::Completed)
            .await?;
    Ok(Json(ApiResponse::ok(booking)))
}

async fn cancel_booking(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Booking>>> {
    let booking =
        services::close_booking(tenant.booking_context(&state), id, BookingStatus::Cancelled)
            .await?;
    Ok(Json(ApiResponse::ok(booking)))
}

async fn get_settings(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> Result<Json<ApiResponse<Settings>>> {
    let settings = services::load_settings(
        tenant.booking_context(&state),
        &state.cache,
        &state.config.default_currency,
    )
    .await?;
    Ok(Json(ApiResponse::ok((*settings).clone())))
}

async fn update_settings(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<ApiResponse<Settings>>> {
    let settings =
        services::update_settings(tenant.booking_context(&state), &state.cache, &req).await?;
    Ok(Json(ApiResponse::ok(settings)))
}
