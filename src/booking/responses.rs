//! Response DTOs for booking API endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::calculators::format_currency;
use super::models::DurationType;

/// Success envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
    /// Display string, e.g. `LKR 3,450.00`
    pub formatted: String,
}

impl MoneyResponse {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
            formatted: format_currency(amount, currency),
        }
    }
}

/// Response for a price quote
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub room_id: Uuid,
    pub duration_type: DurationType,
    pub duration_value: i64,
    pub rate: MoneyResponse,
    pub base_price: MoneyResponse,
    pub tax_amount: MoneyResponse,
    pub service_charge: MoneyResponse,
    pub total_price: MoneyResponse,
    pub available: bool,
}

/// Response for an availability check
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub room_id: Uuid,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub available: bool,
}

/// Response for a room occupancy report
#[derive(Debug, Serialize)]
pub struct OccupancyResponse {
    pub room_id: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub booked_days: i64,
    pub total_days: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub occupancy_rate: Decimal,
}

/// Response for a revenue report
#[derive(Debug, Serialize)]
pub struct RevenueResponse {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub booking_count: usize,
    pub revenue: MoneyResponse,
}
