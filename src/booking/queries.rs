//! PostgreSQL implementation of the booking store.
//!
//! Every query is filtered by `organization_id`; rows never cross tenants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::models::{
    Booking, BookingStatus, BookingUpdate, NewBooking, ParseEnumError, PaymentMethod, Room,
    Settings,
};
use super::store::{BookingFilter, BookingStore, DateField, ReservationSlot};

const BOOKING_COLUMNS: &str = r#"
    id, organization_id, room_id, customer_id,
    check_in_date, check_out_date, duration_type, duration_value,
    room_rate, subtotal, advance_paid, balance,
    payment_status, payment_method, booking_source, notes, status,
    created_at, updated_at
"#;

const SETTINGS_COLUMNS: &str = r#"
    organization_id, business_name, currency, timezone,
    default_ac_hourly_rate, default_ac_daily_rate,
    default_nonac_hourly_rate, default_nonac_daily_rate,
    tax_percentage, service_charge_percentage
"#;

#[derive(Debug, FromRow)]
struct RoomRow {
    id: Uuid,
    organization_id: Uuid,
    room_name: String,
    room_type: String,
    hourly_rate: Decimal,
    daily_rate: Decimal,
    status: String,
    is_active: bool,
}

impl TryFrom<RoomRow> for Room {
    type Error = ParseEnumError;

    fn try_from(row: RoomRow) -> std::result::Result<Self, Self::Error> {
        Ok(Room {
            id: row.id,
            organization_id: row.organization_id,
            room_name: row.room_name,
            room_type: row.room_type.parse()?,
            hourly_rate: row.hourly_rate,
            daily_rate: row.daily_rate,
            status: row.status.parse()?,
            is_active: row.is_active,
        })
    }
}

#[derive(Debug, FromRow)]
struct BookingRow {
    id: Uuid,
    organization_id: Uuid,
    room_id: Uuid,
    customer_id: Uuid,
    check_in_date: DateTime<Utc>,
    check_out_date: DateTime<Utc>,
    duration_type: String,
    duration_value: i32,
    room_rate: Decimal,
    subtotal: Decimal,
    advance_paid: Decimal,
    balance: Decimal,
    payment_status: String,
    payment_method: Option<String>,
    booking_source: String,
    notes: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = ParseEnumError;

    fn try_from(row: BookingRow) -> std::result::Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            organization_id: row.organization_id,
            room_id: row.room_id,
            customer_id: row.customer_id,
            check_in_date: row.check_in_date,
            check_out_date: row.check_out_date,
            duration_type: row.duration_type.parse()?,
            duration_value: i64::from(row.duration_value),
            room_rate: row.room_rate,
            subtotal: row.subtotal,
            advance_paid: row.advance_paid,
            balance: row.balance,
            payment_status: row.payment_status.parse()?,
            payment_method: row
                .payment_method
                .as_deref()
                .map(str::parse::<PaymentMethod>)
                .transpose()?,
            booking_source: row.booking_source.parse()?,
            notes: row.notes,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SettingsRow {
    organization_id: Uuid,
    business_name: String,
    currency: String,
    timezone: String,
    default_ac_hourly_rate: Decimal,
    default_ac_daily_rate: Decimal,
    default_nonac_hourly_rate: Decimal,
    default_nonac_daily_rate: Decimal,
    tax_percentage: Option<Decimal>,
    service_charge_percentage: Option<Decimal>,
}

impl From<SettingsRow> for Settings {
    fn from(row: SettingsRow) -> Self {
        Settings {
            organization_id: row.organization_id,
            business_name: row.business_name,
            currency: row.currency,
            timezone: row.timezone,
            default_ac_hourly_rate: row.default_ac_hourly_rate,
            default_ac_daily_rate: row.default_ac_daily_rate,
            default_nonac_hourly_rate: row.default_nonac_hourly_rate,
            default_nonac_daily_rate: row.default_nonac_daily_rate,
            tax_percentage: row.tax_percentage,
            service_charge_percentage: row.service_charge_percentage,
        }
    }
}

fn corrupt_row(e: ParseEnumError) -> AppError {
    error!("Corrupt row in database: {}", e);
    AppError::Internal(e.to_string())
}

fn db_units(units: i64) -> Result<i32> {
    i32::try_from(units)
        .map_err(|_| AppError::BadRequest(format!("Duration {} is out of range", units)))
}

/// PostgreSQL-backed booking store
#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_booking_row(
        &self,
        sql: &str,
        organization_id: Uuid,
        booking_id: Uuid,
    ) -> Result<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(sql)
            .bind(booking_id)
            .bind(organization_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound)?;

        Booking::try_from(row).map_err(corrupt_row)
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    #[instrument(skip(self))]
    async fn is_org_member(&self, organization_id: Uuid, user_id: Uuid) -> Result<bool> {
        let is_member: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM organization_users
                WHERE organization_id = $1
                  AND user_id = $2
                  AND is_active = TRUE
            )
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(is_member)
    }

    #[instrument(skip(self))]
    async fn fetch_overlapping_reservations(
        &self,
        organization_id: Uuid,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        statuses: &[BookingStatus],
    ) -> Result<Vec<ReservationSlot>> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();

        let rows: Vec<(Uuid, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, check_in_date, check_out_date
            FROM bookings
            WHERE organization_id = $1
              AND room_id = $2
              AND status = ANY($3)
              AND check_in_date < $4
              AND check_out_date > $5
            ORDER BY check_in_date ASC
            "#,
        )
        .bind(organization_id)
        .bind(room_id)
        .bind(statuses)
        .bind(end)
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} overlapping reservation(s)", rows.len());

        Ok(rows
            .into_iter()
            .map(|(id, check_in, check_out)| ReservationSlot {
                id,
                check_in,
                check_out,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_room(&self, organization_id: Uuid, room_id: Uuid) -> Result<Option<Room>> {
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT
                id, organization_id, room_name, room_type,
                hourly_rate, daily_rate, status, is_active
            FROM rooms
            WHERE id = $1
              AND organization_id = $2
            "#,
        )
        .bind(room_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Room::try_from).transpose().map_err(corrupt_row)
    }

    #[instrument(skip(self))]
    async fn list_rooms(&self, organization_id: Uuid) -> Result<Vec<Room>> {
        let rows = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT
                id, organization_id, room_name, room_type,
                hourly_rate, daily_rate, status, is_active
            FROM rooms
            WHERE organization_id = $1
              AND is_active = TRUE
            ORDER BY room_name ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Room::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(corrupt_row)
    }

    #[instrument(skip(self))]
    async fn list_bookings(
        &self,
        organization_id: Uuid,
        filter: &BookingFilter,
    ) -> Result<Vec<Booking>> {
        let statuses: Vec<String> = filter
            .statuses
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();

        // Column names come from a closed enum, never from input
        let (date_column, order) = match filter.window.map(|w| w.field) {
            Some(DateField::CheckIn) => ("check_in_date", "check_in_date ASC"),
            Some(DateField::CheckOut) => ("check_out_date", "check_out_date ASC"),
            None => ("check_in_date", "check_in_date DESC"),
        };

        let sql = format!(
            r#"
            SELECT {columns}
            FROM bookings
            WHERE organization_id = $1
              AND (cardinality($2::text[]) = 0 OR status = ANY($2))
              AND ($3::uuid IS NULL OR room_id = $3)
              AND ($4::timestamptz IS NULL OR {date_column} >= $4)
              AND ($5::timestamptz IS NULL OR {date_column} < $5)
            ORDER BY {order}
            "#,
            columns = BOOKING_COLUMNS,
        );

        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(organization_id)
            .bind(statuses)
            .bind(filter.room_id)
            .bind(filter.window.map(|w| w.from))
            .bind(filter.window.map(|w| w.to))
            .fetch_all(&self.pool)
            .await?;

        debug!("Listed {} booking(s)", rows.len());

        rows.into_iter()
            .map(Booking::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(corrupt_row)
    }

    #[instrument(skip(self))]
    async fn get_booking(
        &self,
        organization_id: Uuid,
        booking_id: Uuid,
    ) -> Result<Option<Booking>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE id = $1 AND organization_id = $2",
            BOOKING_COLUMNS
        );
        match self.fetch_booking_row(&sql, organization_id, booking_id).await {
            Ok(booking) => Ok(Some(booking)),
            Err(AppError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, booking))]
    async fn insert_booking(&self, organization_id: Uuid, booking: &NewBooking) -> Result<Booking> {
        let sql = format!(
            r#"
            INSERT INTO bookings (
                organization_id, room_id, customer_id,
                check_in_date, check_out_date, duration_type, duration_value,
                room_rate, subtotal, advance_paid, balance,
                payment_status, payment_method, booking_source, notes, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, 'ACTIVE')
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );

        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(organization_id)
            .bind(booking.room_id)
            .bind(booking.customer_id)
            .bind(booking.check_in_date)
            .bind(booking.check_out_date)
            .bind(booking.duration_type.as_str())
            .bind(db_units(booking.duration_value)?)
            .bind(booking.room_rate)
            .bind(booking.subtotal)
            .bind(booking.advance_paid)
            .bind(booking.balance)
            .bind(booking.payment_status.as_str())
            .bind(booking.payment_method.map(|m| m.as_str()))
            .bind(booking.booking_source.as_str())
            .bind(booking.notes.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Error creating booking: {}", e);
                AppError::Database(e)
            })?;

        Booking::try_from(row).map_err(corrupt_row)
    }

    #[instrument(skip(self, update))]
    async fn update_booking(
        &self,
        organization_id: Uuid,
        booking_id: Uuid,
        update: &BookingUpdate,
    ) -> Result<Booking> {
        let sql = format!(
            r#"
            UPDATE bookings
            SET check_in_date = $3,
                check_out_date = $4,
                duration_type = $5,
                duration_value = $6,
                room_rate = $7,
                subtotal = $8,
                advance_paid = $9,
                balance = $10,
                payment_status = $11,
                payment_method = $12,
                notes = $13,
                updated_at = NOW()
            WHERE id = $1
              AND organization_id = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );

        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .bind(organization_id)
            .bind(update.check_in_date)
            .bind(update.check_out_date)
            .bind(update.duration_type.as_str())
            .bind(db_units(update.duration_value)?)
            .bind(update.room_rate)
            .bind(update.subtotal)
            .bind(update.advance_paid)
            .bind(update.balance)
            .bind(update.payment_status.as_str())
            .bind(update.payment_method.map(|m| m.as_str()))
            .bind(update.notes.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound)?;

        Booking::try_from(row).map_err(corrupt_row)
    }

    #[instrument(skip(self))]
    async fn set_booking_status(
        &self,
        organization_id: Uuid,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking> {
        let sql = format!(
            r#"
            UPDATE bookings
            SET status = $3,
                updated_at = NOW()
            WHERE id = $1
              AND organization_id = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );

        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .bind(organization_id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound)?;

        Booking::try_from(row).map_err(corrupt_row)
    }

    #[instrument(skip(self))]
    async fn get_settings(&self, organization_id: Uuid) -> Result<Option<Settings>> {
        let sql = format!(
            "SELECT {} FROM settings WHERE organization_id = $1",
            SETTINGS_COLUMNS
        );

        let row = sqlx::query_as::<_, SettingsRow>(&sql)
            .bind(organization_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Settings::from))
    }

    #[instrument(skip(self, settings), fields(organization_id = %settings.organization_id))]
    async fn save_settings(&self, settings: &Settings) -> Result<Settings> {
        let sql = format!(
            r#"
            INSERT INTO settings ({columns})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (organization_id) DO UPDATE
            SET business_name = EXCLUDED.business_name,
                currency = EXCLUDED.currency,
                timezone = EXCLUDED.timezone,
                default_ac_hourly_rate = EXCLUDED.default_ac_hourly_rate,
                default_ac_daily_rate = EXCLUDED.default_ac_daily_rate,
                default_nonac_hourly_rate = EXCLUDED.default_nonac_hourly_rate,
                default_nonac_daily_rate = EXCLUDED.default_nonac_daily_rate,
                tax_percentage = EXCLUDED.tax_percentage,
                service_charge_percentage = EXCLUDED.service_charge_percentage,
                updated_at = NOW()
            RETURNING {columns}
            "#,
            columns = SETTINGS_COLUMNS
        );

        let row = sqlx::query_as::<_, SettingsRow>(&sql)
            .bind(settings.organization_id)
            .bind(&settings.business_name)
            .bind(&settings.currency)
            .bind(&settings.timezone)
            .bind(settings.default_ac_hourly_rate)
            .bind(settings.default_ac_daily_rate)
            .bind(settings.default_nonac_hourly_rate)
            .bind(settings.default_nonac_daily_rate)
            .bind(settings.tax_percentage)
            .bind(settings.service_charge_percentage)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }
}
