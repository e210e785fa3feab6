//! Room availability checks.

use chrono::{DateTime, Utc};
use tracing::{debug, error};
use uuid::Uuid;

use super::models::BookingStatus;
use super::store::BookingContext;

/// Check whether a room is free for `[check_in, check_out)`.
///
/// `exclude_booking_id` drops one reservation from the conflict set so a
/// booking can be edited without colliding with itself. Any store error
/// makes the room count as unavailable.
pub async fn is_room_available(
    ctx: BookingContext<'_>,
    room_id: Uuid,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    exclude_booking_id: Option<Uuid>,
) -> bool {
    let conflicting = match ctx
        .store
        .fetch_overlapping_reservations(
            ctx.tenant_id,
            room_id,
            check_in,
            check_out,
            &[BookingStatus::Active],
        )
        .await
    {
        Ok(slots) => slots,
        Err(e) => {
            error!("Error checking availability for room {}: {}", room_id, e);
            return false;
        }
    };

    let remaining = conflicting
        .iter()
        .filter(|slot| Some(slot.id) != exclude_booking_id)
        .count();

    debug!(
        "Room {} has {} conflicting reservation(s) for {} - {}",
        room_id, remaining, check_in, check_out
    );

    remaining == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::testing::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, d, 14, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_empty_room_is_available() {
        let store = MemoryStore::new();
        let org = store.organization_id;
        let room = store.add_room();

        let ctx = BookingContext::new(org, &store);
        assert!(is_room_available(ctx, room, day(1), day(3), None).await);
    }

    #[tokio::test]
    async fn test_identical_interval_conflicts_until_excluded() {
        let store = MemoryStore::new();
        let org = store.organization_id;
        let room = store.add_room();
        let existing = store.add_reservation(room, day(5), day(8), BookingStatus::Active);

        let ctx = BookingContext::new(org, &store);
        assert!(!is_room_available(ctx, room, day(5), day(8), None).await);
        assert!(is_room_available(ctx, room, day(5), day(8), Some(existing)).await);
    }

    #[tokio::test]
    async fn test_partial_overlap_conflicts() {
        let store = MemoryStore::new();
        let org = store.organization_id;
        let room = store.add_room();
        store.add_reservation(room, day(5), day(8), BookingStatus::Active);

        let ctx = BookingContext::new(org, &store);
        assert!(!is_room_available(ctx, room, day(3), day(6), None).await);
        assert!(!is_room_available(ctx, room, day(7), day(10), None).await);
        assert!(!is_room_available(ctx, room, day(6), day(7), None).await);
        assert!(!is_room_available(ctx, room, day(1), day(20), None).await);
    }

    #[tokio::test]
    async fn test_touching_endpoints_do_not_conflict() {
        let store = MemoryStore::new();
        let org = store.organization_id;
        let room = store.add_room();
        store.add_reservation(room, day(5), day(8), BookingStatus::Active);

        let ctx = BookingContext::new(org, &store);
        // proposed.check_out == existing.check_in
        assert!(is_room_available(ctx, room, day(2), day(5), None).await);
        // proposed.check_in == existing.check_out
        assert!(is_room_available(ctx, room, day(8), day(9), None).await);
    }

    #[tokio::test]
    async fn test_inactive_reservations_ignored() {
        let store = MemoryStore::new();
        let org = store.organization_id;
        let room = store.add_room();
        store.add_reservation(room, day(5), day(8), BookingStatus::Cancelled);
        store.add_reservation(room, day(5), day(8), BookingStatus::Completed);

        let ctx = BookingContext::new(org, &store);
        assert!(is_room_available(ctx, room, day(5), day(8), None).await);
    }

    #[tokio::test]
    async fn test_other_rooms_and_tenants_ignored() {
        let store = MemoryStore::new();
        let org = store.organization_id;
        let room = store.add_room();
        let other_room = store.add_room();
        store.add_reservation(other_room, day(5), day(8), BookingStatus::Active);

        let ctx = BookingContext::new(org, &store);
        assert!(is_room_available(ctx, room, day(5), day(8), None).await);

        // Another tenant sees nothing of this organization's bookings
        store.add_reservation(room, day(5), day(8), BookingStatus::Active);
        let foreign = BookingContext::new(Uuid::new_v4(), &store);
        assert!(is_room_available(foreign, room, day(5), day(8), None).await);
    }

    #[tokio::test]
    async fn test_excluding_one_of_two_conflicts_still_unavailable() {
        let store = MemoryStore::new();
        let org = store.organization_id;
        let room = store.add_room();
        let first = store.add_reservation(room, day(5), day(6), BookingStatus::Active);
        store.add_reservation(
            room,
            day(6) + Duration::hours(2),
            day(7),
            BookingStatus::Active,
        );

        let ctx = BookingContext::new(org, &store);
        assert!(!is_room_available(ctx, room, day(5), day(7), Some(first)).await);
    }

    #[tokio::test]
    async fn test_store_failure_fails_closed() {
        let store = MemoryStore::new();
        let org = store.organization_id;
        let room = store.add_room();
        store.fail_reads(true);

        let ctx = BookingContext::new(org, &store);
        assert!(!is_room_available(ctx, room, day(1), day(2), None).await);
    }
}
