//! Vehicle availability over a requested date window.
//!
//! A vehicle is unavailable for `[pickup, dropoff]` when one of its
//! confirmed or ongoing bookings overlaps the window, both ends inclusive.
//! A booking's end is the `extend_return_date` of its most recent extension
//! when it has one, otherwise its own `return_date`.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::entities::booking::{self, BookingStatus};
use crate::entities::booking_extension;
use crate::error::{AppError, AppResult};
use crate::utils::dates::parse_compact_date;

/// Requested rental window, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub pickup: NaiveDate,
    pub dropoff: NaiveDate,
}

impl DateWindow {
    pub fn new(pickup: NaiveDate, dropoff: NaiveDate) -> Self {
        Self { pickup, dropoff }
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.dropoff && end >= self.pickup
    }
}

/// Days a vehicle is held by one active booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedWindow {
    pub booking_id: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Window query parameters accepted by the vehicle endpoints.
///
/// `pickup_date`/`dropoff_date` take precedence over `available_from`/`available_to`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowQuery {
    pub pickup_date: Option<String>,
    pub dropoff_date: Option<String>,
    pub available_from: Option<String>,
    pub available_to: Option<String>,
}

impl WindowQuery {
    pub fn pickup(&self) -> Option<&str> {
        self.pickup_date.as_deref().or(self.available_from.as_deref())
    }

    pub fn dropoff(&self) -> Option<&str> {
        self.dropoff_date.as_deref().or(self.available_to.as_deref())
    }
}

/// What to do with a window that cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityPolicy {
    /// Treat the window as absent and report the vehicle as available
    FailOpen,
    /// Reject the request with a validation error
    FailClosed,
}

impl AvailabilityPolicy {
    pub fn from_config(config: &Config) -> Self {
        if config.availability_fail_closed {
            AvailabilityPolicy::FailClosed
        } else {
            AvailabilityPolicy::FailOpen
        }
    }

    /// Turn raw `YYYYMMDD` values into a window; `Ok(None)` means "no constraint".
    pub fn resolve(self, pickup: Option<&str>, dropoff: Option<&str>) -> AppResult<Option<DateWindow>> {
        match (pickup, dropoff) {
            (None, None) => Ok(None),
            (Some(p), Some(d)) => match (parse_compact_date(p), parse_compact_date(d)) {
                (Some(pickup), Some(dropoff)) => Ok(Some(DateWindow::new(pickup, dropoff))),
                (None, _) => self.fallback(format!("Invalid pickup date '{}', expected YYYYMMDD", p)),
                (_, None) => self.fallback(format!("Invalid dropoff date '{}', expected YYYYMMDD", d)),
            },
            _ => self.fallback(
                "Both pickup and dropoff dates are required for an availability check".to_string(),
            ),
        }
    }

    pub fn resolve_query(self, query: &WindowQuery) -> AppResult<Option<DateWindow>> {
        self.resolve(query.pickup(), query.dropoff())
    }

    fn fallback(self, reason: String) -> AppResult<Option<DateWindow>> {
        match self {
            AvailabilityPolicy::FailOpen => {
                tracing::warn!(%reason, "Ignoring unusable availability window");
                Ok(None)
            }
            AvailabilityPolicy::FailClosed => Err(AppError::BadRequest(reason)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub is_available: bool,
    pub days_until_available: Option<i64>,
}

impl Availability {
    pub const UNCONSTRAINED: Availability = Availability {
        is_available: true,
        days_until_available: None,
    };

    pub fn evaluate(reserved: &[ReservedWindow], window: Option<DateWindow>) -> Self {
        match window {
            None => Self::UNCONSTRAINED,
            Some(window) => Availability {
                is_available: is_window_free(reserved, window),
                days_until_available: days_until_free(reserved, window),
            },
        }
    }
}

pub fn conflicts(
    reserved: &[ReservedWindow],
    window: DateWindow,
) -> impl Iterator<Item = &ReservedWindow> {
    reserved.iter().filter(move |r| window.overlaps(r.start, r.end))
}

pub fn is_window_free(reserved: &[ReservedWindow], window: DateWindow) -> bool {
    conflicts(reserved, window).next().is_none()
}

/// Days from the requested dropoff until the vehicle is released.
///
/// Looks at every reservation running to or past the dropoff, plus the ones
/// that conflict with the window, and counts from the dropoff to the latest
/// end. Floored at zero; `None` while the window is free.
pub fn days_until_free(reserved: &[ReservedWindow], window: DateWindow) -> Option<i64> {
    if is_window_free(reserved, window) {
        return None;
    }

    reserved
        .iter()
        .filter(|r| r.end >= window.dropoff || window.overlaps(r.start, r.end))
        .map(|r| r.end)
        .max()
        .map(|end| ((end - window.dropoff).num_days() + 1).max(0))
}

pub fn calendar_date(ts: &DateTime<FixedOffset>) -> NaiveDate {
    ts.with_timezone(&Utc).date_naive()
}

/// Midnight UTC after `date`, the exclusive upper bound for timestamps on it
fn start_of_next_day(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    date.succ_opt()
        .and_then(|next| next.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().fixed_offset())
}

/// Active reservations for each of the given vehicles
pub async fn reserved_windows_for<C: ConnectionTrait>(
    db: &C,
    vehicle_ids: &[i32],
) -> AppResult<HashMap<i32, Vec<ReservedWindow>>> {
    if vehicle_ids.is_empty() {
        return Ok(HashMap::new());
    }
    active_reservations(db, Some(vehicle_ids), None).await
}

/// Vehicles holding at least one active reservation that collides with `window`
pub async fn unavailable_vehicle_ids<C: ConnectionTrait>(
    db: &C,
    window: DateWindow,
) -> AppResult<Vec<i32>> {
    let reserved = active_reservations(db, None, Some(window.dropoff)).await?;
    Ok(reserved
        .into_iter()
        .filter(|(_, windows)| !is_window_free(windows, window))
        .map(|(vehicle_id, _)| vehicle_id)
        .collect())
}

/// Active bookings grouped by vehicle. `starting_by` drops bookings whose
/// start date is after it; extensions only move the end, so those can never
/// reach back into a window ending on that day.
async fn active_reservations<C: ConnectionTrait>(
    db: &C,
    vehicle_ids: Option<&[i32]>,
    starting_by: Option<NaiveDate>,
) -> AppResult<HashMap<i32, Vec<ReservedWindow>>> {
    let mut windows: HashMap<i32, Vec<ReservedWindow>> = HashMap::new();

    let mut query =
        booking::Entity::find().filter(booking::Column::Status.is_in(BookingStatus::ACTIVE));
    if let Some(ids) = vehicle_ids {
        query = query.filter(booking::Column::VehicleId.is_in(ids.iter().copied()));
    }
    if let Some(cutoff) = starting_by.and_then(start_of_next_day) {
        query = query.filter(booking::Column::BookingDate.lt(cutoff));
    }
    let bookings = query.all(db).await?;

    if bookings.is_empty() {
        return Ok(windows);
    }

    let extended = latest_extension_dates(db, bookings.iter().map(|b| b.id)).await?;

    for b in bookings {
        let end = extended
            .get(&b.id)
            .copied()
            .unwrap_or_else(|| calendar_date(&b.return_date));
        windows.entry(b.vehicle_id).or_default().push(ReservedWindow {
            booking_id: b.id,
            start: calendar_date(&b.booking_date),
            end,
        });
    }

    Ok(windows)
}

pub async fn reserved_windows<C: ConnectionTrait>(
    db: &C,
    vehicle_id: i32,
) -> AppResult<Vec<ReservedWindow>> {
    Ok(reserved_windows_for(db, &[vehicle_id])
        .await?
        .remove(&vehicle_id)
        .unwrap_or_default())
}

/// `extend_return_date` of the most recently recorded extension per booking
pub async fn latest_extension_dates<C: ConnectionTrait>(
    db: &C,
    booking_ids: impl IntoIterator<Item = i32>,
) -> AppResult<HashMap<i32, NaiveDate>> {
    let extensions = booking_extension::Entity::find()
        .filter(booking_extension::Column::BookingId.is_in(booking_ids))
        .order_by_asc(booking_extension::Column::CreatedAt)
        .order_by_asc(booking_extension::Column::Id)
        .all(db)
        .await?;

    // Ascending order, so later rows overwrite earlier ones
    Ok(extensions
        .into_iter()
        .map(|e| (e.booking_id, e.extend_return_date))
        .collect())
}

/// The window a booking currently holds, extensions included
pub async fn effective_window<C: ConnectionTrait>(
    db: &C,
    booking: &booking::Model,
) -> AppResult<DateWindow> {
    let end = latest_extension_dates(db, [booking.id])
        .await?
        .remove(&booking.id)
        .unwrap_or_else(|| calendar_date(&booking.return_date));
    Ok(DateWindow::new(calendar_date(&booking.booking_date), end))
}

pub async fn check<C: ConnectionTrait>(
    db: &C,
    vehicle_id: i32,
    window: Option<DateWindow>,
) -> AppResult<Availability> {
    match window {
        None => Ok(Availability::UNCONSTRAINED),
        Some(window) => {
            let reserved = reserved_windows(db, vehicle_id).await?;
            Ok(Availability::evaluate(&reserved, Some(window)))
        }
    }
}

pub async fn is_available<C: ConnectionTrait>(
    db: &C,
    vehicle_id: i32,
    window: Option<DateWindow>,
) -> AppResult<bool> {
    Ok(check(db, vehicle_id, window).await?.is_available)
}

pub async fn days_until_available<C: ConnectionTrait>(
    db: &C,
    vehicle_id: i32,
    window: Option<DateWindow>,
) -> AppResult<Option<i64>> {
    Ok(check(db, vehicle_id, window).await?.days_until_available)
}

/// First active reservation on the vehicle colliding with `window`, ignoring `exclude`
pub async fn find_conflict<C: ConnectionTrait>(
    db: &C,
    vehicle_id: i32,
    window: DateWindow,
    exclude: Option<i32>,
) -> AppResult<Option<ReservedWindow>> {
    let reserved = reserved_windows(db, vehicle_id).await?;
    Ok(conflicts(&reserved, window)
        .find(|r| Some(r.booking_id) != exclude)
        .copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn june(pickup: u32, dropoff: u32) -> DateWindow {
        DateWindow::new(date(2024, 6, pickup), date(2024, 6, dropoff))
    }

    fn reserved(booking_id: i32, start: u32, end: u32) -> ReservedWindow {
        ReservedWindow {
            booking_id,
            start: date(2024, 6, start),
            end: date(2024, 6, end),
        }
    }

    #[test]
    fn test_overlap_is_inclusive_on_both_ends() {
        let booked = [reserved(1, 10, 15)];

        assert!(!is_window_free(&booked, june(15, 20)));
        assert!(!is_window_free(&booked, june(5, 10)));
        assert!(!is_window_free(&booked, june(11, 12)));
        assert!(!is_window_free(&booked, june(1, 30)));
        assert!(is_window_free(&booked, june(16, 20)));
        assert!(is_window_free(&booked, june(1, 9)));
    }

    #[test]
    fn test_partial_overlap_counts_zero_days_after_dropoff() {
        let booked = [reserved(1, 10, 15)];
        let availability = Availability::evaluate(&booked, Some(june(12, 20)));

        assert!(!availability.is_available);
        assert_eq!(availability.days_until_available, Some(0));
    }

    #[test]
    fn test_days_counted_from_dropoff_to_latest_end() {
        let booked = [reserved(1, 10, 15), reserved(2, 16, 25)];
        // window 12..14 conflicts with #1; #2 runs past the dropoff and ends on the 25th
        assert_eq!(days_until_free(&booked, june(12, 14)), Some(12));
    }

    #[test]
    fn test_booking_ending_on_dropoff_counts_one_day() {
        let booked = [reserved(1, 10, 15)];
        assert_eq!(days_until_free(&booked, june(12, 15)), Some(1));
    }

    #[test]
    fn test_free_window_has_no_day_count() {
        let booked = [reserved(1, 10, 15)];
        let availability = Availability::evaluate(&booked, Some(june(1, 9)));

        assert_eq!(availability, Availability::UNCONSTRAINED);
    }

    #[test]
    fn test_no_window_is_unconstrained() {
        let booked = [reserved(1, 1, 30)];
        assert_eq!(Availability::evaluate(&booked, None), Availability::UNCONSTRAINED);
    }

    #[test]
    fn test_fail_open_ignores_malformed_dates() {
        let policy = AvailabilityPolicy::FailOpen;

        assert_eq!(policy.resolve(Some("2024131"), Some("20240620")).unwrap(), None);
        assert_eq!(policy.resolve(Some("20240612"), Some("abcdefgh")).unwrap(), None);
        assert_eq!(policy.resolve(Some("20240612"), None).unwrap(), None);
        assert_eq!(policy.resolve(None, None).unwrap(), None);
        assert_eq!(
            policy.resolve(Some("20240612"), Some("20240620")).unwrap(),
            Some(june(12, 20))
        );
    }

    #[test]
    fn test_fail_closed_rejects_malformed_dates() {
        let policy = AvailabilityPolicy::FailClosed;

        assert!(matches!(
            policy.resolve(Some("2024131"), Some("20240620")),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            policy.resolve(None, Some("20240620")),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(policy.resolve(None, None).unwrap(), None);
    }

    #[test]
    fn test_pickup_names_win_over_available_names() {
        let query = WindowQuery {
            pickup_date: Some("20240612".to_string()),
            dropoff_date: None,
            available_from: Some("20240101".to_string()),
            available_to: Some("20240620".to_string()),
        };

        assert_eq!(query.pickup(), Some("20240612"));
        assert_eq!(query.dropoff(), Some("20240620"));
    }

    #[test]
    fn test_start_of_next_day_is_utc_midnight() {
        let cutoff = start_of_next_day(date(2024, 6, 30)).unwrap();
        assert_eq!(cutoff.to_rfc3339(), "2024-07-01T00:00:00+00:00");
        assert_eq!(start_of_next_day(NaiveDate::MAX), None);
    }
}
