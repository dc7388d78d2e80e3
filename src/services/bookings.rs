//! Booking writes: creation, returns, extensions and status changes.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;

use crate::entities::booking::{
    self, BookingStatus, DiscountType, DrivingType, FuelResponsibility, InsuranceType,
};
use crate::entities::{
    booking_add_on, booking_extension, booking_return, customer, driver, location, vehicle,
};
use crate::error::{AppError, AppResult};
use crate::services::availability::{self, DateWindow, ReservedWindow};
use crate::services::lifecycle;
use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct AddOnRequest {
    pub add_on_name: String,
    pub add_on_price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub booking_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub pickup_location_id: i32,
    pub dropoff_location_id: i32,
    pub starting_odometer_reading: i32,
    #[serde(default)]
    pub is_return_to_same_location: bool,
    pub customer_id: i32,
    pub vehicle_id: i32,
    pub driving_type: DrivingType,
    pub driver_id: Option<i32>,
    pub no_of_passengers: i32,
    pub fuel_responsibility: FuelResponsibility,
    pub deposited_amount: Decimal,
    #[serde(default)]
    pub is_vat_applicable: bool,
    pub insurance_type: InsuranceType,
    pub insurance_value: Option<Decimal>,
    pub discount_type: Option<DiscountType>,
    pub discount: Option<Decimal>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub add_ons: Vec<AddOnRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordReturnRequest {
    pub return_date: NaiveDate,
    pub final_odometer_reading: i32,
    #[serde(default)]
    pub is_damage: bool,
    pub damage_notes: Option<String>,
    pub refunded_deposit_amount: Decimal,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordExtensionRequest {
    pub original_return_date: NaiveDate,
    pub extend_return_date: NaiveDate,
    pub no_of_extend_days: i32,
    pub price: Decimal,
}

pub async fn find_booking<C: ConnectionTrait>(db: &C, booking_id: i32) -> AppResult<booking::Model> {
    booking::Entity::find_by_id(booking_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
}

/// Fail with a validation error naming `field` when the referenced row is missing
fn require<T>(found: Option<T>, field: &str, id: i32) -> AppResult<T> {
    found.ok_or_else(|| AppError::BadRequest(format!("Invalid {}: {}", field, id)))
}

fn conflict_error(vehicle_id: i32, existing: ReservedWindow) -> AppError {
    AppError::Conflict(format!(
        "Vehicle {} is already reserved from {} to {} by booking {}",
        vehicle_id, existing.start, existing.end, existing.booking_id
    ))
}

/// Insert a pending booking and its add-ons.
///
/// With the overlap guard on, the vehicle is locked and the window is checked
/// against active bookings inside the same transaction as the insert.
pub async fn create_booking(
    state: &AppState,
    payload: CreateBookingRequest,
) -> AppResult<(booking::Model, Vec<booking_add_on::Model>)> {
    if payload.return_date <= payload.booking_date {
        return Err(AppError::BadRequest(
            "return_date must be after booking_date".to_string(),
        ));
    }
    if payload.no_of_passengers <= 0 {
        return Err(AppError::BadRequest(
            "no_of_passengers must be at least 1".to_string(),
        ));
    }

    let guard = state.config.guard_booking_overlaps;
    let _lock = state.vehicle_locks.acquire_if(guard, payload.vehicle_id).await;

    let txn = state.db.begin().await?;

    require(
        customer::Entity::find_by_id(payload.customer_id).one(&txn).await?,
        "customer_id",
        payload.customer_id,
    )?;
    require(
        vehicle::Entity::find_by_id(payload.vehicle_id).one(&txn).await?,
        "vehicle_id",
        payload.vehicle_id,
    )?;
    for (field, id) in [
        ("pickup_location_id", payload.pickup_location_id),
        ("dropoff_location_id", payload.dropoff_location_id),
    ] {
        require(location::Entity::find_by_id(id).one(&txn).await?, field, id)?;
    }
    if let Some(driver_id) = payload.driver_id {
        require(
            driver::Entity::find_by_id(driver_id).one(&txn).await?,
            "driver_id",
            driver_id,
        )?;
    }

    if guard {
        let window = DateWindow::new(
            payload.booking_date.date_naive(),
            payload.return_date.date_naive(),
        );
        if let Some(existing) =
            availability::find_conflict(&txn, payload.vehicle_id, window, None).await?
        {
            tracing::warn!(vehicle_id = payload.vehicle_id, "Booking rejected, window overlaps an active booking");
            return Err(conflict_error(payload.vehicle_id, existing));
        }
    }

    let now = Utc::now();
    let booking = booking::ActiveModel {
        booking_date: Set(payload.booking_date.into()),
        return_date: Set(payload.return_date.into()),
        pickup_location_id: Set(payload.pickup_location_id),
        dropoff_location_id: Set(payload.dropoff_location_id),
        starting_odometer_reading: Set(payload.starting_odometer_reading),
        is_return_to_same_location: Set(payload.is_return_to_same_location),
        customer_id: Set(payload.customer_id),
        vehicle_id: Set(payload.vehicle_id),
        driving_type: Set(payload.driving_type),
        driver_id: Set(payload.driver_id),
        no_of_passengers: Set(payload.no_of_passengers),
        fuel_responsibility: Set(payload.fuel_responsibility),
        deposited_amount: Set(payload.deposited_amount),
        is_vat_applicable: Set(payload.is_vat_applicable),
        insurance_type: Set(payload.insurance_type),
        insurance_value: Set(payload.insurance_value),
        discount_type: Set(payload.discount_type),
        discount: Set(payload.discount),
        total_amount: Set(payload.total_amount),
        status: Set(BookingStatus::Pending),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut add_ons = Vec::with_capacity(payload.add_ons.len());
    for add_on in payload.add_ons {
        let inserted = booking_add_on::ActiveModel {
            booking_id: Set(booking.id),
            add_on_name: Set(add_on.add_on_name),
            add_on_price: Set(add_on.add_on_price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        add_ons.push(inserted);
    }

    txn.commit().await?;

    tracing::info!(
        booking_id = booking.id,
        vehicle_id = booking.vehicle_id,
        customer_id = booking.customer_id,
        add_ons = add_ons.len(),
        "Booking placed"
    );

    Ok((booking, add_ons))
}

/// Record the hand-back of a booking. The booking status is left untouched.
pub async fn record_return(
    state: &AppState,
    booking_id: i32,
    payload: RecordReturnRequest,
) -> AppResult<booking_return::Model> {
    let booking = find_booking(&state.db, booking_id).await?;

    let existing = booking_return::Entity::find()
        .filter(booking_return::Column::BookingId.eq(booking.id))
        .count(&state.db)
        .await?;
    if existing > 0 {
        return Err(AppError::BadRequest(format!(
            "A return has already been recorded for booking {}",
            booking.id
        )));
    }

    if payload.final_odometer_reading < booking.starting_odometer_reading {
        return Err(AppError::BadRequest(format!(
            "final_odometer_reading cannot be lower than the starting reading of {}",
            booking.starting_odometer_reading
        )));
    }

    // The unique index on booking_id still rejects a concurrent duplicate
    let record = booking_return::ActiveModel {
        booking_id: Set(booking.id),
        return_date: Set(payload.return_date),
        final_odometer_reading: Set(payload.final_odometer_reading),
        is_damage: Set(payload.is_damage),
        damage_notes: Set(payload.damage_notes),
        refunded_deposit_amount: Set(payload.refunded_deposit_amount),
        total_amount: Set(payload.total_amount),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(
        booking_id = booking.id,
        distance_km = record.final_odometer_reading - booking.starting_odometer_reading,
        is_damage = record.is_damage,
        "Booking returned"
    );

    Ok(record)
}

/// Append an extension. The booking's own return_date column is not rewritten;
/// availability reads the latest extension instead.
pub async fn record_extension(
    state: &AppState,
    booking_id: i32,
    payload: RecordExtensionRequest,
) -> AppResult<booking_extension::Model> {
    if payload.extend_return_date <= payload.original_return_date {
        return Err(AppError::BadRequest(
            "extend_return_date must be after original_return_date".to_string(),
        ));
    }
    if payload.no_of_extend_days <= 0 {
        return Err(AppError::BadRequest(
            "no_of_extend_days must be at least 1".to_string(),
        ));
    }

    let booking = find_booking(&state.db, booking_id).await?;
    let guard = state.config.guard_booking_overlaps && booking.status.is_active();
    let _lock = state.vehicle_locks.acquire_if(guard, booking.vehicle_id).await;

    let txn = state.db.begin().await?;

    // Extensions chain: each one starts from the end the previous one set
    let current = availability::effective_window(&txn, &booking).await?;
    if payload.original_return_date != current.dropoff {
        return Err(AppError::BadRequest(format!(
            "original_return_date must match the current return date {}",
            current.dropoff
        )));
    }
    if payload.extend_return_date <= current.dropoff {
        return Err(AppError::BadRequest(format!(
            "extend_return_date must be after the current return date {}",
            current.dropoff
        )));
    }

    if guard {
        let window = DateWindow::new(current.pickup, payload.extend_return_date);
        if let Some(existing) =
            availability::find_conflict(&txn, booking.vehicle_id, window, Some(booking.id)).await?
        {
            return Err(conflict_error(booking.vehicle_id, existing));
        }
    }

    let extension = booking_extension::ActiveModel {
        booking_id: Set(booking.id),
        original_return_date: Set(payload.original_return_date),
        extend_return_date: Set(payload.extend_return_date),
        no_of_extend_days: Set(payload.no_of_extend_days),
        price: Set(payload.price),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = booking.id,
        extend_return_date = %extension.extend_return_date,
        "Booking extended"
    );

    Ok(extension)
}

/// Move a booking to `target`, validating the transition and, for active
/// targets, the vehicle's calendar.
pub async fn update_status(
    state: &AppState,
    booking_id: i32,
    target: BookingStatus,
) -> AppResult<booking::Model> {
    let current = find_booking(&state.db, booking_id).await?;
    let guard = state.config.guard_booking_overlaps && target.is_active();
    let _lock = state.vehicle_locks.acquire_if(guard, current.vehicle_id).await;

    let txn = state.db.begin().await?;

    // Re-read under the lock so the transition is checked against the latest status
    let booking = find_booking(&txn, booking_id).await?;
    lifecycle::check_transition(
        booking.status,
        target,
        state.config.enforce_status_transitions,
    )?;

    if booking.status == target {
        txn.commit().await?;
        return Ok(booking);
    }

    if guard {
        let window = availability::effective_window(&txn, &booking).await?;
        if let Some(existing) =
            availability::find_conflict(&txn, booking.vehicle_id, window, Some(booking.id)).await?
        {
            tracing::warn!(booking_id, %target, "Status change rejected, vehicle already reserved");
            return Err(conflict_error(booking.vehicle_id, existing));
        }
    }

    let from = booking.status;
    let mut active: booking::ActiveModel = booking.into();
    active.status = Set(target);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(booking_id, %from, to = %target, "Booking status changed");

    Ok(updated)
}
