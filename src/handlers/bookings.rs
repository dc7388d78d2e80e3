use axum::extract::State;
use chrono::{DateTime, Duration, FixedOffset, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::entities::booking::{self, BookingStatus};
use crate::entities::{
    booking_add_on, booking_extension, booking_return, customer, location, vehicle,
    vehicle_sub_category,
};
use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::response::{ApiResponse, PageParams};
use crate::services::bookings::{
    self, CreateBookingRequest, RecordExtensionRequest, RecordReturnRequest,
};
use crate::utils::dates::parse_iso_date;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BookingFilter {
    pub booking_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub vehicle_id: Option<i32>,
    pub status: Option<String>,
    /// `YYYY-MM-DD`, matched against the booking's start date
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedBookingResponse {
    #[serde(flatten)]
    pub booking: booking::Model,
    pub add_ons: Vec<booking_add_on::Model>,
}

#[derive(Debug, Serialize)]
pub struct CustomerSummary {
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub nic: String,
}

#[derive(Debug, Serialize)]
pub struct VehicleSummary {
    pub vehicle_id: i32,
    pub make: String,
    pub model: String,
    pub vehicle_type: Option<String>,
    pub registration_no: String,
}

#[derive(Debug, Serialize)]
pub struct BookingPeriod {
    pub pickup_date: DateTime<FixedOffset>,
    pub return_date: DateTime<FixedOffset>,
    pub duration: i64,
}

#[derive(Debug, Serialize)]
pub struct BookingLocations {
    pub pickup_location: Option<location::Model>,
    pub return_location: Option<location::Model>,
}

#[derive(Debug, Serialize)]
pub struct PriceBreakdown {
    pub base_rate: Decimal,
    pub excess_rate: Decimal,
    pub tax: Decimal,
    pub deposit: Decimal,
    pub insurance: Decimal,
    pub discount: Decimal,
    pub add_ons_total: Decimal,
    pub extensions_total: Decimal,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct BookingDetailResponse {
    pub booking_id: i32,
    pub status: BookingStatus,
    pub customer: Option<CustomerSummary>,
    pub vehicle: Option<VehicleSummary>,
    pub period: BookingPeriod,
    pub location: BookingLocations,
    pub add_ons: Vec<booking_add_on::Model>,
    #[serde(rename = "return")]
    pub return_record: Option<booking_return::Model>,
    pub extensions: Vec<booking_extension::Model>,
    pub price_breakdown: PriceBreakdown,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// List bookings, newest first
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filter): Query<BookingFilter>,
) -> AppResult<ApiResponse<Vec<booking::Model>>> {
    let mut query = booking::Entity::find()
        .order_by_desc(booking::Column::CreatedAt)
        .order_by_desc(booking::Column::Id);

    if let Some(id) = filter.booking_id {
        query = query.filter(booking::Column::Id.eq(id));
    }
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(booking::Column::CustomerId.eq(customer_id));
    }
    if let Some(vehicle_id) = filter.vehicle_id {
        query = query.filter(booking::Column::VehicleId.eq(vehicle_id));
    }
    if let Some(raw) = filter.status.as_deref() {
        let status = BookingStatus::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid status: {}", raw)))?;
        query = query.filter(booking::Column::Status.eq(status));
    }
    if let Some(raw) = filter.date.as_deref() {
        let day = parse_iso_date(raw).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
        })?;
        let start: DateTime<FixedOffset> = day.and_time(NaiveTime::MIN).and_utc().into();
        let end = start + Duration::days(1);
        query = query
            .filter(booking::Column::BookingDate.gte(start))
            .filter(booking::Column::BookingDate.lt(end));
    }

    let paginator = query.paginate(&state.db, params.page_size());
    let counts = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(params.page_index()).await?;

    Ok(ApiResponse::paginated(
        items,
        params.pagination(counts),
        "Bookings retrieved",
    ))
}

pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<ApiResponse<CreatedBookingResponse>> {
    let (booking, add_ons) = bookings::create_booking(&state, payload).await?;
    Ok(ApiResponse::created(
        CreatedBookingResponse { booking, add_ons },
        "Booking created",
    ))
}

/// Booking with its customer, vehicle, locations and child records
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<BookingDetailResponse>> {
    let booking = bookings::find_booking(&state.db, id).await?;

    let customer = booking.find_related(customer::Entity).one(&state.db).await?;
    let vehicle = booking.find_related(vehicle::Entity).one(&state.db).await?;
    let vehicle_type = match &vehicle {
        Some(v) => vehicle_sub_category::Entity::find_by_id(v.sub_category_id)
            .one(&state.db)
            .await?
            .map(|s| s.name),
        None => None,
    };
    let pickup_location = location::Entity::find_by_id(booking.pickup_location_id)
        .one(&state.db)
        .await?;
    let return_location = location::Entity::find_by_id(booking.dropoff_location_id)
        .one(&state.db)
        .await?;
    let add_ons = booking.find_related(booking_add_on::Entity).all(&state.db).await?;
    let return_record = booking.find_related(booking_return::Entity).one(&state.db).await?;
    let extensions = booking
        .find_related(booking_extension::Entity)
        .order_by_asc(booking_extension::Column::CreatedAt)
        .order_by_asc(booking_extension::Column::Id)
        .all(&state.db)
        .await?;

    let price_breakdown = PriceBreakdown {
        base_rate: vehicle.as_ref().map(|v| v.price_per_day).unwrap_or_default(),
        excess_rate: vehicle.as_ref().map(|v| v.excess_km_charge).unwrap_or_default(),
        tax: vehicle.as_ref().map(|v| v.vat_amount).unwrap_or_default(),
        deposit: booking.deposited_amount,
        insurance: booking.insurance_value.unwrap_or_default(),
        discount: booking.discount.unwrap_or_default(),
        add_ons_total: add_ons.iter().map(|a| a.add_on_price).sum(),
        extensions_total: extensions.iter().map(|e| e.price).sum(),
        total_amount: booking.total_amount,
    };

    let detail = BookingDetailResponse {
        booking_id: booking.id,
        status: booking.status,
        customer: customer.map(|c| CustomerSummary {
            customer_id: c.id,
            first_name: c.first_name,
            last_name: c.last_name,
            contact_number: c.contact_number,
            nic: c.nic,
        }),
        vehicle: vehicle.map(|v| VehicleSummary {
            vehicle_id: v.id,
            make: v.make,
            model: v.model,
            vehicle_type,
            registration_no: v.registration_no,
        }),
        period: BookingPeriod {
            pickup_date: booking.booking_date,
            return_date: booking.return_date,
            duration: (booking.return_date - booking.booking_date).num_days(),
        },
        location: BookingLocations {
            pickup_location,
            return_location,
        },
        add_ons,
        return_record,
        extensions,
        price_breakdown,
        created_at: booking.created_at,
        updated_at: booking.updated_at,
    };

    Ok(ApiResponse::ok(detail, "Booking retrieved"))
}

/// Delete a booking together with its add-ons, return and extensions (admin)
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<()>> {
    let booking = bookings::find_booking(&state.db, id).await?;
    booking::Entity::delete_by_id(booking.id).exec(&state.db).await?;
    tracing::info!(booking_id = id, "Booking deleted");

    Ok(ApiResponse::message("Booking deleted"))
}

pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<ApiResponse<booking::Model>> {
    let target = BookingStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid status: {}", payload.status)))?;
    let booking = bookings::update_status(&state, id, target).await?;

    Ok(ApiResponse::ok(booking, "Booking status updated"))
}

pub async fn record_return(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<RecordReturnRequest>,
) -> AppResult<ApiResponse<booking_return::Model>> {
    let record = bookings::record_return(&state, id, payload).await?;
    Ok(ApiResponse::created(record, "Return recorded"))
}

pub async fn record_extension(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<RecordExtensionRequest>,
) -> AppResult<ApiResponse<booking_extension::Model>> {
    let extension = bookings::record_extension(&state, id, payload).await?;
    Ok(ApiResponse::created(extension, "Extension recorded"))
}
