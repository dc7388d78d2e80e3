use axum::extract::State;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};

use crate::entities::vehicle::{self, FuelType, Transmission, VehicleStatus};
use crate::entities::{vehicle_category, vehicle_sub_category};
use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::response::{ApiResponse, PageParams};
use crate::services::availability::{self, Availability, AvailabilityPolicy, WindowQuery};
use crate::utils::search::{any_icontains, iexact, search_term};
use crate::AppState;

/// Listing filters. Names and flags are matched ignoring case.
#[derive(Debug, Default, Deserialize)]
pub struct VehicleFilter {
    pub query: Option<String>,
    /// Category name
    pub category: Option<String>,
    /// Sub-category name
    pub sub_category: Option<String>,
    pub fuel_type: Option<String>,
    /// `true` or `false`; any other value applies no filter
    pub available: Option<String>,
}

impl VehicleFilter {
    fn available(&self) -> Option<bool> {
        match self.available.as_deref().map(str::to_lowercase).as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VehicleRequest {
    pub category_id: i32,
    pub sub_category_id: i32,
    pub vehicle_name: String,
    pub engine_capacity: i32,
    pub fuel_type: FuelType,
    pub color: String,
    pub make: String,
    pub model: String,
    pub transmission: Transmission,
    pub price_per_day: Decimal,
    pub no_of_seats: i32,
    pub insurance_no: String,
    pub insurance_expiry: NaiveDate,
    pub registration_no: String,
    pub vin: String,
    pub description: Option<String>,
    pub base_km_per_day: i32,
    pub excess_km_charge: Decimal,
    pub registration_expiry: NaiveDate,
    pub deposit_amount: Decimal,
    pub vat_amount: Decimal,
    pub odometer_reading: i32,
    pub late_fee: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVehicleStatusRequest {
    pub is_under_maintenance: Option<bool>,
    pub status: Option<VehicleStatus>,
}

#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    #[serde(flatten)]
    pub vehicle: vehicle::Model,
    #[serde(flatten)]
    pub availability: Availability,
}

#[derive(Debug, Serialize)]
pub struct VehicleDetailResponse {
    #[serde(flatten)]
    pub vehicle: vehicle::Model,
    pub category: Option<vehicle_category::Model>,
    pub sub_category: Option<vehicle_sub_category::Model>,
    #[serde(flatten)]
    pub availability: Availability,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub vehicle_id: i32,
    pub pickup_date: Option<NaiveDate>,
    pub dropoff_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub availability: Availability,
}

async fn find_vehicle(state: &AppState, id: i32) -> AppResult<vehicle::Model> {
    vehicle::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))
}

/// The sub-category must exist and sit under the given category
async fn validate_classification(state: &AppState, payload: &VehicleRequest) -> AppResult<()> {
    vehicle_category::Entity::find_by_id(payload.category_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Invalid category_id: {}", payload.category_id)))?;

    let sub_category = vehicle_sub_category::Entity::find_by_id(payload.sub_category_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest(format!("Invalid sub_category_id: {}", payload.sub_category_id))
        })?;

    if sub_category.category_id != payload.category_id {
        return Err(AppError::BadRequest(format!(
            "sub_category_id {} does not belong to category_id {}",
            payload.sub_category_id, payload.category_id
        )));
    }
    Ok(())
}

fn apply_request(active: &mut vehicle::ActiveModel, payload: VehicleRequest) {
    active.category_id = Set(payload.category_id);
    active.sub_category_id = Set(payload.sub_category_id);
    active.vehicle_name = Set(payload.vehicle_name);
    active.engine_capacity = Set(payload.engine_capacity);
    active.fuel_type = Set(payload.fuel_type);
    active.color = Set(payload.color);
    active.make = Set(payload.make);
    active.model = Set(payload.model);
    active.transmission = Set(payload.transmission);
    active.price_per_day = Set(payload.price_per_day);
    active.no_of_seats = Set(payload.no_of_seats);
    active.insurance_no = Set(payload.insurance_no);
    active.insurance_expiry = Set(payload.insurance_expiry);
    active.registration_no = Set(payload.registration_no);
    active.vin = Set(payload.vin);
    active.description = Set(payload.description);
    active.base_km_per_day = Set(payload.base_km_per_day);
    active.excess_km_charge = Set(payload.excess_km_charge);
    active.registration_expiry = Set(payload.registration_expiry);
    active.deposit_amount = Set(payload.deposit_amount);
    active.vat_amount = Set(payload.vat_amount);
    active.odometer_reading = Set(payload.odometer_reading);
    active.late_fee = Set(payload.late_fee);
    active.updated_at = Set(Utc::now().into());
}

/// List vehicles, each annotated with its availability for the requested window
pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filter): Query<VehicleFilter>,
    Query(window_query): Query<WindowQuery>,
) -> AppResult<ApiResponse<Vec<VehicleResponse>>> {
    let window = AvailabilityPolicy::from_config(&state.config).resolve_query(&window_query)?;

    let mut query = vehicle::Entity::find().order_by_asc(vehicle::Column::Id);

    if let Some(term) = search_term(filter.query.as_deref()) {
        query = query.filter(any_icontains(
            [
                vehicle::Column::VehicleName,
                vehicle::Column::Make,
                vehicle::Column::Model,
                vehicle::Column::RegistrationNo,
            ]
            .map(|column| (vehicle::Entity, column)),
            term,
        ));
    }
    if let Some(name) = search_term(filter.category.as_deref()) {
        query = query
            .join(JoinType::InnerJoin, vehicle::Relation::Category.def())
            .filter(iexact(
                (vehicle_category::Entity, vehicle_category::Column::Name),
                name,
            ));
    }
    if let Some(name) = search_term(filter.sub_category.as_deref()) {
        query = query
            .join(JoinType::InnerJoin, vehicle::Relation::SubCategory.def())
            .filter(iexact(
                (vehicle_sub_category::Entity, vehicle_sub_category::Column::Name),
                name,
            ));
    }
    if let Some(fuel_type) = search_term(filter.fuel_type.as_deref()) {
        query = query.filter(iexact((vehicle::Entity, vehicle::Column::FuelType), fuel_type));
    }
    if let Some(wanted) = filter.available() {
        let busy = match window {
            Some(window) => availability::unavailable_vehicle_ids(&state.db, window).await?,
            None => Vec::new(),
        };
        query = query.filter(if wanted {
            Condition::all()
                .add(vehicle::Column::IsUnderMaintenance.eq(false))
                .add(vehicle::Column::Status.eq(VehicleStatus::Available))
                .add(vehicle::Column::Id.is_not_in(busy))
        } else {
            Condition::any()
                .add(vehicle::Column::IsUnderMaintenance.eq(true))
                .add(vehicle::Column::Status.ne(VehicleStatus::Available))
                .add(vehicle::Column::Id.is_in(busy))
        });
    }

    let paginator = query.paginate(&state.db, params.page_size());
    let counts = paginator.num_items_and_pages().await?;
    let vehicles = paginator.fetch_page(params.page_index()).await?;

    let ids: Vec<i32> = vehicles.iter().map(|v| v.id).collect();
    let mut reserved = match window {
        Some(_) => availability::reserved_windows_for(&state.db, &ids).await?,
        None => Default::default(),
    };

    let responses = vehicles
        .into_iter()
        .map(|v| {
            let windows = reserved.remove(&v.id).unwrap_or_default();
            VehicleResponse {
                availability: Availability::evaluate(&windows, window),
                vehicle: v,
            }
        })
        .collect();

    Ok(ApiResponse::paginated(
        responses,
        params.pagination(counts),
        "Vehicles retrieved",
    ))
}

/// Vehicle detail with category names and availability
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(window_query): Query<WindowQuery>,
) -> AppResult<ApiResponse<VehicleDetailResponse>> {
    let window = AvailabilityPolicy::from_config(&state.config).resolve_query(&window_query)?;
    let vehicle = find_vehicle(&state, id).await?;

    let category = vehicle_category::Entity::find_by_id(vehicle.category_id)
        .one(&state.db)
        .await?;
    let sub_category = vehicle_sub_category::Entity::find_by_id(vehicle.sub_category_id)
        .one(&state.db)
        .await?;
    let availability = availability::check(&state.db, vehicle.id, window).await?;

    Ok(ApiResponse::ok(
        VehicleDetailResponse {
            vehicle,
            category,
            sub_category,
            availability,
        },
        "Vehicle retrieved",
    ))
}

/// Availability of one vehicle for a window
pub async fn vehicle_availability(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(window_query): Query<WindowQuery>,
) -> AppResult<ApiResponse<AvailabilityResponse>> {
    let window = AvailabilityPolicy::from_config(&state.config).resolve_query(&window_query)?;
    let vehicle = find_vehicle(&state, id).await?;
    let availability = availability::check(&state.db, vehicle.id, window).await?;

    Ok(ApiResponse::ok(
        AvailabilityResponse {
            vehicle_id: vehicle.id,
            pickup_date: window.map(|w| w.pickup),
            dropoff_date: window.map(|w| w.dropoff),
            availability,
        },
        "Availability checked",
    ))
}

pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(payload): Json<VehicleRequest>,
) -> AppResult<ApiResponse<vehicle::Model>> {
    validate_classification(&state, &payload).await?;

    let now = Utc::now();
    let mut active = vehicle::ActiveModel {
        is_under_maintenance: Set(false),
        status: Set(VehicleStatus::Available),
        created_at: Set(now.into()),
        ..Default::default()
    };
    apply_request(&mut active, payload);
    let vehicle = active.insert(&state.db).await?;

    tracing::info!(vehicle_id = vehicle.id, registration_no = %vehicle.registration_no, "Vehicle registered");

    Ok(ApiResponse::created(vehicle, "Vehicle created"))
}

pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<VehicleRequest>,
) -> AppResult<ApiResponse<vehicle::Model>> {
    let vehicle = find_vehicle(&state, id).await?;
    validate_classification(&state, &payload).await?;

    let mut active: vehicle::ActiveModel = vehicle.into();
    apply_request(&mut active, payload);
    let vehicle = active.update(&state.db).await?;

    Ok(ApiResponse::ok(vehicle, "Vehicle updated"))
}

/// Set the maintenance flag and administrative status
pub async fn update_vehicle_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateVehicleStatusRequest>,
) -> AppResult<ApiResponse<vehicle::Model>> {
    if payload.is_under_maintenance.is_none() && payload.status.is_none() {
        return Err(AppError::BadRequest(
            "Provide is_under_maintenance or status".to_string(),
        ));
    }

    let vehicle = find_vehicle(&state, id).await?;
    let mut active: vehicle::ActiveModel = vehicle.into();
    if let Some(flag) = payload.is_under_maintenance {
        active.is_under_maintenance = Set(flag);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().into());
    let vehicle = active.update(&state.db).await?;

    tracing::info!(
        vehicle_id = vehicle.id,
        is_under_maintenance = vehicle.is_under_maintenance,
        status = ?vehicle.status,
        "Vehicle status updated"
    );

    Ok(ApiResponse::ok(vehicle, "Vehicle status updated"))
}

/// Delete a vehicle and, through the cascade, its bookings (admin)
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<()>> {
    let vehicle = find_vehicle(&state, id).await?;
    vehicle::Entity::delete_by_id(vehicle.id).exec(&state.db).await?;
    tracing::info!(vehicle_id = id, "Vehicle deleted");

    Ok(ApiResponse::message("Vehicle deleted"))
}
