use axum::extract::State;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use crate::entities::driver;
use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::response::{ApiResponse, PageParams};
use crate::utils::search::{any_icontains, search_term};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DriverFilter {
    pub query: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DriverRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact_number: String,
    pub nic: String,
    pub passport_number: Option<String>,
    pub country: String,
    pub nationality: String,
    pub address: String,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

fn apply_request(active: &mut driver::ActiveModel, payload: DriverRequest) {
    active.first_name = Set(payload.first_name);
    active.last_name = Set(payload.last_name);
    active.email = Set(payload.email);
    active.contact_number = Set(payload.contact_number);
    active.nic = Set(payload.nic);
    active.passport_number = Set(payload.passport_number);
    active.country = Set(payload.country);
    active.nationality = Set(payload.nationality);
    active.address = Set(payload.address);
    active.is_available = Set(payload.is_available);
    active.updated_at = Set(Utc::now().into());
}

async fn find_driver(state: &AppState, id: i32) -> AppResult<driver::Model> {
    driver::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))
}

/// List drivers; `query` matches names, email, contact number and NIC, ignoring case
pub async fn list_drivers(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filter): Query<DriverFilter>,
) -> AppResult<ApiResponse<Vec<driver::Model>>> {
    let mut query = driver::Entity::find().order_by_asc(driver::Column::Id);

    if let Some(term) = search_term(filter.query.as_deref()) {
        query = query.filter(any_icontains(
            [
                driver::Column::FirstName,
                driver::Column::LastName,
                driver::Column::Email,
                driver::Column::ContactNumber,
                driver::Column::Nic,
            ],
            term,
        ));
    }
    if let Some(is_available) = filter.is_available {
        query = query.filter(driver::Column::IsAvailable.eq(is_available));
    }

    let paginator = query.paginate(&state.db, params.page_size());
    let counts = paginator.num_items_and_pages().await?;
    let drivers = paginator.fetch_page(params.page_index()).await?;

    Ok(ApiResponse::paginated(
        drivers,
        params.pagination(counts),
        "Drivers retrieved",
    ))
}

pub async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<driver::Model>> {
    let driver = find_driver(&state, id).await?;
    Ok(ApiResponse::ok(driver, "Driver retrieved"))
}

pub async fn create_driver(
    State(state): State<AppState>,
    Json(payload): Json<DriverRequest>,
) -> AppResult<ApiResponse<driver::Model>> {
    let mut active = driver::ActiveModel {
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    apply_request(&mut active, payload);
    let driver = active.insert(&state.db).await?;

    tracing::info!(driver_id = driver.id, "Driver registered");

    Ok(ApiResponse::created(driver, "Driver created"))
}

pub async fn update_driver(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<DriverRequest>,
) -> AppResult<ApiResponse<driver::Model>> {
    let driver = find_driver(&state, id).await?;
    let mut active: driver::ActiveModel = driver.into();
    apply_request(&mut active, payload);
    let driver = active.update(&state.db).await?;

    tracing::info!(driver_id = driver.id, is_available = driver.is_available, "Driver updated");

    Ok(ApiResponse::ok(driver, "Driver updated"))
}
