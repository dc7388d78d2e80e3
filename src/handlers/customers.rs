use axum::extract::State;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::entities::customer::{self, CustomerStatus};
use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::response::{ApiResponse, PageParams};
use crate::utils::search::{any_icontains, search_term};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CustomerFilter {
    pub query: Option<String>,
    pub status: Option<CustomerStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub contact_number: String,
    pub address: String,
    pub nic: String,
    pub passport_number: Option<String>,
    pub nationality: String,
    pub country: String,
    pub driving_licence_number: Option<String>,
    pub status: Option<CustomerStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCustomerStatusRequest {
    pub status: CustomerStatus,
}

#[derive(Debug, Serialize)]
pub struct CustomerStatusResponse {
    pub customer_id: i32,
    pub status: CustomerStatus,
}

impl From<&customer::Model> for CustomerStatusResponse {
    fn from(customer: &customer::Model) -> Self {
        Self {
            customer_id: customer.id,
            status: customer.status,
        }
    }
}

fn apply_request(active: &mut customer::ActiveModel, payload: CustomerRequest) {
    active.first_name = Set(payload.first_name);
    active.last_name = Set(payload.last_name);
    active.user_name = Set(payload.user_name);
    active.email = Set(payload.email);
    active.contact_number = Set(payload.contact_number);
    active.address = Set(payload.address);
    active.nic = Set(payload.nic);
    active.passport_number = Set(payload.passport_number);
    active.nationality = Set(payload.nationality);
    active.country = Set(payload.country);
    active.driving_licence_number = Set(payload.driving_licence_number);
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().into());
}

async fn find_customer(state: &AppState, id: i32) -> AppResult<customer::Model> {
    customer::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))
}

/// List customers; `query` matches names, user name, email, contact number
/// and NIC, ignoring case
pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filter): Query<CustomerFilter>,
) -> AppResult<ApiResponse<Vec<customer::Model>>> {
    let mut query = customer::Entity::find().order_by_asc(customer::Column::Id);

    if let Some(term) = search_term(filter.query.as_deref()) {
        query = query.filter(any_icontains(
            [
                customer::Column::FirstName,
                customer::Column::LastName,
                customer::Column::UserName,
                customer::Column::Email,
                customer::Column::ContactNumber,
                customer::Column::Nic,
            ],
            term,
        ));
    }
    if let Some(status) = filter.status {
        query = query.filter(customer::Column::Status.eq(status));
    }

    let paginator = query.paginate(&state.db, params.page_size());
    let counts = paginator.num_items_and_pages().await?;
    let customers = paginator.fetch_page(params.page_index()).await?;

    Ok(ApiResponse::paginated(
        customers,
        params.pagination(counts),
        "Customers retrieved",
    ))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<customer::Model>> {
    let customer = find_customer(&state, id).await?;
    Ok(ApiResponse::ok(customer, "Customer retrieved"))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CustomerRequest>,
) -> AppResult<ApiResponse<customer::Model>> {
    let mut active = customer::ActiveModel {
        status: Set(CustomerStatus::Active),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    apply_request(&mut active, payload);
    let customer = active.insert(&state.db).await?;

    tracing::info!(customer_id = customer.id, "Customer registered");

    Ok(ApiResponse::created(customer, "Customer created"))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CustomerRequest>,
) -> AppResult<ApiResponse<customer::Model>> {
    let customer = find_customer(&state, id).await?;
    let mut active: customer::ActiveModel = customer.into();
    apply_request(&mut active, payload);
    let customer = active.update(&state.db).await?;

    Ok(ApiResponse::ok(customer, "Customer updated"))
}

pub async fn get_customer_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<CustomerStatusResponse>> {
    let customer = find_customer(&state, id).await?;
    Ok(ApiResponse::ok((&customer).into(), "Customer status retrieved"))
}

/// Move a customer between active, inactive and blacklisted
pub async fn update_customer_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCustomerStatusRequest>,
) -> AppResult<ApiResponse<CustomerStatusResponse>> {
    let customer = find_customer(&state, id).await?;
    let previous = customer.status;

    let mut active: customer::ActiveModel = customer.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let customer = active.update(&state.db).await?;

    tracing::info!(
        customer_id = customer.id,
        from = ?previous,
        to = ?customer.status,
        "Customer status changed"
    );

    Ok(ApiResponse::ok((&customer).into(), "Customer status updated"))
}
