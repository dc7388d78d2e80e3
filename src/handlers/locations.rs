use axum::extract::State;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::Deserialize;

use crate::entities::location;
use crate::error::{AppError, AppResult};
use crate::extract::{Json, Query};
use crate::response::{ApiResponse, PageParams};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateLocationRequest {
    pub name: String,
    pub address: String,
}

pub async fn list_locations(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<ApiResponse<Vec<location::Model>>> {
    let paginator = location::Entity::find()
        .order_by_asc(location::Column::Name)
        .paginate(&state.db, params.page_size());
    let counts = paginator.num_items_and_pages().await?;
    let locations = paginator.fetch_page(params.page_index()).await?;

    Ok(ApiResponse::paginated(
        locations,
        params.pagination(counts),
        "Locations retrieved",
    ))
}

pub async fn create_location(
    State(state): State<AppState>,
    Json(payload): Json<CreateLocationRequest>,
) -> AppResult<ApiResponse<location::Model>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }

    let location = location::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        address: Set(payload.address),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(ApiResponse::created(location, "Location created"))
}
