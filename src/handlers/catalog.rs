use axum::extract::State;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Deserialize;

use crate::entities::{vehicle_category, vehicle_sub_category};
use crate::error::AppResult;
use crate::extract::Query;
use crate::response::ApiResponse;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SubCategoryFilter {
    pub category: Option<i32>,
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<vehicle_category::Model>>> {
    let categories = vehicle_category::Entity::find()
        .order_by_asc(vehicle_category::Column::Name)
        .all(&state.db)
        .await?;

    Ok(ApiResponse::ok(categories, "Categories retrieved"))
}

/// Sub-categories, optionally narrowed to one category
pub async fn list_sub_categories(
    State(state): State<AppState>,
    Query(filter): Query<SubCategoryFilter>,
) -> AppResult<ApiResponse<Vec<vehicle_sub_category::Model>>> {
    let mut query = vehicle_sub_category::Entity::find().order_by_asc(vehicle_sub_category::Column::Name);
    if let Some(category) = filter.category {
        query = query.filter(vehicle_sub_category::Column::CategoryId.eq(category));
    }
    let sub_categories = query.all(&state.db).await?;

    Ok(ApiResponse::ok(sub_categories, "Sub-categories retrieved"))
}
