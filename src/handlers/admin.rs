use axum::{extract::State, Extension};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::extract::{Json, Path, Query};
use crate::handlers::auth::{hash_password, validate_password, UserInfo};
use crate::response::{ApiResponse, PageParams};
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::Staff
}

/// List back-office accounts (admin)
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<ApiResponse<Vec<UserInfo>>> {
    let paginator = user::Entity::find()
        .order_by_asc(user::Column::CreatedAt)
        .paginate(&state.db, params.page_size());
    let counts = paginator.num_items_and_pages().await?;
    let users = paginator.fetch_page(params.page_index()).await?;

    Ok(ApiResponse::paginated(
        users.into_iter().map(UserInfo::from).collect(),
        params.pagination(counts),
        "Users retrieved",
    ))
}

/// Create a staff or admin account (admin)
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<ApiResponse<UserInfo>> {
    validate_password("password", &payload.password)?;

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email),
        password_hash: Set(hash_password(&payload.password)?),
        name: Set(payload.name),
        role: Set(payload.role),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(user_id = %user.id, role = ?user.role, "User account created");

    Ok(ApiResponse::created(user.into(), "User created"))
}

/// Delete an account (admin). Admins cannot delete themselves.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    if claims.sub == id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let user = user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    user::Entity::delete_by_id(user.id).exec(&state.db).await?;
    tracing::info!(user_id = %id, "User account deleted");

    Ok(ApiResponse::message("User deleted"))
}
