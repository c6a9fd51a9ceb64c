use axum::{
    extract::{Path, State},
    response::Json,
};
use crate::errors::{AppError, AppResult};
use crate::models::{User, UserUpdateForm, UsersQuery};
use super::{extract::{QueryParams, ValidJson}, AppState};

pub async fn list_users(
    State((store, _)): State<AppState>,
    QueryParams(query): QueryParams<UsersQuery>,
) -> Json<Vec<User>> {
    tracing::debug!("Listing users with role filter {:?}", query.role);
    Json(store.list_users(query.role).await)
}

pub async fn get_user(
    State((store, _)): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<User>> {
    store
        .get_user(&user_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("User"))
}

/// Profile update. Users are never deleted; `isActive: false` deactivates.
pub async fn update_user(
    State((store, _)): State<AppState>,
    Path(user_id): Path<String>,
    ValidJson(form): ValidJson<UserUpdateForm>,
) -> AppResult<Json<User>> {
    let user = store
        .update_user(&user_id, |user| {
            if let Some(first_name) = form.first_name {
                user.first_name = first_name;
            }
            if let Some(last_name) = form.last_name {
                user.last_name = last_name;
            }
            // an empty string clears the optional contact fields
            if let Some(phone) = form.phone {
                user.phone = Some(phone).filter(|p| !p.is_empty());
            }
            if let Some(address) = form.address {
                user.address = Some(address).filter(|a| !a.is_empty());
            }
            if let Some(role) = form.role {
                user.role = role;
            }
            if let Some(is_active) = form.is_active {
                user.is_active = is_active;
            }
            Ok(())
        })
        .await?;

    tracing::info!("Updated user {} (active: {})", user.id, user.is_active);
    Ok(Json(user))
}
