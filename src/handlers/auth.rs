use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use crate::errors::{AppError, AppResult};
use crate::models::{ForgotPasswordForm, LoginForm, NewUser, RegisterForm, Role, UserSummary};
use crate::services::credentials::{hash_password, verify_password};
use super::{extract::ValidJson, AppState};

const INVALID_LOGIN: &str = "Invalid email or password";

#[axum::debug_handler]
pub async fn handle_login(
    State((store, _)): State<AppState>,
    ValidJson(login_form): ValidJson<LoginForm>,
) -> AppResult<Json<Value>> {
    tracing::info!("Login attempt for user: {}", login_form.email);

    let user = store
        .get_user_by_email(&login_form.email)
        .await
        .ok_or_else(|| {
            tracing::warn!("User not found: {}", login_form.email);
            AppError::Auth(INVALID_LOGIN.into())
        })?;

    if !verify_password(&login_form.password, &user.password_hash)? {
        tracing::warn!("Invalid password for user: {}", login_form.email);
        return Err(AppError::Auth(INVALID_LOGIN.into()));
    }
    if !user.is_active {
        tracing::warn!("Deactivated user attempted login: {}", login_form.email);
        return Err(AppError::Auth("This account has been deactivated".into()));
    }

    let mut summary = UserSummary::from(&user);
    if user.role == Role::Student {
        summary.student_id = store
            .get_student_by_user_id(&user.id)
            .await
            .map(|student| student.id);
    }

    tracing::info!("Password verified for user: {}", login_form.email);
    Ok(Json(json!({ "user": summary })))
}

pub async fn handle_register(
    State((store, config)): State<AppState>,
    ValidJson(register_form): ValidJson<RegisterForm>,
) -> AppResult<(StatusCode, Json<Value>)> {
    // Check if user exists
    if store.get_user_by_email(&register_form.email).await.is_some() {
        return Err(AppError::Validation(
            "User is already registered. Please login to the application.".into(),
        ));
    }

    let password_hash = hash_password(&register_form.password, config.auth.bcrypt_cost)?;
    let user = store
        .create_user(NewUser {
            email: register_form.email,
            password_hash,
            role: register_form.role,
            first_name: register_form.first_name,
            last_name: register_form.last_name,
            phone: register_form.phone,
            address: register_form.address,
        })
        .await;

    tracing::info!("Registered {} {}", user.role.as_str(), user.email);
    Ok((StatusCode::CREATED, Json(json!({ "user": UserSummary::from(&user) }))))
}

pub async fn handle_forgot_password(
    State((store, _)): State<AppState>,
    ValidJson(form): ValidJson<ForgotPasswordForm>,
) -> AppResult<Json<Value>> {
    if store.get_user_by_email(&form.email).await.is_none() {
        return Err(AppError::NotFound("No user found with this email".into()));
    }

    // No mail transport exists; the reset request is only acknowledged.
    tracing::info!("Password reset requested for {}", form.email);
    Ok(Json(json!({
        "message": "Password reset instructions sent to your email"
    })))
}
