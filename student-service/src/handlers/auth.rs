use anyhow::anyhow;
use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::dtos::auth::{
    AdminExistsResponse, ChangePasswordRequest, CreateAdminRequest, CreateTeacherAccountRequest,
    LoginRequest, LoginResponse, MessageResponse, UserStatsResponse,
};
use crate::middleware::RequestContext;
use crate::models::{User, UserRole};
use crate::utils::password::{hash_password, verify_password};
use crate::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;
    tracing::info!(username = %payload.username, "Login attempt");

    let user = state
        .users
        .find_by_username(&payload.username)
        .await?
        .ok_or_else(|| {
            tracing::warn!(username = %payload.username, "Unknown username");
            AppError::Unauthorized(anyhow!("Invalid username or password"))
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        tracing::warn!(username = %payload.username, "Wrong password");
        return Err(AppError::Unauthorized(anyhow!(
            "Invalid username or password"
        )));
    }

    tracing::info!(username = %user.username, role = user.role.as_str(), "Login successful");

    Ok(Json(LoginResponse {
        username: user.username,
        role: user.role,
        teacher_id: user.teacher_id,
        full_name: user.full_name,
        message: "Login successful".to_string(),
    }))
}

/// POST /api/auth/signup — bootstrap registration, closed once any admin
/// account exists.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    payload.validate()?;

    if state.users.count_role(UserRole::Admin).await? > 0 {
        return Err(AppError::Forbidden(anyhow!(
            "Admin registration is closed. System already has administrators."
        )));
    }

    let username = payload.username.clone();
    insert_admin(&state, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Admin account created successfully for: {}", username),
        }),
    ))
}

/// POST /api/auth/admin/create (ADMIN only)
pub async fn create_admin(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    ctx.require_admin()?;
    payload.validate()?;

    let username = payload.username.clone();
    insert_admin(&state, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Admin account created successfully for: {}", username),
        }),
    ))
}

async fn insert_admin(state: &AppState, payload: CreateAdminRequest) -> Result<(), AppError> {
    if state
        .users
        .find_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow!("Username already exists")));
    }

    let user = User {
        id: Uuid::new_v4(),
        username: payload.username,
        password_hash: hash_password(&payload.password)?,
        role: UserRole::Admin,
        teacher_id: None,
        full_name: payload.full_name,
    };
    state.users.insert(&user).await?;

    tracing::info!(username = %user.username, "Admin account created");
    Ok(())
}

/// POST /api/auth/teacher/create (ADMIN only). The teacher logs in with
/// their teacher id as username.
pub async fn create_teacher_account(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<CreateTeacherAccountRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    ctx.require_admin()?;
    payload.validate()?;

    if state
        .users
        .find_by_username(&payload.teacher_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow!("Username already exists")));
    }

    let user = User {
        id: Uuid::new_v4(),
        username: payload.teacher_id.clone(),
        password_hash: hash_password(&payload.password)?,
        role: UserRole::Teacher,
        teacher_id: Some(payload.teacher_id.clone()),
        full_name: payload.full_name,
    };
    state.users.insert(&user).await?;

    tracing::info!(teacher_id = %payload.teacher_id, "Teacher account created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!(
                "Teacher account created successfully for: {}",
                payload.teacher_id
            ),
        }),
    ))
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;

    let user = state
        .users
        .find_by_username(&payload.username)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("User not found: {}", payload.username)))?;

    if !verify_password(&payload.old_password, &user.password_hash)? {
        return Err(AppError::Unauthorized(anyhow!("Invalid old password")));
    }

    let new_hash = hash_password(&payload.new_password)?;
    state
        .users
        .update_password(&payload.username, &new_hash)
        .await?;

    tracing::info!(username = %payload.username, "Password changed");

    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}

/// GET /api/auth/admin/exists
pub async fn admin_exists(
    State(state): State<AppState>,
) -> Result<Json<AdminExistsResponse>, AppError> {
    let exists = state.users.count_role(UserRole::Admin).await? > 0;
    Ok(Json(AdminExistsResponse { exists }))
}

/// GET /api/auth/stats
pub async fn user_stats(State(state): State<AppState>) -> Result<Json<UserStatsResponse>, AppError> {
    Ok(Json(UserStatsResponse {
        admin_count: state.users.count_role(UserRole::Admin).await?,
        teacher_count: state.users.count_role(UserRole::Teacher).await?,
    }))
}
