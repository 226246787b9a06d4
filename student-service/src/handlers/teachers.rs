//! Teacher CRUD (ADMIN only), keyed by the human-readable teacher id.

use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::teachers::{CreateTeacherRequest, TeacherResponse, UpdateTeacherRequest};
use crate::middleware::RequestContext;
use crate::AppState;

/// POST /api/teachers
pub async fn create_teacher(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<CreateTeacherRequest>,
) -> Result<(StatusCode, Json<TeacherResponse>), AppError> {
    ctx.require_admin()?;
    payload.validate()?;

    tracing::info!(teacher_id = %payload.teacher_id, "Creating teacher");

    if state
        .teachers
        .find_by_teacher_id(&payload.teacher_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow!(
            "Teacher ID already exists: {}",
            payload.teacher_id
        )));
    }

    let teacher = payload.into_model();
    state.teachers.insert(&teacher).await?;
    tracing::info!(teacher_id = %teacher.teacher_id, "Teacher created");

    Ok((StatusCode::CREATED, Json(TeacherResponse::from(teacher))))
}

/// GET /api/teachers
pub async fn list_teachers(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<TeacherResponse>>, AppError> {
    ctx.require_admin()?;
    let teachers = state.teachers.find_all().await?;
    Ok(Json(teachers.into_iter().map(TeacherResponse::from).collect()))
}

/// GET /api/teachers/subject/{subject}
pub async fn teachers_by_subject(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(subject): Path<String>,
) -> Result<Json<Vec<TeacherResponse>>, AppError> {
    ctx.require_admin()?;
    let teachers = state.teachers.find_by_subject(&subject).await?;
    Ok(Json(teachers.into_iter().map(TeacherResponse::from).collect()))
}

/// GET /api/teachers/{teacher_id}
pub async fn get_teacher(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(teacher_id): Path<String>,
) -> Result<Json<TeacherResponse>, AppError> {
    ctx.require_admin()?;

    let teacher = state
        .teachers
        .find_by_teacher_id(&teacher_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Teacher not found with ID: {}", teacher_id)))?;

    Ok(Json(TeacherResponse::from(teacher)))
}

/// PUT /api/teachers/{teacher_id}
pub async fn update_teacher(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(teacher_id): Path<String>,
    Json(payload): Json<UpdateTeacherRequest>,
) -> Result<Json<TeacherResponse>, AppError> {
    ctx.require_admin()?;
    payload.validate()?;

    let mut teacher = state
        .teachers
        .find_by_teacher_id(&teacher_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Teacher not found: {}", teacher_id)))?;

    payload.apply_to(&mut teacher);
    state.teachers.replace(&teacher).await?;
    tracing::info!(teacher_id = %teacher.teacher_id, "Teacher updated");

    Ok(Json(TeacherResponse::from(teacher)))
}

/// DELETE /api/teachers/{teacher_id}
pub async fn delete_teacher(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(teacher_id): Path<String>,
) -> Result<StatusCode, AppError> {
    ctx.require_admin()?;

    if state
        .teachers
        .find_by_teacher_id(&teacher_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(anyhow!(
            "Cannot delete. Teacher not found: {}",
            teacher_id
        )));
    }

    state.teachers.delete_by_teacher_id(&teacher_id).await?;
    tracing::info!(teacher_id = %teacher_id, "Teacher deleted");

    Ok(StatusCode::NO_CONTENT)
}
